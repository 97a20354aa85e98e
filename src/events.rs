use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::types::DebtId;

/// why a debt left the open set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CloseReason {
    /// balance edited down to zero
    PaidOff,
    /// retired by the user with a balance remaining
    Retired,
}

/// all events that can be emitted by the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    DebtAdded {
        debt_id: DebtId,
        name: String,
        balance: Money,
        apr: Rate,
        timestamp: DateTime<Utc>,
    },
    DebtRemoved {
        debt_id: DebtId,
        timestamp: DateTime<Utc>,
    },
    DebtClosed {
        debt_id: DebtId,
        reason: CloseReason,
        remaining_balance: Money,
        timestamp: DateTime<Utc>,
    },
    BalanceAdjusted {
        debt_id: DebtId,
        old_balance: Money,
        new_balance: Money,
        timestamp: DateTime<Utc>,
    },
    RateChanged {
        debt_id: DebtId,
        old_rate: Rate,
        new_rate: Rate,
        timestamp: DateTime<Utc>,
    },
    MinimumPaymentChanged {
        debt_id: DebtId,
        old_minimum: Money,
        new_minimum: Money,
        timestamp: DateTime<Utc>,
    },
    DetailsEdited {
        debt_id: DebtId,
        timestamp: DateTime<Utc>,
    },
}

impl Event {
    pub fn debt_id(&self) -> DebtId {
        match self {
            Event::DebtAdded { debt_id, .. }
            | Event::DebtRemoved { debt_id, .. }
            | Event::DebtClosed { debt_id, .. }
            | Event::BalanceAdjusted { debt_id, .. }
            | Event::RateChanged { debt_id, .. }
            | Event::MinimumPaymentChanged { debt_id, .. }
            | Event::DetailsEdited { debt_id, .. } => *debt_id,
        }
    }
}

/// event store for collecting events during operations
#[derive(Debug, Default, Clone)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
        }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
