use std::collections::HashSet;

use chrono::{DateTime, Utc};
use hourglass_rs::SafeTimeProvider;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::debt::{Debt, DebtUpdate, NewDebt};
use crate::decimal::{Money, Rate};
use crate::errors::{PayoffError, Result};
use crate::events::{CloseReason, Event, EventStore};
use crate::types::{DebtId, DebtStatus};

/// authoritative store of debt records
#[derive(Debug, Default)]
pub struct DebtLedger {
    debts: Vec<Debt>,
    next_sequence: u64,
    revision: u64,
    events: EventStore,
}

impl DebtLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// add a debt, returning its assigned id
    pub fn add(&mut self, draft: NewDebt, time_provider: &SafeTimeProvider) -> Result<DebtId> {
        draft.validate()?;

        let now = time_provider.now();
        let id = Uuid::new_v4();
        let debt = Debt::from_draft(draft, id, self.next_sequence, now);
        self.next_sequence += 1;

        tracing::info!(
            debt_id = %id,
            name = %debt.name,
            balance = %debt.current_balance,
            apr = %debt.apr,
            "debt added"
        );

        self.events.emit(Event::DebtAdded {
            debt_id: id,
            name: debt.name.clone(),
            balance: debt.current_balance,
            apr: debt.apr,
            timestamp: now,
        });

        self.debts.push(debt);
        self.bump();
        Ok(id)
    }

    /// delete a debt record entirely
    pub fn remove(&mut self, id: DebtId, time_provider: &SafeTimeProvider) -> Result<Debt> {
        let index = self.index_of(id)?;
        let debt = self.debts.remove(index);

        tracing::info!(debt_id = %id, "debt removed");
        self.events.emit(Event::DebtRemoved {
            debt_id: id,
            timestamp: time_provider.now(),
        });

        self.bump();
        Ok(debt)
    }

    /// retire an open debt, keeping the record for history
    pub fn close(&mut self, id: DebtId, time_provider: &SafeTimeProvider) -> Result<()> {
        let index = self.index_of(id)?;
        let debt = &mut self.debts[index];
        if !debt.is_open() {
            return Err(PayoffError::DebtAlreadyClosed { id });
        }

        let reason = if debt.current_balance.is_zero() {
            CloseReason::PaidOff
        } else {
            CloseReason::Retired
        };
        debt.status = DebtStatus::Closed;

        tracing::info!(debt_id = %id, ?reason, "debt closed");
        self.events.emit(Event::DebtClosed {
            debt_id: id,
            reason,
            remaining_balance: self.debts[index].current_balance,
            timestamp: time_provider.now(),
        });

        self.bump();
        Ok(())
    }

    /// edit mutable fields; validated as a whole before anything changes
    pub fn update(
        &mut self,
        id: DebtId,
        update: DebtUpdate,
        time_provider: &SafeTimeProvider,
    ) -> Result<&Debt> {
        let index = self.index_of(id)?;
        let current = &self.debts[index];
        if !current.is_open() {
            return Err(PayoffError::DebtAlreadyClosed { id });
        }
        if update.is_empty() {
            return Ok(&self.debts[index]);
        }

        let mut updated = update.apply_to(current);
        let paid_off = updated.current_balance.is_zero();
        if paid_off {
            updated.status = DebtStatus::Closed;
        }
        updated.validate()?;

        let now = time_provider.now();
        let old = std::mem::replace(&mut self.debts[index], updated);
        let new = self.debts[index].clone();
        self.emit_changes(&old, &new, now, paid_off);

        self.bump();
        Ok(&self.debts[index])
    }

    fn emit_changes(&mut self, old: &Debt, new: &Debt, now: DateTime<Utc>, paid_off: bool) {
        let debt_id = old.id;
        let mut details_changed = old.name != new.name
            || old.debt_type != new.debt_type
            || old.lender != new.lender
            || old.due_day != new.due_day
            || old.original_balance != new.original_balance;

        if old.current_balance != new.current_balance {
            tracing::info!(
                debt_id = %debt_id,
                old = %old.current_balance,
                new = %new.current_balance,
                "balance adjusted"
            );
            self.events.emit(Event::BalanceAdjusted {
                debt_id,
                old_balance: old.current_balance,
                new_balance: new.current_balance,
                timestamp: now,
            });
        }
        if old.apr != new.apr {
            self.events.emit(Event::RateChanged {
                debt_id,
                old_rate: old.apr,
                new_rate: new.apr,
                timestamp: now,
            });
        }
        if old.minimum_payment != new.minimum_payment {
            self.events.emit(Event::MinimumPaymentChanged {
                debt_id,
                old_minimum: old.minimum_payment,
                new_minimum: new.minimum_payment,
                timestamp: now,
            });
        }
        if paid_off {
            tracing::info!(debt_id = %debt_id, "debt paid off");
            self.events.emit(Event::DebtClosed {
                debt_id,
                reason: CloseReason::PaidOff,
                remaining_balance: Money::ZERO,
                timestamp: now,
            });
            details_changed = false;
        }
        if details_changed {
            self.events.emit(Event::DetailsEdited {
                debt_id,
                timestamp: now,
            });
        }
    }

    pub fn get(&self, id: DebtId) -> Option<&Debt> {
        self.debts.iter().find(|d| d.id == id)
    }

    pub fn debts(&self) -> &[Debt] {
        &self.debts
    }

    pub fn open_debts(&self) -> impl Iterator<Item = &Debt> {
        self.debts.iter().filter(|d| d.is_open())
    }

    pub fn len(&self) -> usize {
        self.debts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.debts.is_empty()
    }

    /// incremented on every successful mutation
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn events(&self) -> &EventStore {
        &self.events
    }

    /// drain recorded events; the store keeps growing until a caller does
    pub fn take_events(&mut self) -> Vec<Event> {
        self.events.take_events()
    }

    /// copy-on-read point-in-time view for the planning pipeline
    pub fn snapshot(&self, time_provider: &SafeTimeProvider) -> LedgerSnapshot {
        LedgerSnapshot {
            revision: self.revision,
            taken_at: time_provider.now(),
            debts: self.debts.clone(),
        }
    }

    /// flat json list of debt records
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.debts)?)
    }

    /// restore from a flat json list, re-validating every record
    pub fn from_json(json: &str) -> Result<Self> {
        let mut debts: Vec<Debt> = serde_json::from_str(json)?;

        let mut seen = HashSet::new();
        for debt in &debts {
            debt.validate()?;
            if !seen.insert(debt.id) {
                return Err(PayoffError::DuplicateDebt { id: debt.id });
            }
        }

        debts.sort_by_key(|d| d.sequence);
        let next_sequence = debts.last().map(|d| d.sequence + 1).unwrap_or(0);

        tracing::debug!(count = debts.len(), "ledger restored");

        Ok(Self {
            debts,
            next_sequence,
            revision: 0,
            events: EventStore::new(),
        })
    }

    fn index_of(&self, id: DebtId) -> Result<usize> {
        self.debts
            .iter()
            .position(|d| d.id == id)
            .ok_or(PayoffError::DebtNotFound { id })
    }

    fn bump(&mut self) {
        self.revision += 1;
    }
}

/// immutable point-in-time copy of the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub revision: u64,
    pub taken_at: DateTime<Utc>,
    pub debts: Vec<Debt>,
}

impl LedgerSnapshot {
    /// build a snapshot from raw records
    pub fn from_debts(debts: Vec<Debt>, taken_at: DateTime<Utc>) -> Self {
        Self {
            revision: 0,
            taken_at,
            debts,
        }
    }

    pub fn get(&self, id: DebtId) -> Option<&Debt> {
        self.debts.iter().find(|d| d.id == id)
    }

    /// open debts that still carry a balance
    pub fn open_debts(&self) -> impl Iterator<Item = &Debt> {
        self.debts
            .iter()
            .filter(|d| d.is_open() && d.current_balance.is_positive())
    }

    pub fn open_count(&self) -> usize {
        self.open_debts().count()
    }

    pub fn total_balance(&self) -> Money {
        self.open_debts().map(|d| d.current_balance).sum()
    }

    pub fn total_minimums(&self) -> Money {
        self.open_debts().map(|d| d.minimum_payment).sum()
    }

    /// simple mean apr over open debts
    pub fn average_apr(&self) -> Rate {
        let rates: Vec<Decimal> = self.open_debts().map(|d| d.apr.as_decimal()).collect();
        if rates.is_empty() {
            return Rate::ZERO;
        }
        let total: Decimal = rates.iter().sum();
        Rate::from_decimal(total / Decimal::from(rates.len()))
    }

    /// balance-weighted apr over open debts
    pub fn weighted_average_apr(&self) -> Rate {
        let total = self.total_balance();
        if total.is_zero() {
            return Rate::ZERO;
        }
        let weighted: Decimal = self
            .open_debts()
            .map(|d| d.current_balance.as_decimal() * d.apr.as_decimal())
            .sum();
        Rate::from_decimal(weighted / total.as_decimal())
    }
}
