use std::cmp::Ordering;

use crate::debt::Debt;
use crate::decimal::{Money, Rate};
use crate::types::{DebtId, PayoffStrategy};

/// fields a strategy ranks on
///
/// implemented by ledger records and by the simulator's per-month state so
/// both rank through the same comparison.
pub trait PriorityKey {
    fn debt_id(&self) -> DebtId;
    fn balance(&self) -> Money;
    fn apr(&self) -> Rate;
    fn minimum_payment(&self) -> Money;
    fn sequence(&self) -> u64;
}

impl PriorityKey for Debt {
    fn debt_id(&self) -> DebtId {
        self.id
    }

    fn balance(&self) -> Money {
        self.current_balance
    }

    fn apr(&self) -> Rate {
        self.apr
    }

    fn minimum_payment(&self) -> Money {
        self.minimum_payment
    }

    fn sequence(&self) -> u64 {
        self.sequence
    }
}

impl PayoffStrategy {
    /// total order; `Less` means `a` is paid down first
    pub fn compare<T: PriorityKey>(&self, a: &T, b: &T) -> Ordering {
        let primary = match self {
            // smallest balance, then smallest minimum
            PayoffStrategy::Snowball => a
                .balance()
                .cmp(&b.balance())
                .then_with(|| a.minimum_payment().cmp(&b.minimum_payment())),
            // highest rate, then largest balance
            PayoffStrategy::Avalanche => b
                .apr()
                .cmp(&a.apr())
                .then_with(|| b.balance().cmp(&a.balance())),
        };

        primary
            .then_with(|| a.sequence().cmp(&b.sequence()))
            .then_with(|| a.debt_id().cmp(&b.debt_id()))
    }
}

/// priority order of the open debts under a strategy
pub fn order(debts: &[Debt], strategy: PayoffStrategy) -> Vec<DebtId> {
    let mut open: Vec<&Debt> = debts
        .iter()
        .filter(|d| d.is_open() && d.current_balance.is_positive())
        .collect();
    sort_by_priority(&mut open, strategy);
    open.into_iter().map(|d| d.id).collect()
}

/// sort references in place, highest priority first
pub fn sort_by_priority<T: PriorityKey>(items: &mut [&T], strategy: PayoffStrategy) {
    items.sort_by(|a, b| strategy.compare(*a, *b));
}
