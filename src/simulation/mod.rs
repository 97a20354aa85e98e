pub mod engine;

use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::{DebtId, PayoffStrategy};

pub use engine::{simulate, Simulator};

/// one debt's activity in one simulated month
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebtMonthEntry {
    pub debt_id: DebtId,
    pub opening_balance: Money,
    pub interest_accrued: Money,
    /// paid from the debt's own minimum
    pub minimum_applied: Money,
    /// paid from the pooled surplus (extra plus freed minimums)
    pub extra_applied: Money,
    pub payment_applied: Money,
    pub closing_balance: Money,
    /// the debt was this month's priority target
    pub targeted: bool,
    /// the debt reached zero this month
    pub closed: bool,
}

/// all debts open at the start of a month, in creation order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationMonth {
    /// 0 is the first projected month
    pub month: u32,
    /// total capacity available this month
    pub pooled_budget: Money,
    /// capacity no open debt could absorb
    pub unused_budget: Money,
    pub entries: Vec<DebtMonthEntry>,
}

impl SimulationMonth {
    pub fn entry(&self, id: DebtId) -> Option<&DebtMonthEntry> {
        self.entries.iter().find(|e| e.debt_id == id)
    }

    pub fn total_closing_balance(&self) -> Money {
        self.entries.iter().map(|e| e.closing_balance).sum()
    }

    pub fn total_interest(&self) -> Money {
        self.entries.iter().map(|e| e.interest_accrued).sum()
    }

    pub fn total_payment(&self) -> Money {
        self.entries.iter().map(|e| e.payment_applied).sum()
    }
}

/// month-by-month trace plus the signals a partial run raises
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub strategy: PayoffStrategy,
    pub extra_monthly: Money,
    pub max_months: u32,
    /// simulated debts in creation order
    pub debt_ids: Vec<DebtId>,
    pub months: Vec<SimulationMonth>,
    /// debts whose own minimum did not cover a month of interest
    pub non_amortizing: Vec<DebtId>,
    /// debts still open when the loop stopped
    pub unpaid: Vec<DebtId>,
    /// debts whose balance outgrew the configured ceiling; the run stops
    /// in the month this first happens
    pub diverged: Vec<DebtId>,
    pub exceeded_horizon: bool,
}

impl SimulationResult {
    pub fn months_simulated(&self) -> u32 {
        self.months.len() as u32
    }

    pub fn is_complete(&self) -> bool {
        self.unpaid.is_empty()
    }

    pub fn total_interest(&self) -> Money {
        self.months.iter().map(|m| m.total_interest()).sum()
    }

    /// month index of the entry that closed the debt
    pub fn payoff_month(&self, id: DebtId) -> Option<u32> {
        self.months
            .iter()
            .rev()
            .find_map(|m| m.entry(id).map(|e| (m.month, e.closed)))
            .and_then(|(month, closed)| closed.then_some(month))
    }

    /// closing balance per month for one debt, for balance charts
    pub fn balance_series(&self, id: DebtId) -> Vec<(u32, Money)> {
        self.months
            .iter()
            .filter_map(|m| m.entry(id).map(|e| (m.month, e.closing_balance)))
            .collect()
    }

    /// aggregate closing balance per month
    pub fn total_balance_series(&self) -> Vec<(u32, Money)> {
        self.months
            .iter()
            .map(|m| (m.month, m.total_closing_balance()))
            .collect()
    }
}
