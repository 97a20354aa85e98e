use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::{PayoffError, Result};
use crate::ledger::LedgerSnapshot;
use crate::simulation::SimulationResult;
use crate::types::{DebtId, PayoffStrategy};

/// what the collaborator asks the planner for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanRequest {
    pub strategy: PayoffStrategy,
    pub extra_monthly_payment: Money,
}

impl PlanRequest {
    pub fn new(strategy: PayoffStrategy, extra_monthly_payment: Money) -> Self {
        Self {
            strategy,
            extra_monthly_payment,
        }
    }

    /// minimum payments only
    pub fn minimums_only(strategy: PayoffStrategy) -> Self {
        Self::new(strategy, Money::ZERO)
    }

    pub fn validate(&self) -> Result<()> {
        if self.extra_monthly_payment.is_negative() {
            return Err(PayoffError::InvalidExtraPayment {
                amount: self.extra_monthly_payment,
            });
        }
        Ok(())
    }
}

/// when a debt is projected to reach zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PayoffTiming {
    PaidOff { month: u32, date: NaiveDate },
    /// not paid off within the simulation horizon
    Unreachable,
}

impl PayoffTiming {
    pub fn month(&self) -> Option<u32> {
        match self {
            PayoffTiming::PaidOff { month, .. } => Some(*month),
            PayoffTiming::Unreachable => None,
        }
    }

    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            PayoffTiming::PaidOff { date, .. } => Some(*date),
            PayoffTiming::Unreachable => None,
        }
    }
}

/// per-debt projection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebtPayoff {
    pub debt_id: DebtId,
    pub name: String,
    pub starting_balance: Money,
    pub payoff: PayoffTiming,
    pub interest_paid: Money,
    pub total_paid: Money,
    pub non_amortizing: bool,
}

/// summary the presentation layer renders
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoffPlan {
    pub strategy: PayoffStrategy,
    pub extra_monthly_payment: Money,
    pub ledger_revision: u64,
    pub start_date: NaiveDate,
    pub horizon_months: u32,
    pub debts: Vec<DebtPayoff>,
    /// last payoff month among debts that do get paid off
    pub debt_free_month: Option<u32>,
    pub debt_free_date: Option<NaiveDate>,
    pub total_starting_balance: Money,
    pub total_interest: Money,
    pub total_paid: Money,
    /// minimum-only baseline interest less this plan's interest
    pub interest_saved: Money,
    /// baseline debt-free month less this plan's, when both exist
    pub months_saved: Option<i64>,
    pub monthly_minimum_total: Money,
    pub average_apr: Rate,
    pub weighted_average_apr: Rate,
    pub exceeds_horizon: bool,
    pub non_amortizing: Vec<DebtId>,
    /// debts whose balance outgrew the simulation ceiling
    pub diverged: Vec<DebtId>,
}

impl PayoffPlan {
    pub fn debt(&self, id: DebtId) -> Option<&DebtPayoff> {
        self.debts.iter().find(|d| d.debt_id == id)
    }

    pub fn payoff_month(&self, id: DebtId) -> Option<u32> {
        self.debt(id).and_then(|d| d.payoff.month())
    }

    pub fn unreachable_debts(&self) -> impl Iterator<Item = &DebtPayoff> {
        self.debts
            .iter()
            .filter(|d| d.payoff == PayoffTiming::Unreachable)
    }

    /// fills in the savings fields against a minimum-only run
    pub fn with_baseline(mut self, baseline: &PayoffPlan) -> Self {
        self.interest_saved = baseline.total_interest - self.total_interest;
        self.months_saved = match (baseline.debt_free_month, self.debt_free_month) {
            (Some(base), Some(actual)) if !baseline.exceeds_horizon && !self.exceeds_horizon => {
                Some(base as i64 - actual as i64)
            }
            _ => None,
        };
        self
    }
}

/// reduces a simulation trace into a plan
pub struct PlanAggregator<'a> {
    snapshot: &'a LedgerSnapshot,
    start_date: NaiveDate,
}

impl<'a> PlanAggregator<'a> {
    pub fn new(snapshot: &'a LedgerSnapshot, start_date: NaiveDate) -> Self {
        Self {
            snapshot,
            start_date,
        }
    }

    /// savings fields are left at zero until `with_baseline`
    pub fn summarize(&self, result: &SimulationResult) -> PayoffPlan {
        let mut debts = Vec::with_capacity(result.debt_ids.len());
        let mut total_starting_balance = Money::ZERO;

        for &id in &result.debt_ids {
            let mut interest_paid = Money::ZERO;
            let mut total_paid = Money::ZERO;
            let mut starting_balance = None;
            let mut last = None;

            for month in &result.months {
                if let Some(entry) = month.entry(id) {
                    starting_balance.get_or_insert(entry.opening_balance);
                    interest_paid += entry.interest_accrued;
                    total_paid += entry.payment_applied;
                    last = Some((month.month, entry.closed));
                }
            }

            let debt = self.snapshot.get(id);
            let due_day = debt.map(|d| d.due_day).unwrap_or(1);
            let payoff = match last {
                Some((month, true)) => PayoffTiming::PaidOff {
                    month,
                    date: payment_date(self.start_date, month, due_day),
                },
                _ => PayoffTiming::Unreachable,
            };

            let starting_balance = starting_balance
                .or_else(|| debt.map(|d| d.current_balance.round_cents()))
                .unwrap_or(Money::ZERO);
            total_starting_balance += starting_balance;

            debts.push(DebtPayoff {
                debt_id: id,
                name: debt.map(|d| d.name.clone()).unwrap_or_default(),
                starting_balance,
                payoff,
                interest_paid,
                total_paid,
                non_amortizing: result.non_amortizing.contains(&id),
            });
        }

        let debt_free_month = debts.iter().filter_map(|d| d.payoff.month()).max();
        let debt_free_date = debts.iter().filter_map(|d| d.payoff.date()).max();
        let total_interest: Money = debts.iter().map(|d| d.interest_paid).sum();
        let total_paid: Money = debts.iter().map(|d| d.total_paid).sum();

        PayoffPlan {
            strategy: result.strategy,
            extra_monthly_payment: result.extra_monthly,
            ledger_revision: self.snapshot.revision,
            start_date: self.start_date,
            horizon_months: result.max_months,
            debts,
            debt_free_month,
            debt_free_date,
            total_starting_balance,
            total_interest,
            total_paid,
            interest_saved: Money::ZERO,
            months_saved: None,
            monthly_minimum_total: self.snapshot.total_minimums(),
            average_apr: self.snapshot.average_apr(),
            weighted_average_apr: self.snapshot.weighted_average_apr(),
            exceeds_horizon: result.exceeded_horizon,
            non_amortizing: result.non_amortizing.clone(),
            diverged: result.diverged.clone(),
        }
    }
}

/// calendar date of a projected month's payment
///
/// month 0 falls in the calendar month after `start`; the due day is
/// clamped to the length of the target month.
pub fn payment_date(start: NaiveDate, month: u32, due_day: u8) -> NaiveDate {
    let first_of_start = start.with_day(1).unwrap_or(start);
    let Some(first) = first_of_start.checked_add_months(Months::new(month + 1)) else {
        return NaiveDate::MAX;
    };

    let day = u32::from(due_day).clamp(1, days_in_month(first.year(), first.month()));
    first.with_day(day).unwrap_or(first)
}

fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 30,
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debt::{Debt, NewDebt};
    use crate::simulation::simulate;
    use crate::types::DebtType;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn snapshot(debts: Vec<Debt>) -> LedgerSnapshot {
        LedgerSnapshot::from_debts(debts, Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap())
    }

    fn debt(sequence: u64, balance: i64, apr: u32, minimum: i64, due_day: u8) -> Debt {
        let debt_type = if apr == 0 { DebtType::MedicalDebt } else { DebtType::CreditCard };
        let draft = NewDebt::builder()
            .name(format!("debt-{sequence}"))
            .debt_type(debt_type)
            .balance(Money::from_major(balance))
            .apr(Rate::from_percentage(apr))
            .minimum_payment(Money::from_major(minimum))
            .due_day(due_day)
            .build()
            .unwrap();
        Debt::from_draft(draft, Uuid::from_u128(sequence as u128 + 1), sequence, Utc::now())
    }

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()
    }

    #[test]
    fn test_payment_date_clamps_due_day() {
        // month 0 lands in february 2024, a leap year
        assert_eq!(payment_date(start(), 0, 31), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(payment_date(start(), 1, 31), NaiveDate::from_ymd_opt(2024, 3, 31).unwrap());
        assert_eq!(payment_date(start(), 11, 15), NaiveDate::from_ymd_opt(2025, 1, 15).unwrap());
    }

    #[test]
    fn test_summarize_payoff_months_and_totals() {
        let debts = vec![debt(0, 100, 0, 25, 5), debt(1, 1_000, 0, 25, 20)];
        let snapshot = snapshot(debts.clone());
        let result = simulate(&debts, PayoffStrategy::Snowball, Money::ZERO, 600).unwrap();

        let plan = PlanAggregator::new(&snapshot, start()).summarize(&result);

        assert_eq!(plan.payoff_month(debts[0].id), Some(3));
        assert_eq!(plan.payoff_month(debts[1].id), Some(21));
        assert_eq!(plan.debt_free_month, Some(21));
        // month 21 lands in november 2025
        assert_eq!(plan.debt_free_date, NaiveDate::from_ymd_opt(2025, 11, 20));
        assert_eq!(plan.total_interest, Money::ZERO);
        assert_eq!(plan.total_paid, Money::from_major(1_100));
        assert_eq!(plan.total_starting_balance, Money::from_major(1_100));
        assert_eq!(plan.monthly_minimum_total, Money::from_major(50));
        assert!(!plan.exceeds_horizon);
    }

    #[test]
    fn test_unreachable_debt_excluded_from_debt_free_month() {
        let debts = vec![debt(0, 100, 0, 25, 1), debt(1, 1_000, 24, 20, 1)];
        let snapshot = snapshot(debts.clone());
        // short horizon so the roll-forward cannot rescue the second debt
        let result = simulate(&debts, PayoffStrategy::Snowball, Money::ZERO, 6).unwrap();

        let plan = PlanAggregator::new(&snapshot, start()).summarize(&result);

        assert!(plan.exceeds_horizon);
        assert_eq!(plan.debt(debts[1].id).unwrap().payoff, PayoffTiming::Unreachable);
        assert!(plan.debt(debts[1].id).unwrap().non_amortizing);
        assert_eq!(plan.debt_free_month, Some(3));
        assert_eq!(plan.unreachable_debts().count(), 1);
    }

    #[test]
    fn test_with_baseline_computes_savings() {
        let debts = vec![debt(0, 1_000, 24, 30, 1), debt(1, 300, 10, 20, 1)];
        let snapshot = snapshot(debts.clone());
        let aggregator = PlanAggregator::new(&snapshot, start());

        let baseline = aggregator
            .summarize(&simulate(&debts, PayoffStrategy::Avalanche, Money::ZERO, 600).unwrap());
        let plan = aggregator
            .summarize(&simulate(&debts, PayoffStrategy::Avalanche, Money::from_major(100), 600).unwrap())
            .with_baseline(&baseline);

        assert!(plan.interest_saved.is_positive());
        assert_eq!(plan.interest_saved, baseline.total_interest - plan.total_interest);
        assert!(plan.months_saved.unwrap() > 0);

        let baseline = baseline.clone().with_baseline(&baseline);
        assert_eq!(baseline.interest_saved, Money::ZERO);
        assert_eq!(baseline.months_saved, Some(0));
    }

    #[test]
    fn test_request_validation() {
        assert!(PlanRequest::minimums_only(PayoffStrategy::Snowball).validate().is_ok());
        let request = PlanRequest::new(PayoffStrategy::Snowball, Money::from_major(-5));
        assert!(matches!(request.validate(), Err(PayoffError::InvalidExtraPayment { .. })));
    }
}
