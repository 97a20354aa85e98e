use crate::config::SimulationConfig;
use crate::debt::Debt;
use crate::decimal::{Money, Rate};
use crate::errors::{PayoffError, Result};
use crate::strategy::{sort_by_priority, PriorityKey};
use crate::types::{DebtId, PayoffStrategy};

use super::{DebtMonthEntry, SimulationMonth, SimulationResult};

/// simulated state of one debt between months
#[derive(Debug, Clone)]
struct DebtState {
    id: DebtId,
    sequence: u64,
    apr: Rate,
    minimum: Money,
    balance: Money,
    open: bool,
    non_amortizing: bool,
    /// balance grew past `max_balance`
    diverged: bool,
}

impl PriorityKey for DebtState {
    fn debt_id(&self) -> DebtId {
        self.id
    }

    fn balance(&self) -> Money {
        self.balance
    }

    fn apr(&self) -> Rate {
        self.apr
    }

    fn minimum_payment(&self) -> Money {
        self.minimum
    }

    fn sequence(&self) -> u64 {
        self.sequence
    }
}

/// state threaded from one month to the next
#[derive(Debug, Clone)]
struct MonthState {
    month: u32,
    debts: Vec<DebtState>,
    /// minimums released by debts closed in earlier months
    freed: Money,
}

impl MonthState {
    fn initial(debts: &[Debt]) -> Self {
        let mut states: Vec<DebtState> = debts
            .iter()
            .filter(|d| d.is_open())
            .map(|d| DebtState {
                id: d.id,
                sequence: d.sequence,
                apr: d.apr,
                minimum: d.minimum_payment.round_cents(),
                balance: d.current_balance.round_cents(),
                open: true,
                non_amortizing: false,
                diverged: false,
            })
            .filter(|s| s.balance.is_positive())
            .collect();
        states.sort_by(|a, b| a.sequence.cmp(&b.sequence).then_with(|| a.id.cmp(&b.id)));

        Self {
            month: 0,
            debts: states,
            freed: Money::ZERO,
        }
    }

    fn has_open(&self) -> bool {
        self.debts.iter().any(|d| d.open)
    }
}

/// month-stepping payoff simulator
#[derive(Debug, Clone, Default)]
pub struct Simulator {
    config: SimulationConfig,
}

impl Simulator {
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// run to completion or to the configured horizon
    pub fn run(
        &self,
        debts: &[Debt],
        strategy: PayoffStrategy,
        extra_monthly: Money,
    ) -> Result<SimulationResult> {
        self.run_cancellable(debts, strategy, extra_monthly, || false)
    }

    /// like `run`, polling `cancelled` before every month
    pub fn run_cancellable<F>(
        &self,
        debts: &[Debt],
        strategy: PayoffStrategy,
        extra_monthly: Money,
        cancelled: F,
    ) -> Result<SimulationResult>
    where
        F: Fn() -> bool,
    {
        if extra_monthly.is_negative() {
            return Err(PayoffError::InvalidExtraPayment { amount: extra_monthly });
        }
        let extra = extra_monthly.round_cents();

        let mut state = MonthState::initial(debts);
        let debt_ids: Vec<DebtId> = state.debts.iter().map(|d| d.id).collect();
        let mut months = Vec::new();

        while state.has_open() && state.month < self.config.max_months {
            if cancelled() {
                tracing::debug!(month = state.month, "simulation cancelled");
                return Err(PayoffError::Cancelled { month: state.month });
            }
            let (next, record) = self.step(&state, strategy, extra);
            months.push(record);
            state = next;

            if state.debts.iter().any(|d| d.diverged) {
                break;
            }
        }

        let unpaid: Vec<DebtId> = state.debts.iter().filter(|d| d.open).map(|d| d.id).collect();
        let non_amortizing: Vec<DebtId> = state
            .debts
            .iter()
            .filter(|d| d.non_amortizing)
            .map(|d| d.id)
            .collect();
        let diverged: Vec<DebtId> = state
            .debts
            .iter()
            .filter(|d| d.diverged)
            .map(|d| d.id)
            .collect();
        let exceeded_horizon = !unpaid.is_empty();

        for id in &non_amortizing {
            tracing::warn!(debt_id = %id, "minimum payment does not cover monthly interest");
        }
        for id in &diverged {
            tracing::warn!(
                debt_id = %id,
                month = state.month,
                max_balance = %self.config.max_balance,
                "balance diverged, simulation stopped"
            );
        }
        if exceeded_horizon {
            tracing::warn!(
                max_months = self.config.max_months,
                unpaid = unpaid.len(),
                "debts remain open at the simulation horizon"
            );
        }
        tracing::debug!(
            strategy = strategy.label(),
            extra = %extra,
            debts = debt_ids.len(),
            months = months.len(),
            "simulation finished"
        );

        Ok(SimulationResult {
            strategy,
            extra_monthly: extra,
            max_months: self.config.max_months,
            debt_ids,
            months,
            non_amortizing,
            unpaid,
            diverged,
            exceeded_horizon,
        })
    }

    /// advance one month, returning the next state and the month's record
    fn step(
        &self,
        state: &MonthState,
        strategy: PayoffStrategy,
        extra: Money,
    ) -> (MonthState, SimulationMonth) {
        // rank on opening balances
        let mut open: Vec<&DebtState> = state.debts.iter().filter(|d| d.open).collect();
        sort_by_priority(&mut open, strategy);
        let priority: Vec<DebtId> = open.iter().map(|d| d.id).collect();

        let pooled_budget = open.iter().map(|d| d.minimum).sum::<Money>() + extra + state.freed;

        let mut next = state.clone();
        next.month += 1;

        // interest, then each debt's own minimum
        let mut entries = Vec::with_capacity(priority.len());
        let mut spent = Money::ZERO;
        for debt in next.debts.iter_mut().filter(|d| d.open) {
            let opening_balance = debt.balance;
            let grown = opening_balance
                .checked_monthly_interest(debt.apr)
                .and_then(|interest| opening_balance.checked_add(interest))
                .filter(|balance| *balance <= self.config.max_balance);
            // past the ceiling the balance is pinned there and the run ends
            let balance = grown.unwrap_or_else(|| {
                debt.diverged = true;
                self.config.max_balance.max(opening_balance)
            });
            let interest = balance - opening_balance;
            debt.balance = balance;

            if debt.minimum <= interest {
                debt.non_amortizing = true;
            }

            let minimum_applied = debt.minimum.min(debt.balance);
            debt.balance -= minimum_applied;
            spent += minimum_applied;

            entries.push(DebtMonthEntry {
                debt_id: debt.id,
                opening_balance,
                interest_accrued: interest,
                minimum_applied,
                extra_applied: Money::ZERO,
                payment_applied: minimum_applied,
                closing_balance: debt.balance,
                targeted: false,
                closed: false,
            });
        }

        // the whole surplus goes to one debt; what it cannot absorb is unused
        let mut surplus = pooled_budget.saturating_sub(spent);
        let target = priority.iter().copied().find(|id| {
            next.debts
                .iter()
                .any(|d| d.id == *id && d.balance.is_positive())
        });
        if let Some(target_id) = target {
            let debt = next.debts.iter_mut().find(|d| d.id == target_id);
            let entry = entries.iter_mut().find(|e| e.debt_id == target_id);
            if let (Some(debt), Some(entry)) = (debt, entry) {
                let applied = surplus.min(debt.balance);
                debt.balance -= applied;
                surplus -= applied;
                entry.targeted = true;
                entry.extra_applied = applied;
                entry.payment_applied += applied;
            }
        }

        // close what reached zero; its minimum frees up next month
        for debt in next.debts.iter_mut().filter(|d| d.open) {
            let entry = entries.iter_mut().find(|e| e.debt_id == debt.id);
            let Some(entry) = entry else { continue };

            if debt.balance <= self.config.close_epsilon {
                debt.balance = Money::ZERO;
                debt.open = false;
                next.freed += debt.minimum;
                entry.closed = true;
            }
            entry.closing_balance = debt.balance;
        }

        tracing::trace!(
            month = state.month,
            pooled = %pooled_budget,
            unused = %surplus,
            target = ?target,
            "month simulated"
        );

        let record = SimulationMonth {
            month: state.month,
            pooled_budget,
            unused_budget: surplus,
            entries,
        };

        (next, record)
    }
}

/// run a simulation with the default closing epsilon
pub fn simulate(
    debts: &[Debt],
    strategy: PayoffStrategy,
    extra_monthly: Money,
    max_months: u32,
) -> Result<SimulationResult> {
    let config = SimulationConfig {
        max_months,
        ..SimulationConfig::default()
    };
    Simulator::new(config).run(debts, strategy, extra_monthly)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debt::NewDebt;
    use crate::types::DebtType;
    use chrono::Utc;
    use uuid::Uuid;

    fn debt(sequence: u64, debt_type: DebtType, balance: i64, apr: u32, minimum: i64) -> Debt {
        let draft = NewDebt::builder()
            .name(format!("debt-{sequence}"))
            .debt_type(debt_type)
            .balance(Money::from_major(balance))
            .apr(Rate::from_percentage(apr))
            .minimum_payment(Money::from_major(minimum))
            .build()
            .unwrap();
        Debt::from_draft(draft, Uuid::from_u128(sequence as u128 + 1), sequence, Utc::now())
    }

    fn interest_free(sequence: u64, balance: i64, minimum: i64) -> Debt {
        debt(sequence, DebtType::MedicalDebt, balance, 0, minimum)
    }

    #[test]
    fn test_single_debt_pays_off_exactly() {
        let debts = vec![interest_free(0, 100, 25)];
        let result = simulate(&debts, PayoffStrategy::Snowball, Money::ZERO, 600).unwrap();

        assert_eq!(result.months_simulated(), 4);
        assert!(result.is_complete());
        assert_eq!(result.payoff_month(debts[0].id), Some(3));

        let last = result.months.last().unwrap().entry(debts[0].id).unwrap();
        assert!(last.closed);
        assert_eq!(last.closing_balance, Money::ZERO);
    }

    #[test]
    fn test_roll_forward_of_freed_minimum() {
        let debts = vec![interest_free(0, 100, 25), interest_free(1, 1_000, 25)];
        let result = simulate(&debts, PayoffStrategy::Snowball, Money::ZERO, 600).unwrap();

        let first = debts[0].id;
        let second = debts[1].id;
        assert_eq!(result.payoff_month(first), Some(3));

        // before the first closes the follower only pays its own minimum
        for month in &result.months[..4] {
            assert_eq!(month.entry(second).unwrap().payment_applied, Money::from_major(25));
        }
        // afterwards it receives both minimums
        for month in &result.months[4..] {
            let entry = month.entry(second).unwrap();
            assert_eq!(entry.payment_applied, Money::from_major(50));
            assert_eq!(entry.extra_applied, Money::from_major(25));
            assert!(month.entry(first).is_none());
        }
        assert_eq!(result.payoff_month(second), Some(21));
    }

    #[test]
    fn test_surplus_beyond_target_balance_is_unused() {
        let debts = vec![interest_free(0, 30, 25), interest_free(1, 1_000, 25)];
        let result = simulate(&debts, PayoffStrategy::Snowball, Money::from_major(100), 600).unwrap();

        let month = &result.months[0];
        assert_eq!(month.pooled_budget, Money::from_major(150));

        let target = month.entry(debts[0].id).unwrap();
        assert!(target.targeted && target.closed);
        assert_eq!(target.extra_applied, Money::from_major(5));

        // the other debt only gets its own minimum this month
        let other = month.entry(debts[1].id).unwrap();
        assert_eq!(other.payment_applied, Money::from_major(25));
        assert_eq!(month.unused_budget, Money::from_major(95));
    }

    #[test]
    fn test_non_amortizing_debt_hits_horizon() {
        // 2% a month on 1000 is exactly the minimum
        let debts = vec![debt(0, DebtType::CreditCard, 1_000, 24, 20)];
        let result = simulate(&debts, PayoffStrategy::Avalanche, Money::ZERO, 24).unwrap();

        assert_eq!(result.months_simulated(), 24);
        assert!(result.exceeded_horizon);
        assert_eq!(result.unpaid, vec![debts[0].id]);
        assert_eq!(result.non_amortizing, vec![debts[0].id]);
        assert_eq!(result.payoff_month(debts[0].id), None);

        let last = result.months.last().unwrap().entry(debts[0].id).unwrap();
        assert_eq!(last.closing_balance, Money::from_major(1_000));
    }

    #[test]
    fn test_runaway_balance_stops_at_ceiling() {
        // 400% apr compounds a third a month against a 10 minimum
        let debts = vec![
            debt(0, DebtType::PaydayLoan, 1_000, 400, 10),
            interest_free(1, 5_000, 25),
        ];
        let simulator = Simulator::default();
        let ceiling = simulator.config().max_balance;
        let result = simulator.run(&debts, PayoffStrategy::Avalanche, Money::ZERO).unwrap();

        assert!(result.exceeded_horizon);
        assert_eq!(result.diverged, vec![debts[0].id]);
        assert!(result.unpaid.contains(&debts[0].id));
        assert!(result.months_simulated() < 600);
        assert_eq!(result.payoff_month(debts[0].id), None);

        for month in &result.months {
            let entry = month.entry(debts[0].id).unwrap();
            assert!(entry.closing_balance <= ceiling);
            assert_eq!(
                entry.closing_balance,
                entry.opening_balance + entry.interest_accrued - entry.payment_applied
            );
        }
    }

    #[test]
    fn test_balance_above_ceiling_ends_first_month() {
        let debts = vec![debt(0, DebtType::CreditCard, 1_000, 24, 30)];
        let simulator = Simulator::new(SimulationConfig {
            max_balance: Money::from_major(500),
            ..SimulationConfig::default()
        });
        let result = simulator.run(&debts, PayoffStrategy::Avalanche, Money::ZERO).unwrap();

        assert_eq!(result.months_simulated(), 1);
        assert_eq!(result.diverged, vec![debts[0].id]);
        let entry = result.months[0].entry(debts[0].id).unwrap();
        assert_eq!(entry.interest_accrued, Money::ZERO);
        assert_eq!(entry.closing_balance, Money::from_major(970));
    }

    #[test]
    fn test_non_amortizing_debt_rescued_by_roll_forward() {
        let debts = vec![
            interest_free(0, 100, 50),
            debt(1, DebtType::CreditCard, 1_000, 24, 20),
        ];
        let result = simulate(&debts, PayoffStrategy::Snowball, Money::ZERO, 600).unwrap();

        assert!(result.is_complete());
        assert_eq!(result.non_amortizing, vec![debts[1].id]);
        assert!(result.payoff_month(debts[1].id).is_some());
    }

    #[test]
    fn test_interest_accrues_before_payment() {
        let debts = vec![debt(0, DebtType::CreditCard, 1_000, 24, 30)];
        let result = simulate(&debts, PayoffStrategy::Avalanche, Money::ZERO, 600).unwrap();

        let first = result.months[0].entry(debts[0].id).unwrap();
        assert_eq!(first.interest_accrued, Money::from_major(20));
        assert_eq!(first.payment_applied, Money::from_major(30));
        assert_eq!(first.closing_balance, Money::from_major(990));
    }

    #[test]
    fn test_closed_and_zero_balance_debts_are_skipped() {
        let mut closed = interest_free(0, 500, 25);
        closed.status = crate::types::DebtStatus::Closed;
        let debts = vec![closed, interest_free(1, 50, 25)];

        let result = simulate(&debts, PayoffStrategy::Snowball, Money::ZERO, 600).unwrap();
        assert_eq!(result.debt_ids, vec![debts[1].id]);
        assert_eq!(result.months_simulated(), 2);
    }

    #[test]
    fn test_empty_input_yields_empty_trace() {
        let result = simulate(&[], PayoffStrategy::Snowball, Money::from_major(100), 600).unwrap();
        assert!(result.months.is_empty());
        assert!(result.is_complete());
        assert!(!result.exceeded_horizon);
    }

    #[test]
    fn test_negative_extra_rejected() {
        let debts = vec![interest_free(0, 100, 25)];
        let result = simulate(&debts, PayoffStrategy::Snowball, Money::from_major(-1), 600);
        assert!(matches!(result, Err(PayoffError::InvalidExtraPayment { .. })));
    }

    #[test]
    fn test_cancellation_stops_the_loop() {
        let debts = vec![interest_free(0, 100, 25)];
        let simulator = Simulator::default();
        let result = simulator.run_cancellable(&debts, PayoffStrategy::Snowball, Money::ZERO, || true);
        assert!(matches!(result, Err(PayoffError::Cancelled { month: 0 })));
    }
}
