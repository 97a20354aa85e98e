use serde::{Deserialize, Serialize};

use crate::config::RecommendationConfig;
use crate::decimal::{Money, Rate};
use crate::ledger::LedgerSnapshot;
use crate::plan::PayoffPlan;
use crate::strategy;
use crate::types::DebtId;

/// machine-readable advisory kind, for picking iconography
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RecommendationCategory {
    NonAmortizing,
    HorizonExceeded,
    StrategySwitch,
    HighInterest,
    MinimumPaymentBurden,
    AccelerationOpportunity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RecommendationPriority {
    High,
    Medium,
    Low,
}

/// one advisory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub category: RecommendationCategory,
    pub priority: RecommendationPriority,
    pub message: String,
    /// debt the advice is about, if any
    pub debt_id: Option<DebtId>,
    /// headline figure (interest saved, shortfall, ...)
    pub amount: Option<Money>,
    /// headline month count (months saved, ...)
    pub months: Option<i64>,
}

impl Recommendation {
    fn new(
        category: RecommendationCategory,
        priority: RecommendationPriority,
        message: String,
    ) -> Self {
        Self {
            category,
            priority,
            message,
            debt_id: None,
            amount: None,
            months: None,
        }
    }

    fn for_debt(mut self, id: DebtId) -> Self {
        self.debt_id = Some(id);
        self
    }

    fn with_amount(mut self, amount: Money) -> Self {
        self.amount = Some(amount);
        self
    }

    fn with_months(mut self, months: i64) -> Self {
        self.months = Some(months);
        self
    }
}

/// derives advisories from a ledger and its plans
#[derive(Debug, Clone, Default)]
pub struct RecommendationEngine {
    config: RecommendationConfig,
}

impl RecommendationEngine {
    pub fn new(config: RecommendationConfig) -> Self {
        Self { config }
    }

    /// advisories ordered by priority, then category, then debt creation order
    pub fn generate(
        &self,
        ledger: &LedgerSnapshot,
        plan: &PayoffPlan,
        baseline: &PayoffPlan,
        alternate: Option<&PayoffPlan>,
    ) -> Vec<Recommendation> {
        let mut out = Vec::new();

        self.non_amortizing(ledger, plan, &mut out);
        self.horizon(plan, &mut out);
        if let Some(alternate) = alternate {
            self.strategy_switch(plan, alternate, &mut out);
        }
        self.high_interest(ledger, &mut out);
        self.minimum_burden(ledger, plan, &mut out);
        self.acceleration(ledger, plan, baseline, &mut out);

        let sequence_of = |r: &Recommendation| {
            r.debt_id
                .and_then(|id| ledger.get(id))
                .map(|d| d.sequence)
                .unwrap_or(0)
        };
        out.sort_by(|a, b| {
            a.priority
                .cmp(&b.priority)
                .then_with(|| a.category.cmp(&b.category))
                .then_with(|| sequence_of(a).cmp(&sequence_of(b)))
        });

        tracing::debug!(count = out.len(), "recommendations generated");
        out
    }

    fn non_amortizing(&self, ledger: &LedgerSnapshot, plan: &PayoffPlan, out: &mut Vec<Recommendation>) {
        for &id in &plan.non_amortizing {
            let Some(debt) = ledger.get(id) else { continue };
            let interest = debt.monthly_interest();
            let reachable = plan.payoff_month(id).is_some();

            let message = if reachable {
                format!(
                    "The minimum payment on {} ({}) does not cover its monthly interest ({}); \
                     it only gets paid off because freed-up payments roll onto it.",
                    debt.name,
                    debt.minimum_payment.round_cents(),
                    interest
                )
            } else {
                format!(
                    "The minimum payment on {} ({}) does not cover its monthly interest ({}); \
                     raise the payment or direct extra money to it.",
                    debt.name,
                    debt.minimum_payment.round_cents(),
                    interest
                )
            };

            let shortfall = interest.saturating_sub(debt.minimum_payment).round_cents();
            out.push(
                Recommendation::new(
                    RecommendationCategory::NonAmortizing,
                    if reachable { RecommendationPriority::Medium } else { RecommendationPriority::High },
                    message,
                )
                .for_debt(id)
                .with_amount(shortfall),
            );
        }
    }

    fn horizon(&self, plan: &PayoffPlan, out: &mut Vec<Recommendation>) {
        if !plan.exceeds_horizon {
            return;
        }
        let unpaid = plan.unreachable_debts().count();
        let years = plan.horizon_months / 12;
        let message = if plan.diverged.is_empty() {
            format!(
                "At the current payments {} debt(s) will not be paid off within {} years.",
                unpaid, years
            )
        } else {
            format!(
                "At the current payments {} debt(s) will never be paid off; \
                 interest grows faster than the payments.",
                unpaid
            )
        };
        out.push(
            Recommendation::new(
                RecommendationCategory::HorizonExceeded,
                RecommendationPriority::High,
                message,
            )
            .with_months(plan.horizon_months as i64),
        );
    }

    fn strategy_switch(&self, plan: &PayoffPlan, alternate: &PayoffPlan, out: &mut Vec<Recommendation>) {
        if alternate.strategy == plan.strategy {
            return;
        }

        let months_faster = match (plan.debt_free_month, alternate.debt_free_month) {
            (Some(current), Some(other)) if !plan.exceeds_horizon && !alternate.exceeds_horizon => {
                current as i64 - other as i64
            }
            _ => 0,
        };
        let interest_saved = plan.total_interest - alternate.total_interest;

        // both thresholds are exclusive; neither is negative
        let months_worth = months_faster > self.config.strategy_switch_months as i64;
        let interest_worth = interest_saved > self.config.strategy_switch_interest;
        if !months_worth && !interest_worth {
            return;
        }

        let message = match (months_faster > 0, interest_saved.is_positive()) {
            (true, true) => format!(
                "Switching to the {} method would make you debt-free {} month(s) sooner and save {} in interest.",
                alternate.strategy.label(),
                months_faster,
                interest_saved.round_cents()
            ),
            (true, false) => format!(
                "Switching to the {} method would make you debt-free {} month(s) sooner.",
                alternate.strategy.label(),
                months_faster
            ),
            _ => format!(
                "Switching to the {} method would save {} in interest.",
                alternate.strategy.label(),
                interest_saved.round_cents()
            ),
        };

        out.push(
            Recommendation::new(
                RecommendationCategory::StrategySwitch,
                RecommendationPriority::Medium,
                message,
            )
            .with_amount(interest_saved.max(Money::ZERO).round_cents())
            .with_months(months_faster.max(0)),
        );
    }

    fn high_interest(&self, ledger: &LedgerSnapshot, out: &mut Vec<Recommendation>) {
        if ledger.open_count() < 2 {
            return;
        }
        let average = ledger.average_apr();
        let threshold = average + self.config.high_apr_margin;

        for debt in ledger.open_debts() {
            if debt.apr < threshold || debt.apr < self.config.high_apr_floor {
                continue;
            }
            out.push(
                Recommendation::new(
                    RecommendationCategory::HighInterest,
                    RecommendationPriority::Medium,
                    format!(
                        "{} charges {} APR, well above your average of {}; \
                         consider a balance transfer or paying it down first.",
                        debt.name,
                        debt.apr,
                        Rate::from_decimal(average.as_decimal().round_dp(4))
                    ),
                )
                .for_debt(debt.id)
                .with_amount(debt.monthly_interest()),
            );
        }
    }

    fn minimum_burden(&self, ledger: &LedgerSnapshot, plan: &PayoffPlan, out: &mut Vec<Recommendation>) {
        let minimums = ledger.total_minimums();
        let budget = minimums + plan.extra_monthly_payment;

        if let Some(share) = minimums.ratio_of(budget) {
            if share > self.config.minimum_share_threshold {
                let percent = share.as_percentage().round_dp(0);
                out.push(
                    Recommendation::new(
                        RecommendationCategory::MinimumPaymentBurden,
                        RecommendationPriority::Low,
                        format!(
                            "Minimum payments take {}% of your {} monthly payoff budget, \
                             leaving little room to speed things up.",
                            percent,
                            budget.round_cents()
                        ),
                    )
                    .with_amount(minimums),
                );
            }
        }

        // a minimum out of proportion with the balance behind it
        if ledger.open_count() < 2 {
            return;
        }
        let total_balance = ledger.total_balance();
        for debt in ledger.open_debts() {
            let (Some(min_share), Some(balance_share)) = (
                debt.minimum_payment.ratio_of(minimums),
                debt.current_balance.ratio_of(total_balance),
            ) else {
                continue;
            };
            let limit = balance_share.as_decimal() * self.config.disproportionate_minimum_factor;
            if min_share.as_decimal() > limit {
                out.push(
                    Recommendation::new(
                        RecommendationCategory::MinimumPaymentBurden,
                        RecommendationPriority::Low,
                        format!(
                            "{} takes {}% of your minimum payments but holds only {}% of your balance.",
                            debt.name,
                            min_share.as_percentage().round_dp(0),
                            balance_share.as_percentage().round_dp(0)
                        ),
                    )
                    .for_debt(debt.id)
                    .with_amount(debt.minimum_payment),
                );
            }
        }
    }

    fn acceleration(
        &self,
        ledger: &LedgerSnapshot,
        plan: &PayoffPlan,
        baseline: &PayoffPlan,
        out: &mut Vec<Recommendation>,
    ) {
        if ledger.open_count() == 0 {
            return;
        }

        if plan.extra_monthly_payment.is_zero() {
            let target = strategy::order(&ledger.debts, plan.strategy)
                .first()
                .and_then(|id| ledger.get(*id))
                .map(|d| d.name.clone())
                .unwrap_or_default();
            out.push(Recommendation::new(
                RecommendationCategory::AccelerationOpportunity,
                RecommendationPriority::Medium,
                format!(
                    "Adding any extra amount each month shortens your payoff; \
                     under the {} method it would go to {} first.",
                    plan.strategy.label(),
                    target
                ),
            ));
            return;
        }

        if plan.interest_saved.is_positive() {
            let months = plan.months_saved.unwrap_or(0);
            let mut rec = Recommendation::new(
                RecommendationCategory::AccelerationOpportunity,
                RecommendationPriority::Low,
                format!(
                    "Your extra {} a month cuts total interest from {} to {} and saves {} month(s) \
                     compared with paying minimums only.",
                    plan.extra_monthly_payment.round_cents(),
                    baseline.total_interest.round_cents(),
                    plan.total_interest.round_cents(),
                    months
                ),
            )
            .with_amount(plan.interest_saved.round_cents());
            if plan.months_saved.is_some() {
                rec = rec.with_months(months);
            }
            out.push(rec);
        }
    }
}

/// stateless convenience wrapper
pub fn recommendations(
    ledger: &LedgerSnapshot,
    plan: &PayoffPlan,
    baseline: &PayoffPlan,
    alternate: Option<&PayoffPlan>,
    config: &RecommendationConfig,
) -> Vec<Recommendation> {
    RecommendationEngine::new(config.clone()).generate(ledger, plan, baseline, alternate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debt::{Debt, NewDebt};
    use crate::plan::PlanAggregator;
    use crate::simulation::simulate;
    use crate::types::{DebtType, PayoffStrategy};
    use chrono::{NaiveDate, TimeZone, Utc};
    use uuid::Uuid;

    fn debt(sequence: u64, name: &str, balance: i64, apr: u32, minimum: i64) -> Debt {
        let draft = NewDebt::builder()
            .name(name)
            .debt_type(DebtType::CreditCard)
            .balance(Money::from_major(balance))
            .apr(Rate::from_percentage(apr))
            .minimum_payment(Money::from_major(minimum))
            .build()
            .unwrap();
        Debt::from_draft(draft, Uuid::from_u128(sequence as u128 + 1), sequence, Utc::now())
    }

    struct Fixture {
        ledger: LedgerSnapshot,
        plan: PayoffPlan,
        baseline: PayoffPlan,
        alternate: PayoffPlan,
    }

    fn fixture(debts: Vec<Debt>, strategy: PayoffStrategy, extra: i64, horizon: u32) -> Fixture {
        let ledger = LedgerSnapshot::from_debts(debts, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let aggregator = PlanAggregator::new(&ledger, start);
        let run = |s: PayoffStrategy, e: i64| {
            aggregator.summarize(&simulate(&ledger.debts, s, Money::from_major(e), horizon).unwrap())
        };

        let baseline = run(strategy, 0);
        let plan = run(strategy, extra).with_baseline(&baseline);
        let alt_baseline = run(strategy.alternate(), 0);
        let alternate = run(strategy.alternate(), extra).with_baseline(&alt_baseline);

        Fixture { ledger, plan, baseline, alternate }
    }

    fn generate(f: &Fixture) -> Vec<Recommendation> {
        RecommendationEngine::default().generate(&f.ledger, &f.plan, &f.baseline, Some(&f.alternate))
    }

    fn categories(recs: &[Recommendation]) -> Vec<RecommendationCategory> {
        recs.iter().map(|r| r.category).collect()
    }

    #[test]
    fn test_flags_high_apr_debt() {
        let debts = vec![
            debt(0, "Store card", 2_000, 29, 80),
            debt(1, "Car", 2_000, 6, 80),
            debt(2, "Student", 2_000, 5, 80),
        ];
        let f = fixture(debts, PayoffStrategy::Avalanche, 100, 600);
        let recs = generate(&f);

        let high: Vec<_> = recs
            .iter()
            .filter(|r| r.category == RecommendationCategory::HighInterest)
            .collect();
        assert_eq!(high.len(), 1);
        assert_eq!(high[0].debt_id, Some(f.ledger.debts[0].id));
    }

    #[test]
    fn test_non_amortizing_and_horizon_are_high_priority() {
        let debts = vec![debt(0, "Card", 1_000, 24, 20)];
        let f = fixture(debts, PayoffStrategy::Avalanche, 0, 36);
        let recs = generate(&f);

        assert_eq!(recs[0].priority, RecommendationPriority::High);
        assert!(categories(&recs).contains(&RecommendationCategory::NonAmortizing));
        assert!(categories(&recs).contains(&RecommendationCategory::HorizonExceeded));

        let shortfall = recs
            .iter()
            .find(|r| r.category == RecommendationCategory::NonAmortizing)
            .and_then(|r| r.amount);
        assert_eq!(shortfall, Some(Money::ZERO));
    }

    #[test]
    fn test_zero_extra_suggests_acceleration_and_minimum_burden() {
        let debts = vec![debt(0, "Card", 1_000, 24, 30), debt(1, "Loan", 300, 10, 20)];
        let f = fixture(debts, PayoffStrategy::Snowball, 0, 600);
        let recs = generate(&f);

        let cats = categories(&recs);
        assert!(cats.contains(&RecommendationCategory::AccelerationOpportunity));
        assert!(cats.contains(&RecommendationCategory::MinimumPaymentBurden));

        let accel = recs
            .iter()
            .find(|r| r.category == RecommendationCategory::AccelerationOpportunity)
            .unwrap();
        // snowball targets the smaller loan first
        assert!(accel.message.contains("Loan"));
    }

    #[test]
    fn test_extra_payment_reports_savings() {
        let debts = vec![debt(0, "Card", 1_000, 24, 30), debt(1, "Loan", 300, 10, 20)];
        let f = fixture(debts, PayoffStrategy::Avalanche, 200, 600);
        let recs = generate(&f);

        let accel = recs
            .iter()
            .find(|r| r.category == RecommendationCategory::AccelerationOpportunity)
            .unwrap();
        assert_eq!(accel.amount, Some(f.plan.interest_saved.round_cents()));
        assert!(accel.months.unwrap() > 0);

        // 250 budget, 50 of it minimums: no burden warning
        assert!(!categories(&recs).contains(&RecommendationCategory::MinimumPaymentBurden));
    }

    #[test]
    fn test_strategy_switch_threshold() {
        let debts = vec![debt(0, "Card", 1_000, 24, 30), debt(1, "Loan", 300, 10, 20)];
        let f = fixture(debts, PayoffStrategy::Snowball, 100, 600);

        let strict = RecommendationConfig {
            strategy_switch_months: 100,
            strategy_switch_interest: Money::from_major(10_000),
            ..RecommendationConfig::default()
        };
        let recs = RecommendationEngine::new(strict).generate(&f.ledger, &f.plan, &f.baseline, Some(&f.alternate));
        assert!(!categories(&recs).contains(&RecommendationCategory::StrategySwitch));

        let eager = RecommendationConfig {
            strategy_switch_months: 0,
            strategy_switch_interest: Money::CENT,
            ..RecommendationConfig::default()
        };
        let recs = RecommendationEngine::new(eager).generate(&f.ledger, &f.plan, &f.baseline, Some(&f.alternate));
        assert!(categories(&recs).contains(&RecommendationCategory::StrategySwitch));
    }

    #[test]
    fn test_strategy_switch_needs_more_than_threshold() {
        let debts = vec![debt(0, "Card", 1_000, 24, 30), debt(1, "Loan", 300, 10, 20)];
        let f = fixture(debts, PayoffStrategy::Snowball, 100, 600);
        let months_gap = f.plan.debt_free_month.unwrap() as i64 - f.alternate.debt_free_month.unwrap() as i64;
        let interest_gap = f.plan.total_interest - f.alternate.total_interest;
        assert!(interest_gap.is_positive());

        // a gap exactly at both thresholds is not enough
        let at_threshold = RecommendationConfig {
            strategy_switch_months: months_gap.max(0) as u32,
            strategy_switch_interest: interest_gap,
            ..RecommendationConfig::default()
        };
        let recs =
            RecommendationEngine::new(at_threshold).generate(&f.ledger, &f.plan, &f.baseline, Some(&f.alternate));
        assert!(!categories(&recs).contains(&RecommendationCategory::StrategySwitch));

        let just_below = RecommendationConfig {
            strategy_switch_months: months_gap.max(0) as u32,
            strategy_switch_interest: interest_gap - Money::CENT,
            ..RecommendationConfig::default()
        };
        let recs =
            RecommendationEngine::new(just_below).generate(&f.ledger, &f.plan, &f.baseline, Some(&f.alternate));
        assert!(categories(&recs).contains(&RecommendationCategory::StrategySwitch));
    }

    #[test]
    fn test_disproportionate_minimum() {
        let debts = vec![debt(0, "Small", 200, 20, 100), debt(1, "Large", 9_800, 20, 100)];
        let f = fixture(debts, PayoffStrategy::Avalanche, 1_000, 600);
        let recs = generate(&f);

        let flagged: Vec<_> = recs
            .iter()
            .filter(|r| r.category == RecommendationCategory::MinimumPaymentBurden)
            .filter_map(|r| r.debt_id)
            .collect();
        assert_eq!(flagged, vec![f.ledger.debts[0].id]);
    }

    #[test]
    fn test_output_is_sorted_and_deterministic() {
        let debts = vec![
            debt(0, "Card", 1_000, 24, 20),
            debt(1, "Loan", 300, 10, 20),
            debt(2, "Store", 500, 29, 25),
        ];
        let f = fixture(debts, PayoffStrategy::Snowball, 0, 120);
        let first = generate(&f);
        let second = generate(&f);

        assert_eq!(first, second);
        for pair in first.windows(2) {
            assert!(pair[0].priority <= pair[1].priority);
        }
    }
}
