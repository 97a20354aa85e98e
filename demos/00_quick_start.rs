/// quick start - minimal example to get started
use debt_payoff_rs::{
    DebtType, Money, NewDebt, PayoffPlanner, PayoffStrategy, PlanRequest, PlannerConfig, Rate,
    SafeTimeProvider, TimeSource,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let planner = PayoffPlanner::new(PlannerConfig::default(), SafeTimeProvider::new(TimeSource::System))?;

    // a credit card and a personal loan
    planner.add_debt(
        NewDebt::builder()
            .name("Visa")
            .debt_type(DebtType::CreditCard)
            .balance(Money::from_major(4_200))
            .apr(Rate::from_percentage(22))
            .minimum_payment(Money::from_major(110))
            .build()?,
    )?;
    planner.add_debt(
        NewDebt::builder()
            .name("Personal loan")
            .debt_type(DebtType::PersonalLoan)
            .balance(Money::from_major(1_800))
            .apr(Rate::from_percentage(9))
            .minimum_payment(Money::from_major(75))
            .build()?,
    )?;

    // pay $150 above the minimums, highest rate first
    let outcome = planner.plan(PlanRequest::new(PayoffStrategy::Avalanche, Money::from_major(150)))?;

    println!("{}", serde_json::to_string_pretty(&outcome.plan)?);

    Ok(())
}
