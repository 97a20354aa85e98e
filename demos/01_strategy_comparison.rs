/// strategy comparison - snowball vs. avalanche on the same ledger
use debt_payoff_rs::{
    DebtType, Money, NewDebt, PayoffPlanner, PayoffStrategy, PlanRequest, PlannerConfig, Rate,
    SafeTimeProvider, TimeSource,
};
use chrono::{TimeZone, Utc};
use tracing_subscriber::EnvFilter;

fn debt(name: &str, debt_type: DebtType, balance: i64, apr: u32, minimum: i64) -> Result<NewDebt, Box<dyn std::error::Error>> {
    Ok(NewDebt::builder()
        .name(name)
        .debt_type(debt_type)
        .balance(Money::from_major(balance))
        .apr(Rate::from_percentage(apr))
        .minimum_payment(Money::from_major(minimum))
        .build()?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== snowball vs. avalanche ===\n");

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    ));
    let planner = PayoffPlanner::new(PlannerConfig::default(), time)?;

    planner.add_debt(debt("Store card", DebtType::CreditCard, 900, 27, 35)?)?;
    planner.add_debt(debt("Visa", DebtType::CreditCard, 6_500, 21, 160)?)?;
    planner.add_debt(debt("Car loan", DebtType::AutoLoan, 11_000, 7, 290)?)?;
    planner.add_debt(debt("Dentist", DebtType::MedicalDebt, 400, 0, 40)?)?;

    let extra = Money::from_major(250);
    for strategy in [PayoffStrategy::Snowball, PayoffStrategy::Avalanche] {
        let outcome = planner.plan(PlanRequest::new(strategy, extra))?;
        let plan = &outcome.plan;

        println!("{} (extra {} / month)", strategy.label(), extra);
        println!("  debt-free:      {:?} ({:?} months)", plan.debt_free_date, plan.debt_free_month.map(|m| m + 1));
        println!("  total interest: {}", plan.total_interest.round_cents());
        println!("  interest saved: {}", plan.interest_saved.round_cents());
        println!("  payoff order:");

        let mut order: Vec<_> = plan.debts.iter().filter_map(|d| d.payoff.date().map(|date| (date, &d.name))).collect();
        order.sort();
        for (date, name) in order {
            println!("    {}  {}", date, name);
        }
        println!();
    }

    let latest = planner.latest_plan().ok_or("no plan published")?;
    println!("recommendations for the {} plan:", latest.request.strategy.label());
    for rec in &latest.recommendations {
        println!("  [{:?}/{:?}] {}", rec.priority, rec.category, rec.message);
    }

    Ok(())
}
