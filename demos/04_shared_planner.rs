/// shared planner - one ledger edited and planned from several threads
use std::sync::Arc;
use std::thread;

use debt_payoff_rs::{
    DebtType, Money, NewDebt, PayoffError, PayoffPlanner, PayoffStrategy, PlanRequest,
    PlannerConfig, Rate, SafeTimeProvider, TimeSource,
};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debt_payoff_rs=info")))
        .init();

    println!("=== shared planner ===\n");

    let planner = Arc::new(PayoffPlanner::new(
        PlannerConfig::conservative(),
        SafeTimeProvider::new(TimeSource::System),
    )?);

    planner.add_debt(
        NewDebt::builder()
            .name("Visa")
            .debt_type(DebtType::CreditCard)
            .balance(Money::from_major(5_000))
            .apr(Rate::from_percentage(23))
            .minimum_payment(Money::from_major(125))
            .build()?,
    )?;
    planner.add_debt(
        NewDebt::builder()
            .name("Hospital bill")
            .debt_type(DebtType::MedicalDebt)
            .balance(Money::from_major(700))
            .minimum_payment(Money::from_major(35))
            .build()?,
    )?;

    // the user drags an "extra payment" slider; every position is a request
    let handles: Vec<_> = (0..8)
        .map(|step| {
            let planner = Arc::clone(&planner);
            thread::spawn(move || {
                let extra = Money::from_major(step * 50);
                planner.plan(PlanRequest::new(PayoffStrategy::Snowball, extra))
            })
        })
        .collect();

    for handle in handles {
        match handle.join().map_err(|_| "planner thread panicked")? {
            Ok(outcome) => println!("published generation {}", outcome.generation),
            Err(PayoffError::Superseded { generation }) => println!("dropped generation {}", generation),
            Err(e) => return Err(e.into()),
        }
    }

    let latest = planner.latest_plan().ok_or("no plan published")?;
    println!(
        "\nlatest: generation {} extra {} -> debt-free {:?}",
        latest.generation, latest.request.extra_monthly_payment, latest.plan.debt_free_date
    );

    Ok(())
}
