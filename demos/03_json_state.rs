/// json state - persist the ledger and inspect plan output
use debt_payoff_rs::{
    DebtLedger, DebtType, Money, NewDebt, PayoffPlanner, PayoffStrategy, PlanRequest,
    PlannerConfig, Rate, SafeTimeProvider, SharedLedger, TimeSource,
};
use chrono::{TimeZone, Utc};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== json state ===\n");

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    ));

    let mut ledger = DebtLedger::new();
    ledger.add(
        NewDebt::builder()
            .name("Student loan")
            .debt_type(DebtType::StudentLoan)
            .original_balance(Money::from_major(24_000))
            .balance(Money::from_major(17_350))
            .apr(Rate::from_percent(rust_decimal_macros::dec!(5.5)))
            .minimum_payment(Money::from_major(260))
            .build()?,
        &time,
    )?;

    // stage 1: the ledger as it would be stored
    let stored = ledger.to_json()?;
    println!("stored ledger");
    println!("-------------");
    println!("{}\n", stored);

    // stage 2: restore and plan
    let restored = DebtLedger::from_json(&stored)?;
    let planner = PayoffPlanner::with_ledger(PlannerConfig::default(), time, SharedLedger::new(restored))?;
    let outcome = planner.plan(PlanRequest::new(PayoffStrategy::Avalanche, Money::from_major(40)))?;

    println!("plan summary");
    println!("------------");
    println!("{}\n", serde_json::to_string_pretty(&outcome.plan)?);

    // stage 3: first year of the balance curve
    println!("first 12 months");
    println!("---------------");
    for (month, balance) in outcome.trace.total_balance_series().into_iter().take(12) {
        println!("  month {:>2}: {}", month, balance.round_cents());
    }

    // stage 4: configuration round-trips too
    let config = PlannerConfig::from_json(r#"{ "simulation": { "max_months": 240 } }"#)?;
    println!("\nconfig");
    println!("------");
    println!("{}", serde_json::to_string_pretty(&config)?);

    Ok(())
}
