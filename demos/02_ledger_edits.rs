/// ledger edits - balances change, events are recorded, plans go stale
use debt_payoff_rs::{
    DebtLedger, DebtType, DebtUpdate, Money, NewDebt, PayoffStrategy, PlanRequest, PlannerConfig,
    Rate, SafeTimeProvider, TimeSource,
};
use debt_payoff_rs::planner::compute_outcome;
use chrono::{Duration, TimeZone, Utc};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== ledger edits ===\n");

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    ));
    let controller = time.test_control().unwrap();
    let config = PlannerConfig::default();
    let mut ledger = DebtLedger::new();

    let card = ledger.add(
        NewDebt::builder()
            .name("Mastercard")
            .debt_type(DebtType::CreditCard)
            .lender("First Bank")
            .balance(Money::from_major(3_000))
            .apr(Rate::from_percentage(19))
            .minimum_payment(Money::from_major(90))
            .due_day(28)
            .build()?,
        &time,
    )?;
    let family = ledger.add(
        NewDebt::builder()
            .name("Loan from Mom")
            .debt_type(DebtType::FamilyLoan)
            .balance(Money::from_major(1_200))
            .minimum_payment(Money::from_major(50))
            .build()?,
        &time,
    )?;

    let request = PlanRequest::new(PayoffStrategy::Snowball, Money::from_major(100));
    let before = compute_outcome(&ledger.snapshot(&time), request, &config, time.now().date_naive())?;
    println!("revision {}: debt-free {:?}", before.ledger_revision, before.plan.debt_free_date);

    // a month later: a statement arrives and the card raises its rate
    controller.advance(Duration::days(30));
    ledger.update(card, DebtUpdate::balance(Money::from_major(2_850)), &time)?;
    ledger.update(card, DebtUpdate::apr(Rate::from_percentage(24)), &time)?;

    // the family loan gets settled outright
    ledger.update(family, DebtUpdate::balance(Money::ZERO), &time)?;

    let after = compute_outcome(&ledger.snapshot(&time), request, &config, time.now().date_naive())?;
    println!("revision {}: debt-free {:?}", after.ledger_revision, after.plan.debt_free_date);
    println!("  open debts: {}", ledger.open_debts().count());

    // editing a closed debt is refused
    if let Err(e) = ledger.update(family, DebtUpdate::minimum_payment(Money::from_major(10)), &time) {
        println!("  rejected: {}", e);
    }

    println!("\nevents:");
    for event in ledger.take_events() {
        println!("  {:?}", event);
    }

    Ok(())
}
