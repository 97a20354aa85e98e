use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use chrono::NaiveDate;
use hourglass_rs::SafeTimeProvider;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use serde::{Deserialize, Serialize};

use crate::config::PlannerConfig;
use crate::debt::{Debt, DebtUpdate, NewDebt};
use crate::decimal::Money;
use crate::errors::{PayoffError, Result};
use crate::events::Event;
use crate::ledger::{DebtLedger, LedgerSnapshot};
use crate::plan::{PayoffPlan, PlanAggregator, PlanRequest};
use crate::recommendations::{Recommendation, RecommendationEngine};
use crate::simulation::{SimulationResult, Simulator};
use crate::types::DebtId;

/// ledger handle shared between the editor and the planner; ledger events
/// accumulate until drained with `PayoffPlanner::take_events`
#[derive(Debug, Clone, Default)]
pub struct SharedLedger {
    inner: Arc<RwLock<DebtLedger>>,
}

impl SharedLedger {
    pub fn new(ledger: DebtLedger) -> Self {
        Self {
            inner: Arc::new(RwLock::new(ledger)),
        }
    }

    /// copy-on-read view tagged with the ledger revision
    pub fn snapshot(&self, time_provider: &SafeTimeProvider) -> LedgerSnapshot {
        self.inner.read().snapshot(time_provider)
    }

    pub fn read(&self) -> RwLockReadGuard<'_, DebtLedger> {
        self.inner.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, DebtLedger> {
        self.inner.write()
    }

    pub fn revision(&self) -> u64 {
        self.inner.read().revision()
    }
}

/// everything produced for one plan request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanOutcome {
    /// request generation this outcome answers; 0 when computed outside a slot
    pub generation: u64,
    pub request: PlanRequest,
    pub ledger_revision: u64,
    pub plan: PayoffPlan,
    /// same strategy, minimums only
    pub baseline: PayoffPlan,
    /// the other strategy at the same extra payment
    pub alternate: PayoffPlan,
    /// month-by-month trace behind `plan`
    pub trace: SimulationResult,
    pub recommendations: Vec<Recommendation>,
}

/// proof of a plan request, ordered by issue time
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestTicket(u64);

impl RequestTicket {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

/// latest-request-wins publication point
#[derive(Debug, Default)]
pub struct PlanSlot {
    generation: AtomicU64,
    latest: ArcSwapOption<PlanOutcome>,
}

impl PlanSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// register a new request, superseding every earlier one
    pub fn begin(&self) -> RequestTicket {
        RequestTicket(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket.0
    }

    /// publish unless a newer request has been issued or published
    pub fn publish(&self, ticket: RequestTicket, mut outcome: PlanOutcome) -> Result<Arc<PlanOutcome>> {
        if !self.is_current(ticket) {
            tracing::debug!(generation = ticket.0, "dropping superseded plan");
            return Err(PayoffError::Superseded { generation: ticket.0 });
        }

        outcome.generation = ticket.0;
        let outcome = Arc::new(outcome);
        let mut published = false;
        self.latest.rcu(|current| match current {
            Some(existing) if existing.generation > ticket.0 => {
                published = false;
                Some(Arc::clone(existing))
            }
            _ => {
                published = true;
                Some(Arc::clone(&outcome))
            }
        });

        if published {
            Ok(outcome)
        } else {
            Err(PayoffError::Superseded { generation: ticket.0 })
        }
    }

    /// most recently published outcome
    pub fn latest(&self) -> Option<Arc<PlanOutcome>> {
        self.latest.load_full()
    }

    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }
}

/// run the full pipeline against a snapshot
pub fn compute_outcome(
    snapshot: &LedgerSnapshot,
    request: PlanRequest,
    config: &PlannerConfig,
    start_date: NaiveDate,
) -> Result<PlanOutcome> {
    compute_outcome_cancellable(snapshot, request, config, start_date, || false)
}

fn compute_outcome_cancellable<F>(
    snapshot: &LedgerSnapshot,
    request: PlanRequest,
    config: &PlannerConfig,
    start_date: NaiveDate,
    cancelled: F,
) -> Result<PlanOutcome>
where
    F: Fn() -> bool,
{
    request.validate()?;

    let simulator = Simulator::new(config.simulation.clone());
    let aggregator = PlanAggregator::new(snapshot, start_date);
    let debts = &snapshot.debts;
    let extra = request.extra_monthly_payment;
    let alternate_strategy = request.strategy.alternate();

    let trace = simulator.run_cancellable(debts, request.strategy, extra, &cancelled)?;
    let baseline_trace = simulator.run_cancellable(debts, request.strategy, Money::ZERO, &cancelled)?;
    let alternate_trace = simulator.run_cancellable(debts, alternate_strategy, extra, &cancelled)?;
    let alternate_baseline_trace =
        simulator.run_cancellable(debts, alternate_strategy, Money::ZERO, &cancelled)?;

    let baseline = aggregator.summarize(&baseline_trace);
    let baseline = baseline.clone().with_baseline(&baseline);
    let plan = aggregator.summarize(&trace).with_baseline(&baseline);
    let alternate = aggregator
        .summarize(&alternate_trace)
        .with_baseline(&aggregator.summarize(&alternate_baseline_trace));

    let recommendations = RecommendationEngine::new(config.recommendations.clone()).generate(
        snapshot,
        &plan,
        &baseline,
        Some(&alternate),
    );

    Ok(PlanOutcome {
        generation: 0,
        request,
        ledger_revision: snapshot.revision,
        plan,
        baseline,
        alternate,
        trace,
        recommendations,
    })
}

/// facade over the shared ledger and the plan pipeline
pub struct PayoffPlanner {
    ledger: SharedLedger,
    config: PlannerConfig,
    time: SafeTimeProvider,
    slot: PlanSlot,
}

impl PayoffPlanner {
    pub fn new(config: PlannerConfig, time: SafeTimeProvider) -> Result<Self> {
        Self::with_ledger(config, time, SharedLedger::default())
    }

    /// plan against an existing (possibly restored) ledger
    pub fn with_ledger(config: PlannerConfig, time: SafeTimeProvider, ledger: SharedLedger) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            ledger,
            config,
            time,
            slot: PlanSlot::new(),
        })
    }

    pub fn add_debt(&self, draft: NewDebt) -> Result<DebtId> {
        self.ledger.write().add(draft, &self.time)
    }

    pub fn remove_debt(&self, id: DebtId) -> Result<Debt> {
        self.ledger.write().remove(id, &self.time)
    }

    pub fn close_debt(&self, id: DebtId) -> Result<()> {
        self.ledger.write().close(id, &self.time)
    }

    pub fn update_debt(&self, id: DebtId, update: DebtUpdate) -> Result<Debt> {
        self.ledger.write().update(id, update, &self.time).cloned()
    }

    /// drain ledger events recorded since the last call
    pub fn take_events(&self) -> Vec<Event> {
        self.ledger.write().take_events()
    }

    pub fn ledger(&self) -> &SharedLedger {
        &self.ledger
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn time(&self) -> &SafeTimeProvider {
        &self.time
    }

    /// compute and publish a plan; fails with `Superseded` if a newer
    /// request started before this one finished
    pub fn plan(&self, request: PlanRequest) -> Result<Arc<PlanOutcome>> {
        let ticket = self.slot.begin();
        let snapshot = self.ledger.snapshot(&self.time);
        let start_date = self.time.now().date_naive();

        tracing::info!(
            generation = ticket.generation(),
            strategy = request.strategy.label(),
            extra = %request.extra_monthly_payment,
            revision = snapshot.revision,
            debts = snapshot.open_count(),
            "planning"
        );

        let outcome = compute_outcome_cancellable(&snapshot, request, &self.config, start_date, || {
            !self.slot.is_current(ticket)
        })
        .map_err(|e| match e {
            PayoffError::Cancelled { .. } => PayoffError::Superseded {
                generation: ticket.generation(),
            },
            other => other,
        })?;

        let published = self.slot.publish(ticket, outcome)?;
        tracing::info!(
            generation = ticket.generation(),
            debt_free_month = ?published.plan.debt_free_month,
            total_interest = %published.plan.total_interest,
            recommendations = published.recommendations.len(),
            "plan published"
        );
        Ok(published)
    }

    pub fn latest_plan(&self) -> Option<Arc<PlanOutcome>> {
        self.slot.latest()
    }

    /// true when the latest plan was computed from the current ledger
    pub fn is_plan_fresh(&self) -> bool {
        self.latest_plan()
            .map(|p| p.ledger_revision == self.ledger.revision())
            .unwrap_or(false)
    }
}
