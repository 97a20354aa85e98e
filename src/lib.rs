pub mod config;
pub mod debt;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod ledger;
pub mod plan;
pub mod planner;
pub mod recommendations;
pub mod simulation;
pub mod strategy;
pub mod types;

// re-export key types
pub use config::{PlannerConfig, RecommendationConfig, SimulationConfig};
pub use debt::{Debt, DebtBuilder, DebtUpdate, NewDebt};
pub use decimal::{Money, Rate};
pub use errors::{InvalidDebtReason, PayoffError, Result};
pub use events::{CloseReason, Event, EventStore};
pub use ledger::{DebtLedger, LedgerSnapshot};
pub use plan::{payment_date, DebtPayoff, PayoffPlan, PayoffTiming, PlanAggregator, PlanRequest};
pub use planner::{compute_outcome, PayoffPlanner, PlanOutcome, PlanSlot, RequestTicket, SharedLedger};
pub use recommendations::{
    recommendations, Recommendation, RecommendationCategory, RecommendationEngine,
    RecommendationPriority,
};
pub use simulation::{simulate, DebtMonthEntry, SimulationMonth, SimulationResult, Simulator};
pub use strategy::PriorityKey;
pub use types::{DebtId, DebtStatus, DebtType, PayoffStrategy};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
