use thiserror::Error;

use crate::decimal::{Money, Rate};
use crate::types::{DebtId, DebtType};

/// reasons a debt record is rejected by the ledger
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidDebtReason {
    #[error("name must not be empty")]
    EmptyName,

    #[error("negative balance: {balance}")]
    NegativeBalance {
        balance: Money,
    },

    #[error("negative interest rate: {rate}")]
    NegativeRate {
        rate: Rate,
    },

    #[error("{debt_type:?} requires a non-zero interest rate")]
    ZeroRateNotAllowed {
        debt_type: DebtType,
    },

    #[error("minimum payment must be positive for an open debt, got {minimum}")]
    NonPositiveMinimum {
        minimum: Money,
    },

    #[error("due day must be within 1..=31, got {day}")]
    InvalidDueDay {
        day: u8,
    },
}

#[derive(Error, Debug)]
pub enum PayoffError {
    #[error("invalid debt: {reason}")]
    InvalidDebt {
        reason: InvalidDebtReason,
    },

    #[error("debt not found: {id}")]
    DebtNotFound {
        id: DebtId,
    },

    #[error("debt already closed: {id}")]
    DebtAlreadyClosed {
        id: DebtId,
    },

    #[error("duplicate debt id: {id}")]
    DuplicateDebt {
        id: DebtId,
    },

    #[error("invalid extra payment: {amount}")]
    InvalidExtraPayment {
        amount: Money,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("simulation cancelled at month {month}")]
    Cancelled {
        month: u32,
    },

    #[error("plan request {generation} superseded by a newer request")]
    Superseded {
        generation: u64,
    },
}

impl From<InvalidDebtReason> for PayoffError {
    fn from(reason: InvalidDebtReason) -> Self {
        PayoffError::InvalidDebt { reason }
    }
}

pub type Result<T> = std::result::Result<T, PayoffError>;
