use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// unique identifier for a debt
pub type DebtId = Uuid;

/// kind of debt, as tagged by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DebtType {
    CreditCard,
    PersonalLoan,
    AutoLoan,
    StudentLoan,
    Mortgage,
    MedicalDebt,
    PaydayLoan,
    FamilyLoan,
    Other,
}

impl DebtType {
    /// whether a debt of this type must carry a non-zero apr
    ///
    /// medical bills, loans from family and untyped debts are often
    /// interest free; lender products are not.
    pub fn requires_interest(&self) -> bool {
        !matches!(self, DebtType::MedicalDebt | DebtType::FamilyLoan | DebtType::Other)
    }
}

/// debt status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DebtStatus {
    /// still carrying a balance
    Open,
    /// paid off or retired by the user
    Closed,
}

/// order in which surplus payment capacity is routed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PayoffStrategy {
    /// smallest balance first
    Snowball,
    /// highest interest rate first
    Avalanche,
}

impl PayoffStrategy {
    /// the other strategy, used for comparisons
    pub fn alternate(&self) -> PayoffStrategy {
        match self {
            PayoffStrategy::Snowball => PayoffStrategy::Avalanche,
            PayoffStrategy::Avalanche => PayoffStrategy::Snowball,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PayoffStrategy::Snowball => "snowball",
            PayoffStrategy::Avalanche => "avalanche",
        }
    }
}

impl Default for PayoffStrategy {
    fn default() -> Self {
        PayoffStrategy::Avalanche
    }
}
