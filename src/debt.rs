use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::{InvalidDebtReason, Result};
use crate::types::{DebtId, DebtStatus, DebtType};

/// a single debt record held by the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Debt {
    pub id: DebtId,
    pub name: String,
    pub debt_type: DebtType,
    pub lender: Option<String>,
    pub original_balance: Money,
    pub current_balance: Money,
    /// annual percentage rate
    pub apr: Rate,
    pub minimum_payment: Money,
    pub due_day: u8,
    pub status: DebtStatus,
    /// creation order, used as the final priority tiebreak
    pub sequence: u64,
    pub created_at: DateTime<Utc>,
}

impl Debt {
    pub(crate) fn from_draft(
        draft: NewDebt,
        id: DebtId,
        sequence: u64,
        created_at: DateTime<Utc>,
    ) -> Self {
        let status = if draft.current_balance.is_zero() {
            DebtStatus::Closed
        } else {
            DebtStatus::Open
        };

        Self {
            id,
            name: draft.name,
            debt_type: draft.debt_type,
            lender: draft.lender,
            original_balance: draft.original_balance,
            current_balance: draft.current_balance,
            apr: draft.apr,
            minimum_payment: draft.minimum_payment,
            due_day: draft.due_day,
            status,
            sequence,
            created_at,
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == DebtStatus::Open
    }

    /// interest one month adds at the current balance
    pub fn monthly_interest(&self) -> Money {
        self.current_balance.monthly_interest(self.apr)
    }

    /// minimum payment does not cover a month of interest
    pub fn is_non_amortizing(&self) -> bool {
        self.is_open() && self.minimum_payment <= self.monthly_interest()
    }

    /// check every field invariant
    pub fn validate(&self) -> Result<()> {
        validate_fields(
            &self.name,
            self.debt_type,
            self.original_balance,
            self.current_balance,
            self.apr,
            self.minimum_payment,
            self.due_day,
            self.is_open(),
        )
    }
}

#[allow(clippy::too_many_arguments)]
fn validate_fields(
    name: &str,
    debt_type: DebtType,
    original_balance: Money,
    current_balance: Money,
    apr: Rate,
    minimum_payment: Money,
    due_day: u8,
    open: bool,
) -> Result<()> {
    if name.trim().is_empty() {
        return Err(InvalidDebtReason::EmptyName.into());
    }

    for balance in [original_balance, current_balance] {
        if balance.is_negative() {
            return Err(InvalidDebtReason::NegativeBalance { balance }.into());
        }
    }

    if apr.is_negative() {
        return Err(InvalidDebtReason::NegativeRate { rate: apr }.into());
    }

    if apr.is_zero() && debt_type.requires_interest() {
        return Err(InvalidDebtReason::ZeroRateNotAllowed { debt_type }.into());
    }

    if open && !minimum_payment.is_positive() {
        return Err(InvalidDebtReason::NonPositiveMinimum { minimum: minimum_payment }.into());
    }

    if !(1..=31).contains(&due_day) {
        return Err(InvalidDebtReason::InvalidDueDay { day: due_day }.into());
    }

    Ok(())
}

/// validated input for adding a debt; the ledger assigns identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDebt {
    pub name: String,
    pub debt_type: DebtType,
    pub lender: Option<String>,
    pub original_balance: Money,
    pub current_balance: Money,
    pub apr: Rate,
    pub minimum_payment: Money,
    pub due_day: u8,
}

impl NewDebt {
    pub fn builder() -> DebtBuilder {
        DebtBuilder::new()
    }

    pub fn validate(&self) -> Result<()> {
        validate_fields(
            &self.name,
            self.debt_type,
            self.original_balance,
            self.current_balance,
            self.apr,
            self.minimum_payment,
            self.due_day,
            !self.current_balance.is_zero(),
        )
    }
}

/// builder for new debts
#[derive(Debug, Default)]
pub struct DebtBuilder {
    name: Option<String>,
    debt_type: Option<DebtType>,
    lender: Option<String>,
    original_balance: Option<Money>,
    current_balance: Option<Money>,
    apr: Option<Rate>,
    minimum_payment: Option<Money>,
    due_day: Option<u8>,
}

impl DebtBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn debt_type(mut self, debt_type: DebtType) -> Self {
        self.debt_type = Some(debt_type);
        self
    }

    pub fn lender(mut self, lender: impl Into<String>) -> Self {
        self.lender = Some(lender.into());
        self
    }

    pub fn original_balance(mut self, amount: Money) -> Self {
        self.original_balance = Some(amount);
        self
    }

    pub fn balance(mut self, amount: Money) -> Self {
        self.current_balance = Some(amount);
        self
    }

    pub fn apr(mut self, rate: Rate) -> Self {
        self.apr = Some(rate);
        self
    }

    pub fn minimum_payment(mut self, amount: Money) -> Self {
        self.minimum_payment = Some(amount);
        self
    }

    pub fn due_day(mut self, day: u8) -> Self {
        self.due_day = Some(day);
        self
    }

    /// Build and validate. The original balance defaults to the current
    /// balance, the due day to the 1st and the type to `Other`.
    pub fn build(self) -> Result<NewDebt> {
        let current_balance = self.current_balance.unwrap_or(Money::ZERO);

        let draft = NewDebt {
            name: self.name.unwrap_or_default(),
            debt_type: self.debt_type.unwrap_or(DebtType::Other),
            lender: self.lender,
            original_balance: self.original_balance.unwrap_or(current_balance),
            current_balance,
            apr: self.apr.unwrap_or(Rate::ZERO),
            minimum_payment: self.minimum_payment.unwrap_or(Money::ZERO),
            due_day: self.due_day.unwrap_or(1),
        };

        draft.validate()?;
        Ok(draft)
    }
}

/// partial edit of a debt's mutable fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DebtUpdate {
    pub name: Option<String>,
    pub debt_type: Option<DebtType>,
    pub lender: Option<String>,
    pub original_balance: Option<Money>,
    pub current_balance: Option<Money>,
    pub apr: Option<Rate>,
    pub minimum_payment: Option<Money>,
    pub due_day: Option<u8>,
}

impl DebtUpdate {
    pub fn balance(amount: Money) -> Self {
        Self {
            current_balance: Some(amount),
            ..Self::default()
        }
    }

    pub fn apr(rate: Rate) -> Self {
        Self {
            apr: Some(rate),
            ..Self::default()
        }
    }

    pub fn minimum_payment(amount: Money) -> Self {
        Self {
            minimum_payment: Some(amount),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// apply onto a copy of the debt; the caller validates the result
    pub(crate) fn apply_to(&self, debt: &Debt) -> Debt {
        let mut updated = debt.clone();
        if let Some(name) = &self.name {
            updated.name = name.clone();
        }
        if let Some(debt_type) = self.debt_type {
            updated.debt_type = debt_type;
        }
        if let Some(lender) = &self.lender {
            updated.lender = Some(lender.clone());
        }
        if let Some(original) = self.original_balance {
            updated.original_balance = original;
        }
        if let Some(balance) = self.current_balance {
            updated.current_balance = balance;
        }
        if let Some(apr) = self.apr {
            updated.apr = apr;
        }
        if let Some(minimum) = self.minimum_payment {
            updated.minimum_payment = minimum;
        }
        if let Some(day) = self.due_day {
            updated.due_day = day;
        }
        updated
    }
}
