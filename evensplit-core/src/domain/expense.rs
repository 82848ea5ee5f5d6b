//! Expense domain models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single payment event as seen by the ledger engine
///
/// The whole amount is paid by `payer` and split evenly across every
/// member of the group. `M` is the member identifier type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense<M> {
    pub payer: M,
    pub amount: Decimal,
    #[serde(default)]
    pub description: String,
}

impl<M> Expense<M> {
    pub fn new(payer: M, amount: Decimal) -> Self {
        Self {
            payer,
            amount,
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// An expense as recorded against a stored group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub id: i64,
    pub group_id: i64,
    pub payer_id: i64,
    pub amount: Decimal,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// Input for recording a new expense
#[derive(Debug, Clone)]
pub struct NewExpense {
    pub group_id: i64,
    pub payer_id: i64,
    pub amount: Decimal,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl NewExpense {
    pub fn new(group_id: i64, payer_id: i64, amount: Decimal, description: impl Into<String>) -> Self {
        Self {
            group_id,
            payer_id,
            amount,
            description: description.into(),
            created_at: Utc::now(),
        }
    }
}

impl ExpenseRecord {
    /// Project the stored record into the engine's expense shape
    pub fn to_expense(&self) -> Expense<i64> {
        Expense {
            payer: self.payer_id,
            amount: self.amount,
            description: self.description.clone(),
        }
    }
}
