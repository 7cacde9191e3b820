//! Cash-ledger and expense models.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Whether a ledger entry brings cash in or takes it out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerDirection {
    /// Cash received.
    Receipt,
    /// Cash paid out.
    Payment,
}

/// A posting request for the cash ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLedgerEntry {
    /// The business date of the movement.
    pub entry_date: NaiveDate,
    /// Direction of the movement.
    pub direction: LedgerDirection,
    /// Positive amount in VND.
    pub amount: Decimal,
    /// Free-text description.
    pub description: String,
    /// Identifier of the originating document, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

/// An appended cash-ledger entry with its running balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Position in the ledger, assigned by the single writer. Starts at 1.
    pub sequence: u64,
    /// Unique identifier for the entry.
    pub id: Uuid,
    /// The business date of the movement.
    pub entry_date: NaiveDate,
    /// Direction of the movement.
    pub direction: LedgerDirection,
    /// Positive amount in VND.
    pub amount: Decimal,
    /// Cash balance after this entry.
    pub balance_after: Decimal,
    /// Free-text description.
    pub description: String,
    /// Identifier of the originating document, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// When the entry was appended.
    pub recorded_at: DateTime<Utc>,
}

/// An expense line recorded alongside a payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    /// Unique identifier for the expense.
    pub id: Uuid,
    /// Expense category (e.g. "salary").
    pub category: String,
    /// Amount in VND.
    pub amount: Decimal,
    /// The business date of the expense.
    pub expense_date: NaiveDate,
    /// Free-text description.
    pub description: String,
    /// The payroll record that caused the expense, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payroll_id: Option<Uuid>,
}
