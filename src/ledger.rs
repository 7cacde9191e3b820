//! The store's cash ledger.
//!
//! A single writer appends entries under one mutex: each posting reads the
//! current balance, computes the new running balance, checks the overdraft
//! policy and appends, all while holding the lock. Entries are ordered by
//! the sequence number the writer assigns, never by timestamp.
//!
//! Salary payments made in cash append a payment entry for the net salary
//! and an expense record for the gross salary in the same critical section.

use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::LedgerConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    ExpenseRecord, LedgerDirection, LedgerEntry, NewLedgerEntry, PayPeriod, PayrollRecord,
};

/// Expense category used for salary payments.
pub const SALARY_EXPENSE_CATEGORY: &str = "salary";

#[derive(Debug)]
struct LedgerState {
    entries: Vec<LedgerEntry>,
    expenses: Vec<ExpenseRecord>,
    balance: Decimal,
    next_sequence: u64,
}

/// A point-in-time copy of the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// Balance before the first entry.
    pub opening_balance: Decimal,
    /// Balance after the last entry.
    pub balance: Decimal,
    /// Entries in sequence order.
    pub entries: Vec<LedgerEntry>,
    /// Expense records in insertion order.
    pub expenses: Vec<ExpenseRecord>,
}

/// Single-writer cash ledger.
///
/// # Example
///
/// ```
/// use payroll_engine::config::LedgerConfig;
/// use payroll_engine::ledger::CashLedger;
/// use payroll_engine::models::{LedgerDirection, NewLedgerEntry};
/// use chrono::{NaiveDate, Utc};
/// use rust_decimal::Decimal;
///
/// let ledger = CashLedger::new(&LedgerConfig::default());
/// let entry = ledger
///     .post(
///         NewLedgerEntry {
///             entry_date: NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
///             direction: LedgerDirection::Receipt,
///             amount: Decimal::from(5_000_000),
///             description: "Daily sales".to_string(),
///             reference: None,
///         },
///         Utc::now(),
///     )
///     .unwrap();
///
/// assert_eq!(entry.sequence, 1);
/// assert_eq!(ledger.balance(), Decimal::from(5_000_000));
/// ```
#[derive(Debug)]
pub struct CashLedger {
    opening_balance: Decimal,
    allow_overdraft: bool,
    state: Mutex<LedgerState>,
}

impl CashLedger {
    /// Creates an empty ledger at the configured opening balance.
    pub fn new(config: &LedgerConfig) -> Self {
        Self {
            opening_balance: config.opening_balance,
            allow_overdraft: config.allow_overdraft,
            state: Mutex::new(LedgerState {
                entries: Vec::new(),
                expenses: Vec::new(),
                balance: config.opening_balance,
                next_sequence: 1,
            }),
        }
    }

    /// Appends a receipt or payment.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::LedgerRejected`] if the amount is negative or
    /// not whole VND, if the running balance would overflow, or if a payment
    /// would overdraw the ledger while overdrafts are disallowed. A rejected posting leaves the ledger
    /// unchanged.
    pub fn post(&self, entry: NewLedgerEntry, now: DateTime<Utc>) -> EngineResult<LedgerEntry> {
        let mut state = self.state.lock();
        self.append(&mut state, entry, now)
    }

    /// Records a cash salary payment for a payroll record.
    ///
    /// Appends a payment of `net_salary` and an expense of `gross_salary`
    /// as one step; either both are recorded or neither is.
    pub fn post_salary_payment(
        &self,
        record: &PayrollRecord,
        paid_date: NaiveDate,
        now: DateTime<Utc>,
    ) -> EngineResult<LedgerEntry> {
        let period = PayPeriod::new(record.draft.period_month, record.draft.period_year)?;
        let description = format!(
            "Salary payment {} for {}",
            record.draft.employee_id, period
        );

        let mut state = self.state.lock();
        let entry = self.append(
            &mut state,
            NewLedgerEntry {
                entry_date: paid_date,
                direction: LedgerDirection::Payment,
                amount: record.draft.net_salary,
                description: description.clone(),
                reference: Some(record.id.to_string()),
            },
            now,
        )?;
        state.expenses.push(ExpenseRecord {
            id: Uuid::new_v4(),
            category: SALARY_EXPENSE_CATEGORY.to_string(),
            amount: record.draft.gross_salary,
            expense_date: paid_date,
            description,
            payroll_id: Some(record.id),
        });
        Ok(entry)
    }

    /// Current cash balance.
    pub fn balance(&self) -> Decimal {
        self.state.lock().balance
    }

    /// All entries in sequence order.
    pub fn entries(&self) -> Vec<LedgerEntry> {
        self.state.lock().entries.clone()
    }

    /// All expense records in insertion order.
    pub fn expenses(&self) -> Vec<ExpenseRecord> {
        self.state.lock().expenses.clone()
    }

    /// A consistent copy of the whole ledger.
    pub fn snapshot(&self) -> LedgerSnapshot {
        let state = self.state.lock();
        LedgerSnapshot {
            opening_balance: self.opening_balance,
            balance: state.balance,
            entries: state.entries.clone(),
            expenses: state.expenses.clone(),
        }
    }

    fn append(
        &self,
        state: &mut LedgerState,
        entry: NewLedgerEntry,
        now: DateTime<Utc>,
    ) -> EngineResult<LedgerEntry> {
        if entry.amount < Decimal::ZERO {
            return Err(EngineError::LedgerRejected {
                amount: entry.amount,
                message: "amount must not be negative".to_string(),
            });
        }
        if !entry.amount.fract().is_zero() {
            return Err(EngineError::LedgerRejected {
                amount: entry.amount,
                message: "amount must be a whole VND amount".to_string(),
            });
        }

        let balance_after = match entry.direction {
            LedgerDirection::Receipt => state.balance.checked_add(entry.amount),
            LedgerDirection::Payment => state.balance.checked_sub(entry.amount),
        }
        .ok_or_else(|| EngineError::LedgerRejected {
            amount: entry.amount,
            message: "balance overflow".to_string(),
        })?;
        if balance_after < Decimal::ZERO && !self.allow_overdraft {
            return Err(EngineError::LedgerRejected {
                amount: entry.amount,
                message: format!(
                    "insufficient cash: balance {} would become {}",
                    state.balance, balance_after
                ),
            });
        }

        let appended = LedgerEntry {
            sequence: state.next_sequence,
            id: Uuid::new_v4(),
            entry_date: entry.entry_date,
            direction: entry.direction,
            amount: entry.amount,
            balance_after,
            description: entry.description,
            reference: entry.reference,
            recorded_at: now,
        };
        state.next_sequence += 1;
        state.balance = balance_after;
        state.entries.push(appended.clone());
        Ok(appended)
    }
}
