//! In-memory payroll record store.
//!
//! Records are keyed by id and indexed by `(employee, month, year)`, so one
//! employee has at most one record per period. Every operation that reads a
//! status and writes a new one does both under a single write lock.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::ledger::CashLedger;
use crate::models::{PayPeriod, PaymentMethod, PayrollDraft, PayrollRecord, PayrollState};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PeriodKey {
    employee_id: String,
    month: u32,
    year: i32,
}

impl PeriodKey {
    fn of(draft: &PayrollDraft) -> Self {
        Self {
            employee_id: draft.employee_id.clone(),
            month: draft.period_month,
            year: draft.period_year,
        }
    }
}

#[derive(Debug, Default)]
struct StoreState {
    records: HashMap<Uuid, PayrollRecord>,
    by_period: HashMap<PeriodKey, Uuid>,
}

/// One id that could not be approved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalRejection {
    /// The rejected payroll id.
    pub payroll_id: Uuid,
    /// Stable error code (e.g. `PAYROLL_NOT_FOUND`, `INVALID_TRANSITION`).
    pub code: String,
    /// Human-readable reason.
    pub message: String,
}

/// The result of a batch approval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalOutcome {
    /// Records moved to `approved`, in request order.
    pub approved: Vec<PayrollRecord>,
    /// Ids left untouched, with the reason.
    pub rejected: Vec<ApprovalRejection>,
}

/// Thread-safe payroll record store.
#[derive(Debug, Default)]
pub struct PayrollStore {
    state: RwLock<StoreState>,
}

impl PayrollStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a new record for the draft's period, or overwrites the
    /// existing one while it is still `calculated`.
    ///
    /// Overwriting with a draft equal to the stored one returns the stored
    /// record unchanged, `updated_at` included.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::PayrollLocked`] if the period's record is
    /// already approved or paid.
    pub fn upsert(&self, draft: PayrollDraft, now: DateTime<Utc>) -> EngineResult<PayrollRecord> {
        let key = PeriodKey::of(&draft);
        let mut state = self.state.write();

        if let Some(id) = state.by_period.get(&key).copied() {
            let record = state
                .records
                .get_mut(&id)
                .ok_or(EngineError::PayrollNotFound { payroll_id: id })?;

            if !record.state.is_recalculable() {
                return Err(EngineError::PayrollLocked {
                    payroll_id: id,
                    employee_id: key.employee_id,
                    status: record.status(),
                });
            }
            if record.draft != draft {
                record.draft = draft;
                record.updated_at = now;
                debug!(payroll_id = %id, "Payroll record recalculated");
            }
            return Ok(record.clone());
        }

        let record = PayrollRecord {
            id: Uuid::new_v4(),
            draft,
            state: PayrollState::Calculated,
            created_at: now,
            updated_at: now,
        };
        state.by_period.insert(key, record.id);
        state.records.insert(record.id, record.clone());
        debug!(payroll_id = %record.id, "Payroll record created");
        Ok(record)
    }

    /// Approves each id that is currently `calculated`.
    ///
    /// Ids that are unknown or in any other state are rejected one by one
    /// and left untouched; they never fail the rest of the batch.
    pub fn approve(&self, ids: &[Uuid], approved_by: &str, now: DateTime<Utc>) -> ApprovalOutcome {
        let mut state = self.state.write();
        let mut outcome = ApprovalOutcome {
            approved: Vec::new(),
            rejected: Vec::new(),
        };

        for &id in ids {
            let result = match state.records.get_mut(&id) {
                Some(record) => record.state.approve(id, approved_by, now).map(|next| {
                    record.state = next;
                    record.updated_at = now;
                    record.clone()
                }),
                None => Err(EngineError::PayrollNotFound { payroll_id: id }),
            };
            match result {
                Ok(record) => outcome.approved.push(record),
                Err(err) => outcome.rejected.push(ApprovalRejection {
                    payroll_id: id,
                    code: err.code().to_string(),
                    message: err.to_string(),
                }),
            }
        }

        outcome
    }

    /// Marks an approved record as paid.
    ///
    /// Cash payments are posted to `ledger` before the new state is
    /// committed; if the posting fails the record stays `approved`.
    ///
    /// # Errors
    ///
    /// - [`EngineError::PayrollNotFound`] for an unknown id
    /// - [`EngineError::InvalidTransition`] unless the record is `approved`
    /// - [`EngineError::LedgerRejected`] if the cash posting is refused
    pub fn mark_paid(
        &self,
        id: Uuid,
        payment_method: PaymentMethod,
        paid_date: NaiveDate,
        ledger: &CashLedger,
        now: DateTime<Utc>,
    ) -> EngineResult<PayrollRecord> {
        let mut state = self.state.write();
        let record = state
            .records
            .get_mut(&id)
            .ok_or(EngineError::PayrollNotFound { payroll_id: id })?;

        let next = record.state.pay(id, payment_method, paid_date)?;
        if payment_method == PaymentMethod::Cash {
            ledger.post_salary_payment(record, paid_date, now)?;
        }
        record.state = next;
        record.updated_at = now;
        Ok(record.clone())
    }

    /// Looks up a record by id.
    pub fn get(&self, id: Uuid) -> EngineResult<PayrollRecord> {
        self.state
            .read()
            .records
            .get(&id)
            .cloned()
            .ok_or(EngineError::PayrollNotFound { payroll_id: id })
    }

    /// Looks up an employee's record for a period.
    pub fn find(&self, employee_id: &str, period: &PayPeriod) -> Option<PayrollRecord> {
        let state = self.state.read();
        let key = PeriodKey {
            employee_id: employee_id.to_string(),
            month: period.month(),
            year: period.year(),
        };
        state
            .by_period
            .get(&key)
            .and_then(|id| state.records.get(id))
            .cloned()
    }

    /// All records for a period, ordered by employee id.
    pub fn list_period(&self, period: &PayPeriod) -> Vec<PayrollRecord> {
        let mut records: Vec<PayrollRecord> = self
            .state
            .read()
            .records
            .values()
            .filter(|r| r.draft.period_month == period.month() && r.draft.period_year == period.year())
            .cloned()
            .collect();
        records.sort_by(|a, b| a.draft.employee_id.cmp(&b.draft.employee_id));
        records
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.state.read().records.len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
