//! Request types for the payroll API.
//!
//! This module defines the JSON bodies and query strings accepted by the
//! payroll and ledger endpoints.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::PaymentMethod;

/// Request body for `POST /payroll/calculate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculateRequest {
    /// The employee to calculate.
    pub employee_id: String,
    /// Month of the pay period (1-12).
    pub month: u32,
    /// Year of the pay period.
    pub year: i32,
}

/// A pay period, as a `POST /payroll/calculate-all` body or a
/// `?month=&year=` query string.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PeriodRequest {
    /// Month of the pay period (1-12).
    pub month: u32,
    /// Year of the pay period.
    pub year: i32,
}

/// Request body for `POST /payroll/approve`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApproveRequest {
    /// The records to approve.
    pub payroll_ids: Vec<Uuid>,
    /// Who is approving.
    pub approved_by: String,
}

impl ApproveRequest {
    /// Returns a validation message if the request cannot be processed.
    pub fn validate(&self) -> Option<String> {
        if self.payroll_ids.is_empty() {
            return Some("payroll_ids must not be empty".to_string());
        }
        if self.approved_by.trim().is_empty() {
            return Some("approved_by must not be empty".to_string());
        }
        None
    }
}

/// Request body for `POST /payroll/:id/pay`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayRequest {
    /// How the salary is paid.
    pub payment_method: PaymentMethod,
    /// The date of payment.
    pub payment_date: NaiveDate,
}
