//! Payroll record models and the payroll lifecycle.
//!
//! A [`PayrollRecord`] is the calculated figures of a [`PayrollDraft`] plus a
//! lifecycle [`PayrollState`]. The state is a tagged variant: approval data
//! only exists once a record is approved, payment data only once it is paid.
//! Transitions are methods that succeed only along the legal edges
//! `calculated -> approved -> paid`.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};

/// Lifecycle status of a payroll record, without the per-state data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayrollStatus {
    /// Figures calculated; may still be recalculated.
    Calculated,
    /// Approved for payment; figures are frozen.
    Approved,
    /// Paid out. Terminal.
    Paid,
}

impl PayrollStatus {
    /// Returns the wire name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            PayrollStatus::Calculated => "calculated",
            PayrollStatus::Approved => "approved",
            PayrollStatus::Paid => "paid",
        }
    }
}

impl fmt::Display for PayrollStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a salary was paid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Paid from the store's cash drawer; posted to the cash ledger.
    Cash,
    /// Paid by bank transfer; no cash-ledger posting.
    BankTransfer,
}

/// The lifecycle state of a payroll record, carrying the data each state owns.
///
/// # Example
///
/// ```
/// use payroll_engine::models::{PaymentMethod, PayrollState, PayrollStatus};
/// use chrono::{NaiveDate, Utc};
/// use uuid::Uuid;
///
/// let id = Uuid::new_v4();
/// let approved = PayrollState::Calculated
///     .approve(id, "manager_01", Utc::now())
///     .unwrap();
/// assert_eq!(approved.status(), PayrollStatus::Approved);
///
/// let paid = approved
///     .pay(id, PaymentMethod::Cash, NaiveDate::from_ymd_opt(2024, 4, 5).unwrap())
///     .unwrap();
/// assert_eq!(paid.status(), PayrollStatus::Paid);
///
/// // No edge leaves the terminal state.
/// assert!(paid.approve(id, "manager_01", Utc::now()).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PayrollState {
    /// Freshly calculated.
    Calculated,
    /// Approved for payment.
    Approved {
        /// Who approved the record.
        approved_by: String,
        /// When the record was approved.
        approved_at: DateTime<Utc>,
    },
    /// Paid out.
    Paid {
        /// Who approved the record.
        approved_by: String,
        /// When the record was approved.
        approved_at: DateTime<Utc>,
        /// How the salary was paid.
        payment_method: PaymentMethod,
        /// The date the salary was paid.
        paid_date: NaiveDate,
    },
}

impl PayrollState {
    /// Returns the plain status of this state.
    pub fn status(&self) -> PayrollStatus {
        match self {
            PayrollState::Calculated => PayrollStatus::Calculated,
            PayrollState::Approved { .. } => PayrollStatus::Approved,
            PayrollState::Paid { .. } => PayrollStatus::Paid,
        }
    }

    /// Returns true while the figures may still be overwritten by a recalculation.
    pub fn is_recalculable(&self) -> bool {
        matches!(self, PayrollState::Calculated)
    }

    /// The `calculated -> approved` edge.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidTransition`] from any state other than
    /// `calculated`.
    pub fn approve(
        &self,
        payroll_id: Uuid,
        approved_by: &str,
        approved_at: DateTime<Utc>,
    ) -> EngineResult<PayrollState> {
        match self {
            PayrollState::Calculated => Ok(PayrollState::Approved {
                approved_by: approved_by.to_string(),
                approved_at,
            }),
            other => Err(EngineError::InvalidTransition {
                payroll_id,
                from: other.status(),
                action: "approve".to_string(),
            }),
        }
    }

    /// The `approved -> paid` edge.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidTransition`] from any state other than
    /// `approved`.
    pub fn pay(
        &self,
        payroll_id: Uuid,
        payment_method: PaymentMethod,
        paid_date: NaiveDate,
    ) -> EngineResult<PayrollState> {
        match self {
            PayrollState::Approved {
                approved_by,
                approved_at,
            } => Ok(PayrollState::Paid {
                approved_by: approved_by.clone(),
                approved_at: *approved_at,
                payment_method,
                paid_date,
            }),
            other => Err(EngineError::InvalidTransition {
                payroll_id,
                from: other.status(),
                action: "pay".to_string(),
            }),
        }
    }
}

/// The calculated figures for one employee and one month.
///
/// All amounts are whole VND. `working_days` is a multiple of 0.5.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollDraft {
    /// The employee the figures belong to.
    pub employee_id: String,
    /// Month of the pay period (1-12).
    pub period_month: u32,
    /// Year of the pay period.
    pub period_year: i32,
    /// Days worked in the period.
    pub working_days: Decimal,
    /// The divisor used to pro-rate the base salary.
    pub standard_days: Decimal,
    /// Snapshot of the employee's base salary.
    pub base_salary: Decimal,
    /// Base salary scaled by attendance.
    pub pro_rated_salary: Decimal,
    /// Snapshot of the employee's allowances.
    pub allowances: Decimal,
    /// Pro-rated salary plus allowances.
    pub gross_salary: Decimal,
    /// Gross salary capped at the statutory insurance ceiling.
    pub insurance_base: Decimal,
    /// Employee share of social insurance.
    pub social_insurance: Decimal,
    /// Employee share of health insurance.
    pub health_insurance: Decimal,
    /// Employee share of unemployment insurance.
    pub unemployment_insurance: Decimal,
    /// Employer share of social insurance (informational).
    pub employer_social_insurance: Decimal,
    /// Employer share of health insurance (informational).
    pub employer_health_insurance: Decimal,
    /// Employer share of unemployment insurance (informational).
    pub employer_unemployment_insurance: Decimal,
    /// Snapshot of the employee's dependents.
    pub dependents: u32,
    /// Fixed personal family deduction.
    pub personal_deduction: Decimal,
    /// Deduction for registered dependents.
    pub dependent_deduction: Decimal,
    /// Income subject to PIT.
    pub taxable_income: Decimal,
    /// Personal income tax withheld.
    pub pit: Decimal,
    /// Employee insurance plus PIT.
    pub total_deductions: Decimal,
    /// Take-home pay.
    pub net_salary: Decimal,
}

impl PayrollDraft {
    /// Sum of the employee-side insurance contributions.
    pub fn employee_insurance_total(&self) -> Decimal {
        self.social_insurance + self.health_insurance + self.unemployment_insurance
    }

    /// Sum of the employer-side insurance contributions.
    pub fn employer_insurance_total(&self) -> Decimal {
        self.employer_social_insurance
            + self.employer_health_insurance
            + self.employer_unemployment_insurance
    }
}

/// A persisted payroll record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollRecord {
    /// Unique identifier for the record.
    pub id: Uuid,
    /// The calculated figures.
    #[serde(flatten)]
    pub draft: PayrollDraft,
    /// The lifecycle state.
    #[serde(flatten)]
    pub state: PayrollState,
    /// When the record was first calculated.
    pub created_at: DateTime<Utc>,
    /// When the figures or state last changed.
    pub updated_at: DateTime<Utc>,
}

impl PayrollRecord {
    /// Returns the record's lifecycle status.
    pub fn status(&self) -> PayrollStatus {
        self.state.status()
    }
}
