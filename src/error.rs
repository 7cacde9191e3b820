//! Error types for the payroll engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every failure the engine can report: configuration problems, bad
//! collaborator data, illegal lifecycle transitions, and ledger rejections.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::models::PayrollStatus;

/// The main error type for the payroll engine.
///
/// All operations in the engine return this error type, making it easy
/// to handle errors consistently throughout the application.
///
/// # Example
///
/// ```
/// use payroll_engine::error::EngineError;
///
/// let error = EngineError::EmployeeNotFound {
///     employee_id: "emp_404".to_string(),
/// };
/// assert_eq!(error.to_string(), "Employee not found: emp_404");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// Configuration parsed but holds values the engine cannot use.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// What is wrong with the configuration.
        message: String,
    },

    /// The employee is not known to the directory.
    #[error("Employee not found: {employee_id}")]
    EmployeeNotFound {
        /// The requested employee id.
        employee_id: String,
    },

    /// The employee exists but is no longer active.
    #[error("Employee '{employee_id}' is not active")]
    EmployeeInactive {
        /// The inactive employee id.
        employee_id: String,
    },

    /// An employee record was invalid or contained inconsistent data.
    #[error("Invalid employee field '{field}': {message}")]
    InvalidEmployee {
        /// The field that was invalid.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// The requested payroll period is malformed.
    #[error("Invalid pay period {month}/{year}: {message}")]
    InvalidPeriod {
        /// The requested month.
        month: u32,
        /// The requested year.
        year: i32,
        /// Why the period was rejected.
        message: String,
    },

    /// Attendance data could not be reduced to a working-day figure.
    #[error("Invalid attendance for employee '{employee_id}': {message}")]
    InvalidAttendance {
        /// The employee whose attendance was rejected.
        employee_id: String,
        /// What made the attendance invalid.
        message: String,
    },

    /// No payroll record exists with the given id.
    #[error("Payroll record not found: {payroll_id}")]
    PayrollNotFound {
        /// The requested payroll id.
        payroll_id: Uuid,
    },

    /// A recalculation targeted a period that has already been approved or paid.
    #[error("Payroll {payroll_id} for employee '{employee_id}' is {status} and can no longer be recalculated")]
    PayrollLocked {
        /// The locked payroll record.
        payroll_id: Uuid,
        /// The employee the record belongs to.
        employee_id: String,
        /// The status that locks the record.
        status: PayrollStatus,
    },

    /// A lifecycle transition was requested from a state that does not allow it.
    #[error("Cannot {action} payroll {payroll_id}: record is {from}")]
    InvalidTransition {
        /// The payroll record.
        payroll_id: Uuid,
        /// The record's current status.
        from: PayrollStatus,
        /// The attempted action (e.g. "approve", "pay").
        action: String,
    },

    /// The cash ledger refused a posting.
    #[error("Ledger rejected posting of {amount}: {message}")]
    LedgerRejected {
        /// The amount that was being posted.
        amount: Decimal,
        /// Why the ledger refused it.
        message: String,
    },

    /// An external collaborator (directory, attendance) failed.
    #[error("{source_name} unavailable: {message}")]
    CollaboratorUnavailable {
        /// The collaborator that failed.
        source_name: String,
        /// A description of the failure.
        message: String,
    },

    /// A general calculation error occurred.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },
}

impl EngineError {
    /// Returns a stable, machine-readable code for the error.
    ///
    /// The codes are shared by the HTTP layer and by batch failure reports.
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::ConfigNotFound { .. }
            | EngineError::ConfigParseError { .. }
            | EngineError::InvalidConfig { .. } => "CONFIG_ERROR",
            EngineError::EmployeeNotFound { .. } => "EMPLOYEE_NOT_FOUND",
            EngineError::EmployeeInactive { .. } => "EMPLOYEE_INACTIVE",
            EngineError::InvalidEmployee { .. } => "INVALID_EMPLOYEE",
            EngineError::InvalidPeriod { .. } => "INVALID_PERIOD",
            EngineError::InvalidAttendance { .. } => "INVALID_ATTENDANCE",
            EngineError::PayrollNotFound { .. } => "PAYROLL_NOT_FOUND",
            EngineError::PayrollLocked { .. } => "PAYROLL_LOCKED",
            EngineError::InvalidTransition { .. } => "INVALID_TRANSITION",
            EngineError::LedgerRejected { .. } => "LEDGER_REJECTED",
            EngineError::CollaboratorUnavailable { .. } => "COLLABORATOR_UNAVAILABLE",
            EngineError::CalculationError { .. } => "CALCULATION_ERROR",
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
