//! Employee model.
//!
//! Employees are owned by the HR directory; the payroll engine only reads a
//! snapshot of the fields that drive pay.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Largest monthly salary or allowance accepted, 10^15 VND.
pub const MAX_VND_AMOUNT: Decimal = Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0);

/// Represents an employee as seen by payroll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier for the employee.
    pub id: String,
    /// Display name used on the salary book.
    pub name: String,
    /// Job position used on the salary book.
    #[serde(default)]
    pub position: String,
    /// Monthly base salary in VND for a full standard month.
    pub base_salary: Decimal,
    /// Fixed monthly allowances in VND, paid regardless of attendance.
    #[serde(default)]
    pub allowances: Decimal,
    /// Number of registered dependents for PIT family deduction.
    #[serde(default)]
    pub dependents: u32,
    /// Whether the employee is currently employed.
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl Employee {
    /// Checks that the pay-driving fields hold whole, non-negative VND amounts
    /// no larger than [`MAX_VND_AMOUNT`].
    ///
    /// # Examples
    ///
    /// ```
    /// use payroll_engine::models::Employee;
    /// use rust_decimal::Decimal;
    ///
    /// let employee = Employee {
    ///     id: "emp_001".to_string(),
    ///     name: "Nguyen Van A".to_string(),
    ///     position: "Cashier".to_string(),
    ///     base_salary: Decimal::from(10_000_000),
    ///     allowances: Decimal::from(500_000),
    ///     dependents: 1,
    ///     active: true,
    /// };
    /// assert!(employee.validate().is_ok());
    /// ```
    pub fn validate(&self) -> EngineResult<()> {
        if self.id.trim().is_empty() {
            return Err(EngineError::InvalidEmployee {
                field: "id".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        check_vnd_amount("base_salary", self.base_salary)?;
        check_vnd_amount("allowances", self.allowances)?;
        Ok(())
    }
}

fn check_vnd_amount(field: &str, amount: Decimal) -> EngineResult<()> {
    if amount < Decimal::ZERO {
        return Err(EngineError::InvalidEmployee {
            field: field.to_string(),
            message: format!("must not be negative, got {}", amount),
        });
    }
    if amount > MAX_VND_AMOUNT {
        return Err(EngineError::InvalidEmployee {
            field: field.to_string(),
            message: format!("must not exceed {}, got {}", MAX_VND_AMOUNT, amount),
        });
    }
    if !amount.fract().is_zero() {
        return Err(EngineError::InvalidEmployee {
            field: field.to_string(),
            message: format!("must be a whole VND amount, got {}", amount),
        });
    }
    Ok(())
}
