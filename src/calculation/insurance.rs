//! Statutory insurance contributions.
//!
//! Social, health and unemployment insurance are levied on the gross salary
//! capped at the insurance ceiling. Each contribution is rounded to whole VND
//! on its own before any summing.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::{InsuranceConfig, InsuranceRates};
use crate::models::AuditStep;

use super::round_vnd;

/// One side's (employee or employer) three insurance contributions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsuranceContributions {
    /// Social insurance.
    pub social: Decimal,
    /// Health insurance.
    pub health: Decimal,
    /// Unemployment insurance.
    pub unemployment: Decimal,
}

impl InsuranceContributions {
    /// Applies `rates` to `base`, rounding each contribution separately.
    pub fn from_rates(base: Decimal, rates: &InsuranceRates) -> Self {
        Self {
            social: round_vnd(base * rates.social),
            health: round_vnd(base * rates.health),
            unemployment: round_vnd(base * rates.unemployment),
        }
    }

    /// Sum of the three contributions.
    pub fn total(&self) -> Decimal {
        self.social + self.health + self.unemployment
    }
}

/// Employee and employer contributions on one insurance base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsuranceResult {
    /// `min(gross_salary, insurance_cap)`.
    pub insurance_base: Decimal,
    /// Deducted from the employee's pay.
    pub employee: InsuranceContributions,
    /// Borne by the employer; recorded only.
    pub employer: InsuranceContributions,
}

/// Returns the income subject to insurance: gross salary capped at `cap`.
pub fn insurance_base(gross_salary: Decimal, cap: Decimal) -> Decimal {
    gross_salary.min(cap).max(Decimal::ZERO)
}

/// Calculates both sides' insurance contributions for a gross salary.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::calculate_insurance;
/// use payroll_engine::config::PayrollConfig;
/// use rust_decimal::Decimal;
///
/// let config = PayrollConfig::default();
/// let result = calculate_insurance(Decimal::from(9_346_154), &config.insurance);
///
/// assert_eq!(result.employee.social, Decimal::from(747_692));
/// assert_eq!(result.employee.health, Decimal::from(140_192));
/// assert_eq!(result.employee.unemployment, Decimal::from(93_462));
/// assert_eq!(result.employee.total(), Decimal::from(981_346));
/// ```
pub fn calculate_insurance(gross_salary: Decimal, config: &InsuranceConfig) -> InsuranceResult {
    let base = insurance_base(gross_salary, config.insurance_cap);
    InsuranceResult {
        insurance_base: base,
        employee: InsuranceContributions::from_rates(base, &config.employee),
        employer: InsuranceContributions::from_rates(base, &config.employer),
    }
}

impl InsuranceResult {
    /// Builds the audit step describing this calculation.
    pub fn audit_step(&self, gross_salary: Decimal, cap: Decimal, step_number: u32) -> AuditStep {
        let capped = gross_salary > cap;
        AuditStep {
            step_number,
            rule_id: "statutory_insurance".to_string(),
            rule_name: "Statutory Insurance Contributions".to_string(),
            input: serde_json::json!({
                "gross_salary": gross_salary.to_string(),
                "insurance_cap": cap.to_string()
            }),
            output: serde_json::json!({
                "insurance_base": self.insurance_base.to_string(),
                "employee": {
                    "social": self.employee.social.to_string(),
                    "health": self.employee.health.to_string(),
                    "unemployment": self.employee.unemployment.to_string(),
                    "total": self.employee.total().to_string()
                },
                "employer": {
                    "social": self.employer.social.to_string(),
                    "health": self.employer.health.to_string(),
                    "unemployment": self.employer.unemployment.to_string(),
                    "total": self.employer.total().to_string()
                }
            }),
            reasoning: if capped {
                format!(
                    "Gross {} exceeds cap {}; contributions levied on {}",
                    gross_salary, cap, self.insurance_base
                )
            } else {
                format!(
                    "Contributions levied on gross {}; employee share {}",
                    self.insurance_base,
                    self.employee.total()
                )
            },
        }
    }
}
