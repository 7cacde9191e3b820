//! Configuration types for payroll calculation.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::{EngineError, EngineResult};

/// Metadata about the statutory regime the configuration encodes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegimeMetadata {
    /// Short code for the regime (e.g., "VN-2024").
    pub code: String,
    /// The human-readable name of the regime.
    pub name: String,
    /// The version or effective date of the parameters.
    pub version: String,
    /// The currency all amounts are expressed in.
    pub currency: String,
}

/// Contribution rates for the three statutory insurances.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InsuranceRates {
    /// Social insurance rate (e.g., 0.08).
    pub social: Decimal,
    /// Health insurance rate.
    pub health: Decimal,
    /// Unemployment insurance rate.
    pub unemployment: Decimal,
}

/// Pro-rating and insurance parameters from insurance.yaml.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InsuranceConfig {
    /// Divisor for pro-rating the monthly base salary.
    pub standard_working_days: Decimal,
    /// Maximum monthly income subject to insurance.
    pub insurance_cap: Decimal,
    /// Employee-side contribution rates (deducted from pay).
    pub employee: InsuranceRates,
    /// Employer-side contribution rates (informational).
    pub employer: InsuranceRates,
}

/// One progressive PIT bracket.
///
/// `upper_bound` is cumulative; `None` marks the open-ended top bracket.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TaxBracket {
    /// Cumulative upper bound of the bracket, or `None` for the last one.
    #[serde(default)]
    pub upper_bound: Option<Decimal>,
    /// Marginal rate applied inside the bracket.
    pub rate: Decimal,
}

/// PIT parameters from tax.yaml.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TaxConfig {
    /// Fixed monthly deduction for the taxpayer.
    pub personal_deduction: Decimal,
    /// Monthly deduction per registered dependent.
    pub dependent_deduction: Decimal,
    /// Ordered bracket table.
    pub brackets: Vec<TaxBracket>,
}

/// Cash-ledger policy from ledger.yaml.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LedgerConfig {
    /// Cash balance before the first entry.
    pub opening_balance: Decimal,
    /// Whether payments may take the balance below zero.
    pub allow_overdraft: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            opening_balance: Decimal::ZERO,
            allow_overdraft: true,
        }
    }
}

/// The complete payroll configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayrollConfig {
    /// Regime metadata.
    pub metadata: RegimeMetadata,
    /// Pro-rating and insurance parameters.
    pub insurance: InsuranceConfig,
    /// PIT parameters.
    pub tax: TaxConfig,
    /// Cash-ledger policy.
    pub ledger: LedgerConfig,
}

fn vnd(amount: i64) -> Decimal {
    Decimal::from(amount)
}

fn rate(permille: i64) -> Decimal {
    Decimal::new(permille, 3)
}

impl Default for PayrollConfig {
    /// Vietnamese parameters in force for 2024 payrolls.
    fn default() -> Self {
        Self {
            metadata: RegimeMetadata {
                code: "VN-2024".to_string(),
                name: "Vietnam statutory payroll".to_string(),
                version: "2024-07-01".to_string(),
                currency: "VND".to_string(),
            },
            insurance: InsuranceConfig {
                standard_working_days: vnd(26),
                insurance_cap: vnd(46_800_000),
                employee: InsuranceRates {
                    social: rate(80),
                    health: rate(15),
                    unemployment: rate(10),
                },
                employer: InsuranceRates {
                    social: rate(175),
                    health: rate(30),
                    unemployment: rate(10),
                },
            },
            tax: TaxConfig {
                personal_deduction: vnd(11_000_000),
                dependent_deduction: vnd(4_400_000),
                brackets: vec![
                    TaxBracket {
                        upper_bound: Some(vnd(5_000_000)),
                        rate: rate(50),
                    },
                    TaxBracket {
                        upper_bound: Some(vnd(10_000_000)),
                        rate: rate(100),
                    },
                    TaxBracket {
                        upper_bound: Some(vnd(18_000_000)),
                        rate: rate(150),
                    },
                    TaxBracket {
                        upper_bound: Some(vnd(32_000_000)),
                        rate: rate(200),
                    },
                    TaxBracket {
                        upper_bound: Some(vnd(52_000_000)),
                        rate: rate(250),
                    },
                    TaxBracket {
                        upper_bound: Some(vnd(80_000_000)),
                        rate: rate(300),
                    },
                    TaxBracket {
                        upper_bound: None,
                        rate: rate(350),
                    },
                ],
            },
            ledger: LedgerConfig {
                opening_balance: Decimal::ZERO,
                allow_overdraft: true,
            },
        }
    }
}

impl PayrollConfig {
    /// Checks that the parameters are usable by the calculators.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConfig`] if the standard days are not
    /// positive, any rate lies outside `[0, 1]`, or the bracket table is
    /// empty, not strictly ascending, or not closed by one open-ended bracket.
    pub fn validate(&self) -> EngineResult<()> {
        let invalid = |message: String| Err(EngineError::InvalidConfig { message });

        if self.insurance.standard_working_days <= Decimal::ZERO {
            return invalid("standard_working_days must be positive".to_string());
        }
        if self.insurance.insurance_cap <= Decimal::ZERO {
            return invalid("insurance_cap must be positive".to_string());
        }
        for (side, rates) in [
            ("employee", &self.insurance.employee),
            ("employer", &self.insurance.employer),
        ] {
            for (name, value) in [
                ("social", rates.social),
                ("health", rates.health),
                ("unemployment", rates.unemployment),
            ] {
                if !is_unit_rate(value) {
                    return invalid(format!("{} {} rate {} is outside [0, 1]", side, name, value));
                }
            }
        }
        if self.tax.personal_deduction < Decimal::ZERO || self.tax.dependent_deduction < Decimal::ZERO
        {
            return invalid("deductions must not be negative".to_string());
        }

        let brackets = &self.tax.brackets;
        let Some((last, bounded)) = brackets.split_last() else {
            return invalid("tax bracket table is empty".to_string());
        };
        if last.upper_bound.is_some() {
            return invalid("the last tax bracket must have no upper bound".to_string());
        }
        let mut previous = Decimal::ZERO;
        for (index, bracket) in bounded.iter().enumerate() {
            match bracket.upper_bound {
                Some(bound) if bound > previous => previous = bound,
                Some(bound) => {
                    return invalid(format!(
                        "tax bracket {} upper bound {} is not above {}",
                        index + 1,
                        bound,
                        previous
                    ));
                }
                None => {
                    return invalid(format!(
                        "only the last tax bracket may be open-ended (bracket {})",
                        index + 1
                    ));
                }
            }
        }
        if let Some(bad) = brackets.iter().find(|b| !is_unit_rate(b.rate)) {
            return invalid(format!("tax rate {} is outside [0, 1]", bad.rate));
        }

        Ok(())
    }
}

fn is_unit_rate(value: Decimal) -> bool {
    value >= Decimal::ZERO && value <= Decimal::ONE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(PayrollConfig::default().validate().is_ok());
    }

    #[test]
    fn test_default_rates() {
        let config = PayrollConfig::default();
        assert_eq!(config.insurance.employee.social, Decimal::new(8, 2));
        assert_eq!(config.insurance.employee.health, Decimal::new(15, 3));
        assert_eq!(config.insurance.employer.social, Decimal::new(175, 3));
        assert_eq!(config.tax.brackets.len(), 7);
    }

    #[test]
    fn test_non_ascending_brackets_rejected() {
        let mut config = PayrollConfig::default();
        config.tax.brackets[2].upper_bound = Some(Decimal::from(7_000_000));
        config.tax.brackets[1].upper_bound = Some(Decimal::from(8_000_000));

        match config.validate() {
            Err(EngineError::InvalidConfig { message }) => {
                assert!(message.contains("bracket 3"), "got: {}", message)
            }
            other => panic!("Expected InvalidConfig, got {:?}", other),
        }
    }

    #[test]
    fn test_closed_top_bracket_rejected() {
        let mut config = PayrollConfig::default();
        config.tax.brackets.pop();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_open_middle_bracket_rejected() {
        let mut config = PayrollConfig::default();
        config.tax.brackets[0].upper_bound = None;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rate_above_one_rejected() {
        let mut config = PayrollConfig::default();
        config.insurance.employer.health = Decimal::new(15, 1);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_standard_days_rejected() {
        let mut config = PayrollConfig::default();
        config.insurance.standard_working_days = Decimal::ZERO;
        assert!(config.validate().is_err());
    }
}
