//! Progressive personal income tax.
//!
//! ## Bracket walk
//!
//! The bracket table is one ordered list of cumulative upper bounds with
//! marginal rates. Tax is a single fold over it: each bracket taxes the
//! slice of income between the previous bound and its own, until the
//! income is used up.
//!
//! | Taxable income (VND) | Rate |
//! |---|---|
//! | up to 5,000,000 | 5% |
//! | 5,000,000 - 10,000,000 | 10% |
//! | 10,000,000 - 18,000,000 | 15% |
//! | 18,000,000 - 32,000,000 | 20% |
//! | 32,000,000 - 52,000,000 | 25% |
//! | 52,000,000 - 80,000,000 | 30% |
//! | above 80,000,000 | 35% |

use rust_decimal::Decimal;

use crate::config::TaxBracket;
use crate::models::AuditStep;

use super::round_vnd;

/// Calculates PIT on a monthly taxable income.
///
/// Returns whole VND; zero for any income at or below zero.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::calculate_pit;
/// use payroll_engine::config::PayrollConfig;
/// use rust_decimal::Decimal;
///
/// let brackets = PayrollConfig::default().tax.brackets;
///
/// assert_eq!(calculate_pit(Decimal::ZERO, &brackets), Decimal::ZERO);
/// assert_eq!(calculate_pit(Decimal::from(5_000_000), &brackets), Decimal::from(250_000));
/// // 5M @ 5% + 5M @ 10% + 5M @ 15%
/// assert_eq!(calculate_pit(Decimal::from(15_000_000), &brackets), Decimal::from(1_500_000));
/// ```
pub fn calculate_pit(taxable_income: Decimal, brackets: &[TaxBracket]) -> Decimal {
    if taxable_income <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    let (tax, _, _) = brackets.iter().fold(
        (Decimal::ZERO, taxable_income, Decimal::ZERO),
        |(tax, remaining, previous_bound), bracket| {
            if remaining <= Decimal::ZERO {
                return (tax, remaining, previous_bound);
            }
            let taxed_here = match bracket.upper_bound {
                Some(bound) => remaining.min(bound - previous_bound),
                None => remaining,
            };
            (
                tax + taxed_here * bracket.rate,
                remaining - taxed_here,
                bracket.upper_bound.unwrap_or(previous_bound),
            )
        },
    );

    round_vnd(tax)
}

/// Builds the audit step describing a PIT calculation.
pub fn pit_audit_step(taxable_income: Decimal, pit: Decimal, step_number: u32) -> AuditStep {
    AuditStep {
        step_number,
        rule_id: "pit".to_string(),
        rule_name: "Progressive Personal Income Tax".to_string(),
        input: serde_json::json!({
            "taxable_income": taxable_income.to_string()
        }),
        output: serde_json::json!({
            "pit": pit.to_string()
        }),
        reasoning: if pit.is_zero() {
            format!("Taxable income {} attracts no PIT", taxable_income)
        } else {
            format!(
                "Progressive brackets applied to taxable income {}: PIT {}",
                taxable_income, pit
            )
        },
    }
}
