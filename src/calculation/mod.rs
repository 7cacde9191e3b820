//! Calculation logic for the payroll engine.
//!
//! This module contains the pure functions that turn attendance and an
//! employee snapshot into a payroll draft: working-day aggregation,
//! attendance pro-rating, statutory insurance, progressive PIT, and the
//! salary calculation that chains them together.
//!
//! All amounts are VND. Every intermediate figure is rounded to a whole
//! dong with [`round_vnd`] before it feeds the next step.

mod insurance;
mod pit;
mod salary;
mod working_days;

use rust_decimal::{Decimal, RoundingStrategy};

pub use insurance::{InsuranceContributions, InsuranceResult, calculate_insurance, insurance_base};
pub use pit::{calculate_pit, pit_audit_step};
pub use salary::{SalaryCalculation, calculate_salary};
pub use working_days::{WorkingDaysSummary, aggregate_working_days};

/// Rounds an amount to whole VND, halves away from zero.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::round_vnd;
/// use rust_decimal::Decimal;
///
/// assert_eq!(round_vnd(Decimal::new(8_846_153_846, 3)), Decimal::from(8_846_154));
/// assert_eq!(round_vnd(Decimal::new(615, 1)), Decimal::from(62));
/// assert_eq!(round_vnd(Decimal::new(-615, 1)), Decimal::from(-62));
/// ```
pub fn round_vnd(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}
