//! Monthly salary calculation.
//!
//! Combines an employee snapshot, the month's working days and the statutory
//! parameters into a full [`PayrollDraft`]:
//!
//! 1. pro-rated salary = base salary / standard days x working days
//! 2. gross salary = pro-rated salary + allowances
//! 3. insurance on min(gross, cap), employee and employer sides
//! 4. taxable income = gross - employee insurance - family deductions (floor 0)
//! 5. PIT from the progressive bracket table
//! 6. net salary = gross - employee insurance - PIT
//!
//! Every intermediate amount is rounded to whole VND.

use std::time::Instant;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::PayrollConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, AuditTrace, Employee, PayPeriod, PayrollDraft};

use super::insurance::calculate_insurance;
use super::pit::{calculate_pit, pit_audit_step};
use super::round_vnd;

/// The result of a salary calculation: the draft and how it was reached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryCalculation {
    /// The calculated figures, ready to be persisted.
    pub draft: PayrollDraft,
    /// The rules applied, in order.
    pub audit_trace: AuditTrace,
}

/// Calculates one employee's payroll draft for a period.
///
/// `first_step` numbers the first audit step, so callers can prepend their
/// own steps (e.g. attendance aggregation) to the trace.
///
/// # Errors
///
/// - [`EngineError::InvalidEmployee`] if the salary or allowances are negative
///   or not whole VND
/// - [`EngineError::InvalidAttendance`] if `working_days` is negative or not a
///   multiple of 0.5
/// - [`EngineError::CalculationError`] if an amount overflows
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::calculate_salary;
/// use payroll_engine::config::PayrollConfig;
/// use payroll_engine::models::{Employee, PayPeriod};
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
/// let period = PayPeriod::new(3, 2024).unwrap();
///
/// let result = calculate_salary(
///     &employee,
///     &period,
///     Decimal::from(23),
///     &PayrollConfig::default(),
///     1,
/// )
/// .unwrap();
///
/// assert_eq!(result.draft.gross_salary, Decimal::from(9_346_154));
/// assert_eq!(result.draft.pit, Decimal::ZERO);
/// assert_eq!(result.draft.net_salary, Decimal::from(8_364_808));
/// ```
pub fn calculate_salary(
    employee: &Employee,
    period: &PayPeriod,
    working_days: Decimal,
    config: &PayrollConfig,
    first_step: u32,
) -> EngineResult<SalaryCalculation> {
    let start_time = Instant::now();
    employee.validate()?;
    validate_working_days(&employee.id, working_days)?;

    let mut steps: Vec<AuditStep> = Vec::new();
    let mut step_number = first_step;

    let standard_days = config.insurance.standard_working_days;
    let working_days = working_days.normalize();

    let pro_rated_salary = employee
        .base_salary
        .checked_mul(working_days)
        .and_then(|amount| amount.checked_div(standard_days))
        .map(round_vnd)
        .ok_or_else(|| overflow(&employee.id, "pro-rated salary"))?;
    steps.push(AuditStep {
        step_number,
        rule_id: "pro_rated_salary".to_string(),
        rule_name: "Attendance Pro-rating".to_string(),
        input: serde_json::json!({
            "base_salary": employee.base_salary.to_string(),
            "working_days": working_days.to_string(),
            "standard_days": standard_days.to_string()
        }),
        output: serde_json::json!({
            "pro_rated_salary": pro_rated_salary.to_string()
        }),
        reasoning: format!(
            "{} / {} x {} = {}",
            employee.base_salary, standard_days, working_days, pro_rated_salary
        ),
    });
    step_number += 1;

    let gross_salary = pro_rated_salary
        .checked_add(employee.allowances)
        .ok_or_else(|| overflow(&employee.id, "gross salary"))?;
    steps.push(AuditStep {
        step_number,
        rule_id: "gross_salary".to_string(),
        rule_name: "Gross Salary".to_string(),
        input: serde_json::json!({
            "pro_rated_salary": pro_rated_salary.to_string(),
            "allowances": employee.allowances.to_string()
        }),
        output: serde_json::json!({
            "gross_salary": gross_salary.to_string()
        }),
        reasoning: format!(
            "{} + {} allowances = {}",
            pro_rated_salary, employee.allowances, gross_salary
        ),
    });
    step_number += 1;

    let insurance = calculate_insurance(gross_salary, &config.insurance);
    steps.push(insurance.audit_step(gross_salary, config.insurance.insurance_cap, step_number));
    step_number += 1;
    let employee_insurance = insurance.employee.total();

    let personal_deduction = config.tax.personal_deduction;
    let dependent_deduction = config.tax.dependent_deduction * Decimal::from(employee.dependents);
    let taxable_income = round_vnd(
        gross_salary - employee_insurance - personal_deduction - dependent_deduction,
    )
    .max(Decimal::ZERO);
    steps.push(AuditStep {
        step_number,
        rule_id: "taxable_income".to_string(),
        rule_name: "Taxable Income".to_string(),
        input: serde_json::json!({
            "gross_salary": gross_salary.to_string(),
            "employee_insurance": employee_insurance.to_string(),
            "personal_deduction": personal_deduction.to_string(),
            "dependents": employee.dependents,
            "dependent_deduction": dependent_deduction.to_string()
        }),
        output: serde_json::json!({
            "taxable_income": taxable_income.to_string()
        }),
        reasoning: format!(
            "max(0, {} - {} - {} - {}) = {}",
            gross_salary, employee_insurance, personal_deduction, dependent_deduction, taxable_income
        ),
    });
    step_number += 1;

    let pit = calculate_pit(taxable_income, &config.tax.brackets);
    steps.push(pit_audit_step(taxable_income, pit, step_number));
    step_number += 1;

    let net_salary = round_vnd(gross_salary - employee_insurance - pit);
    let total_deductions = employee_insurance + pit;
    steps.push(AuditStep {
        step_number,
        rule_id: "net_salary".to_string(),
        rule_name: "Net Salary".to_string(),
        input: serde_json::json!({
            "gross_salary": gross_salary.to_string(),
            "employee_insurance": employee_insurance.to_string(),
            "pit": pit.to_string()
        }),
        output: serde_json::json!({
            "total_deductions": total_deductions.to_string(),
            "net_salary": net_salary.to_string()
        }),
        reasoning: format!(
            "{} - {} - {} = {}",
            gross_salary, employee_insurance, pit, net_salary
        ),
    });

    if net_salary != gross_salary - total_deductions {
        return Err(EngineError::CalculationError {
            message: format!(
                "net salary {} does not reconcile with gross {} less deductions {}",
                net_salary, gross_salary, total_deductions
            ),
        });
    }

    let draft = PayrollDraft {
        employee_id: employee.id.clone(),
        period_month: period.month(),
        period_year: period.year(),
        working_days,
        standard_days,
        base_salary: employee.base_salary,
        pro_rated_salary,
        allowances: employee.allowances,
        gross_salary,
        insurance_base: insurance.insurance_base,
        social_insurance: insurance.employee.social,
        health_insurance: insurance.employee.health,
        unemployment_insurance: insurance.employee.unemployment,
        employer_social_insurance: insurance.employer.social,
        employer_health_insurance: insurance.employer.health,
        employer_unemployment_insurance: insurance.employer.unemployment,
        dependents: employee.dependents,
        personal_deduction,
        dependent_deduction,
        taxable_income,
        pit,
        total_deductions,
        net_salary,
    };

    Ok(SalaryCalculation {
        draft,
        audit_trace: AuditTrace {
            steps,
            duration_us: start_time.elapsed().as_micros() as u64,
        },
    })
}

fn overflow(employee_id: &str, amount: &str) -> EngineError {
    EngineError::CalculationError {
        message: format!("{} overflowed for employee {}", amount, employee_id),
    }
}

fn validate_working_days(employee_id: &str, working_days: Decimal) -> EngineResult<()> {
    if working_days < Decimal::ZERO {
        return Err(EngineError::InvalidAttendance {
            employee_id: employee_id.to_string(),
            message: format!("working days must not be negative, got {}", working_days),
        });
    }
    let doubled = working_days.checked_mul(Decimal::TWO);
    if !doubled.is_some_and(|days| days.fract().is_zero()) {
        return Err(EngineError::InvalidAttendance {
            employee_id: employee_id.to_string(),
            message: format!("working days must be a multiple of 0.5, got {}", working_days),
        });
    }
    Ok(())
}
