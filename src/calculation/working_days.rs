//! Working-day aggregation.
//!
//! Reduces a month of classified attendance rows into the `working_days`
//! figure that pro-rates the base salary: each present day counts 1, each
//! half day counts 0.5, absences and leave count nothing.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{AttendanceRecord, AttendanceStatus, AuditStep, PayPeriod};

/// The result of aggregating one employee's attendance for a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingDaysSummary {
    /// Days marked present.
    pub present_days: u32,
    /// Days marked half day.
    pub half_days: u32,
    /// Days marked absent.
    pub absent_days: u32,
    /// Days marked leave.
    pub leave_days: u32,
    /// `present_days + 0.5 * half_days`.
    pub working_days: Decimal,
}

impl WorkingDaysSummary {
    /// Builds the audit step describing this aggregation.
    pub fn audit_step(&self, employee_id: &str, period: &PayPeriod, step_number: u32) -> AuditStep {
        AuditStep {
            step_number,
            rule_id: "working_days".to_string(),
            rule_name: "Working Days Aggregation".to_string(),
            input: serde_json::json!({
                "employee_id": employee_id,
                "period": period.to_string(),
                "present": self.present_days,
                "half_day": self.half_days,
                "absent": self.absent_days,
                "leave": self.leave_days
            }),
            output: serde_json::json!({
                "working_days": self.working_days.to_string()
            }),
            reasoning: format!(
                "{} present + 0.5 x {} half days = {} working days",
                self.present_days, self.half_days, self.working_days
            ),
        }
    }
}

/// Aggregates an employee's attendance for a calendar month.
///
/// Rows belonging to other employees or dated outside `period` are ignored,
/// so callers may pass a bulk read of the whole period.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::aggregate_working_days;
/// use payroll_engine::models::{AttendanceRecord, AttendanceStatus, PayPeriod};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let period = PayPeriod::new(3, 2024).unwrap();
/// let records = vec![
///     AttendanceRecord {
///         employee_id: "emp_001".to_string(),
///         work_date: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
///         status: AttendanceStatus::Present,
///     },
///     AttendanceRecord {
///         employee_id: "emp_001".to_string(),
///         work_date: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
///         status: AttendanceStatus::HalfDay,
///     },
/// ];
///
/// let summary = aggregate_working_days("emp_001", &period, &records);
/// assert_eq!(summary.working_days, Decimal::new(15, 1));
/// ```
pub fn aggregate_working_days(
    employee_id: &str,
    period: &PayPeriod,
    records: &[AttendanceRecord],
) -> WorkingDaysSummary {
    let mut summary = WorkingDaysSummary {
        present_days: 0,
        half_days: 0,
        absent_days: 0,
        leave_days: 0,
        working_days: Decimal::ZERO,
    };

    for record in records
        .iter()
        .filter(|r| r.employee_id == employee_id && period.contains_date(r.work_date))
    {
        match record.status {
            AttendanceStatus::Present => summary.present_days += 1,
            AttendanceStatus::HalfDay => summary.half_days += 1,
            AttendanceStatus::Absent => summary.absent_days += 1,
            AttendanceStatus::Leave => summary.leave_days += 1,
        }
        summary.working_days += record.status.day_weight();
    }

    summary.working_days = summary.working_days.normalize();
    summary
}
