//! Attendance records as classified by the attendance subsystem.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Day-level attendance classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    /// Worked the full day.
    Present,
    /// Worked half of the day.
    HalfDay,
    /// Did not work and was not on approved leave.
    Absent,
    /// On leave; unpaid for pro-rating purposes.
    Leave,
}

impl AttendanceStatus {
    /// Returns how much of a working day this status counts for.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::models::AttendanceStatus;
    /// use rust_decimal::Decimal;
    ///
    /// assert_eq!(AttendanceStatus::Present.day_weight(), Decimal::ONE);
    /// assert_eq!(AttendanceStatus::HalfDay.day_weight(), Decimal::new(5, 1));
    /// assert_eq!(AttendanceStatus::Leave.day_weight(), Decimal::ZERO);
    /// ```
    pub fn day_weight(&self) -> Decimal {
        match self {
            AttendanceStatus::Present => Decimal::ONE,
            AttendanceStatus::HalfDay => Decimal::new(5, 1),
            AttendanceStatus::Absent | AttendanceStatus::Leave => Decimal::ZERO,
        }
    }
}

/// A single classified attendance day for one employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    /// The employee the record belongs to.
    pub employee_id: String,
    /// The calendar day the record covers.
    pub work_date: NaiveDate,
    /// The classified outcome for the day.
    pub status: AttendanceStatus,
}
