//! Monthly pay period model.
//!
//! This module contains the [`PayPeriod`] type: a validated calendar month
//! that payroll is calculated for.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

const MIN_YEAR: i32 = 1900;
const MAX_YEAR: i32 = 9999;

/// Serialized form of a pay period.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct PeriodParts {
    month: u32,
    year: i32,
}

/// A calendar month for which payroll is calculated.
///
/// A `PayPeriod` can only be built through [`PayPeriod::new`], so every
/// instance refers to a real month.
///
/// # Example
///
/// ```
/// use payroll_engine::models::PayPeriod;
/// use chrono::NaiveDate;
///
/// let period = PayPeriod::new(2, 2024).unwrap();
///
/// assert_eq!(period.start_date(), NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
/// assert_eq!(period.end_date(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
/// assert!(period.contains_date(NaiveDate::from_ymd_opt(2024, 2, 15).unwrap()));
/// assert!(PayPeriod::new(13, 2024).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "PeriodParts", into = "PeriodParts")]
pub struct PayPeriod {
    month: u32,
    year: i32,
    start: NaiveDate,
    end: NaiveDate,
}

impl PayPeriod {
    /// Builds a period for the given month (1-12) and year.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidPeriod`] if the month is outside 1-12 or
    /// the year is outside the supported range.
    pub fn new(month: u32, year: i32) -> EngineResult<Self> {
        let invalid = |message: &str| EngineError::InvalidPeriod {
            month,
            year,
            message: message.to_string(),
        };

        if !(1..=12).contains(&month) {
            return Err(invalid("month must be between 1 and 12"));
        }
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(invalid("year is outside the supported range"));
        }

        let start =
            NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| invalid("no such month"))?;
        let next_month_start = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        };
        let end = next_month_start
            .and_then(|d| d.pred_opt())
            .ok_or_else(|| invalid("no such month"))?;

        Ok(Self {
            month,
            year,
            start,
            end,
        })
    }

    /// The month number (1-12).
    pub fn month(&self) -> u32 {
        self.month
    }

    /// The calendar year.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// The first day of the month.
    pub fn start_date(&self) -> NaiveDate {
        self.start
    }

    /// The last day of the month.
    pub fn end_date(&self) -> NaiveDate {
        self.end
    }

    /// Checks if a given date falls within this period (inclusive).
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl fmt::Display for PayPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{}", self.month, self.year)
    }
}

impl TryFrom<PeriodParts> for PayPeriod {
    type Error = EngineError;

    fn try_from(parts: PeriodParts) -> Result<Self, Self::Error> {
        PayPeriod::new(parts.month, parts.year)
    }
}

impl From<PayPeriod> for PeriodParts {
    fn from(period: PayPeriod) -> Self {
        PeriodParts {
            month: period.month,
            year: period.year,
        }
    }
}
