//! Period summaries and the salary book.
//!
//! Both views end in a [`PayrollTotals`] row whose amounts are the exact
//! sums of the listed records.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Employee, PayPeriod, PayrollRecord, PayrollStatus};

/// Column sums over a set of payroll records.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PayrollTotals {
    /// Number of records summed.
    pub employee_count: usize,
    /// Sum of base salaries.
    pub base_salary: Decimal,
    /// Sum of allowances.
    pub allowances: Decimal,
    /// Sum of gross salaries.
    pub gross_salary: Decimal,
    /// Sum of employee social insurance.
    pub social_insurance: Decimal,
    /// Sum of employee health insurance.
    pub health_insurance: Decimal,
    /// Sum of employee unemployment insurance.
    pub unemployment_insurance: Decimal,
    /// Sum of all employer contributions.
    pub employer_insurance: Decimal,
    /// Sum of PIT.
    pub pit: Decimal,
    /// Sum of total deductions.
    pub total_deductions: Decimal,
    /// Sum of net salaries.
    pub net_salary: Decimal,
}

impl PayrollTotals {
    /// Sums the given records.
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a PayrollRecord>) -> Self {
        records.into_iter().fold(Self::default(), |mut totals, record| {
            let draft = &record.draft;
            totals.employee_count += 1;
            totals.base_salary += draft.base_salary;
            totals.allowances += draft.allowances;
            totals.gross_salary += draft.gross_salary;
            totals.social_insurance += draft.social_insurance;
            totals.health_insurance += draft.health_insurance;
            totals.unemployment_insurance += draft.unemployment_insurance;
            totals.employer_insurance += draft.employer_insurance_total();
            totals.pit += draft.pit;
            totals.total_deductions += draft.total_deductions;
            totals.net_salary += draft.net_salary;
            totals
        })
    }
}

/// Every payroll record of a period with its totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollSummary {
    /// The reported period.
    pub period: PayPeriod,
    /// Records ordered by employee id.
    pub rows: Vec<PayrollRecord>,
    /// Per-status record counts.
    pub status_counts: StatusCounts,
    /// Column sums.
    pub totals: PayrollTotals,
}

/// How many records sit in each lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatusCounts {
    /// Records still `calculated`.
    pub calculated: usize,
    /// Records `approved` but unpaid.
    pub approved: usize,
    /// Records `paid`.
    pub paid: usize,
}

impl PayrollSummary {
    /// Builds the summary for a period's records.
    pub fn new(period: PayPeriod, records: Vec<PayrollRecord>) -> Self {
        let mut status_counts = StatusCounts::default();
        for record in &records {
            match record.status() {
                PayrollStatus::Calculated => status_counts.calculated += 1,
                PayrollStatus::Approved => status_counts.approved += 1,
                PayrollStatus::Paid => status_counts.paid += 1,
            }
        }
        let totals = PayrollTotals::from_records(&records);
        Self {
            period,
            rows: records,
            status_counts,
            totals,
        }
    }
}

/// One line of the salary book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryBookRow {
    /// 1-based row number.
    pub stt: usize,
    /// The employee's id.
    pub employee_id: String,
    /// The employee's name, or the id when the directory no longer has them.
    pub name: String,
    /// The employee's position.
    pub position: String,
    /// `"worked/standard"`, e.g. `"23/26"`.
    pub working_days: String,
    /// Base salary.
    pub base_salary: Decimal,
    /// Allowances.
    pub allowances: Decimal,
    /// Gross salary.
    pub gross_salary: Decimal,
    /// Employee social insurance.
    pub social_insurance: Decimal,
    /// Employee health insurance.
    pub health_insurance: Decimal,
    /// Employee unemployment insurance.
    pub unemployment_insurance: Decimal,
    /// PIT withheld.
    pub pit: Decimal,
    /// Net salary.
    pub net_salary: Decimal,
    /// Lifecycle status of the record.
    pub status: PayrollStatus,
}

/// The printable salary book for a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryBook {
    /// The reported period.
    pub period: PayPeriod,
    /// Rows ordered by employee name, then id.
    pub rows: Vec<SalaryBookRow>,
    /// Column sums over the rows.
    pub totals: PayrollTotals,
}

impl SalaryBook {
    /// Builds the salary book from a period's records and the employees
    /// they belong to.
    ///
    /// # Example
    ///
    /// ```
    /// use std::collections::HashMap;
    /// use payroll_engine::models::PayPeriod;
    /// use payroll_engine::report::SalaryBook;
    ///
    /// let period = PayPeriod::new(3, 2024).unwrap();
    /// let book = SalaryBook::build(period, &[], &HashMap::new());
    ///
    /// assert!(book.rows.is_empty());
    /// assert_eq!(book.totals.employee_count, 0);
    /// ```
    pub fn build(
        period: PayPeriod,
        records: &[PayrollRecord],
        employees: &HashMap<String, Employee>,
    ) -> Self {
        let mut lines: Vec<(String, String, &PayrollRecord)> = records
            .iter()
            .map(|record| {
                let employee = employees.get(&record.draft.employee_id);
                let name = employee
                    .map(|e| e.name.clone())
                    .filter(|name| !name.trim().is_empty())
                    .unwrap_or_else(|| record.draft.employee_id.clone());
                let position = employee.map(|e| e.position.clone()).unwrap_or_default();
                (name, position, record)
            })
            .collect();
        lines.sort_by(|a, b| {
            a.0.cmp(&b.0)
                .then_with(|| a.2.draft.employee_id.cmp(&b.2.draft.employee_id))
        });

        let rows = lines
            .into_iter()
            .enumerate()
            .map(|(index, (name, position, record))| {
                let draft = &record.draft;
                SalaryBookRow {
                    stt: index + 1,
                    employee_id: draft.employee_id.clone(),
                    name,
                    position,
                    working_days: format!(
                        "{}/{}",
                        draft.working_days.normalize(),
                        draft.standard_days.normalize()
                    ),
                    base_salary: draft.base_salary,
                    allowances: draft.allowances,
                    gross_salary: draft.gross_salary,
                    social_insurance: draft.social_insurance,
                    health_insurance: draft.health_insurance,
                    unemployment_insurance: draft.unemployment_insurance,
                    pit: draft.pit,
                    net_salary: draft.net_salary,
                    status: record.status(),
                }
            })
            .collect();

        Self {
            period,
            rows,
            totals: PayrollTotals::from_records(records),
        }
    }
}
