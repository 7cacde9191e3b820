//! The payroll service: the six operations exposed to callers.
//!
//! [`PayrollService`] ties the pure calculation functions to the record
//! store, the cash ledger and the employee/attendance collaborators.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::calculation::{WorkingDaysSummary, aggregate_working_days, calculate_salary};
use crate::config::PayrollConfig;
use crate::directory::{AttendanceSource, EmployeeDirectory};
use crate::error::{EngineError, EngineResult};
use crate::ledger::{CashLedger, LedgerSnapshot};
use crate::models::{
    AttendanceRecord, AuditTrace, Employee, LedgerEntry, NewLedgerEntry, PayPeriod,
    PaymentMethod, PayrollRecord,
};
use crate::report::{PayrollSummary, SalaryBook};
use crate::store::{ApprovalOutcome, PayrollStore};

/// A stored record together with how it was calculated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollCalculation {
    /// The stored payroll record.
    pub record: PayrollRecord,
    /// The attendance aggregation behind `working_days`.
    pub attendance: WorkingDaysSummary,
    /// The rules applied, in order.
    pub audit_trace: AuditTrace,
}

/// One employee that a batch run could not calculate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchFailure {
    /// The employee that failed.
    pub employee_id: String,
    /// Stable error code.
    pub code: String,
    /// Human-readable reason.
    pub message: String,
}

/// The result of calculating a whole period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchOutcome {
    /// The calculated period.
    pub period: PayPeriod,
    /// Number of employees calculated successfully.
    pub calculated: usize,
    /// The stored records, ordered by employee id.
    pub results: Vec<PayrollRecord>,
    /// Employees that failed, ordered by employee id.
    pub failures: Vec<BatchFailure>,
}

/// Payroll operations over a store, a ledger and the collaborators.
pub struct PayrollService {
    config: Arc<PayrollConfig>,
    directory: Arc<dyn EmployeeDirectory>,
    attendance: Arc<dyn AttendanceSource>,
    store: PayrollStore,
    ledger: CashLedger,
}

impl PayrollService {
    /// Creates a service with an empty store and a ledger at the configured
    /// opening balance.
    pub fn new(
        config: PayrollConfig,
        directory: Arc<dyn EmployeeDirectory>,
        attendance: Arc<dyn AttendanceSource>,
    ) -> Self {
        let ledger = CashLedger::new(&config.ledger);
        Self {
            config: Arc::new(config),
            directory,
            attendance,
            store: PayrollStore::new(),
            ledger,
        }
    }

    /// The statutory parameters in use.
    pub fn config(&self) -> &PayrollConfig {
        &self.config
    }

    /// The payroll record store.
    pub fn store(&self) -> &PayrollStore {
        &self.store
    }

    /// The cash ledger.
    pub fn ledger(&self) -> &CashLedger {
        &self.ledger
    }

    /// Calculates and stores one employee's payroll for a period.
    ///
    /// # Errors
    ///
    /// - [`EngineError::InvalidPeriod`] for a malformed month or year
    /// - [`EngineError::EmployeeNotFound`] / [`EngineError::EmployeeInactive`]
    /// - [`EngineError::PayrollLocked`] if the period is already approved or paid
    /// - any error from the collaborators or the calculation
    pub fn calculate_salary(
        &self,
        employee_id: &str,
        month: u32,
        year: i32,
    ) -> EngineResult<PayrollCalculation> {
        let period = PayPeriod::new(month, year)?;
        let employee = self
            .directory
            .find_employee(employee_id)?
            .ok_or_else(|| EngineError::EmployeeNotFound {
                employee_id: employee_id.to_string(),
            })?;
        if !employee.active {
            return Err(EngineError::EmployeeInactive {
                employee_id: employee.id,
            });
        }
        let records = self.attendance.records_for_employee(employee_id, &period)?;

        let calculation = self.calculate_one(&employee, &period, &records)?;
        info!(
            employee_id = %employee_id,
            period = %period,
            payroll_id = %calculation.record.id,
            gross_salary = %calculation.record.draft.gross_salary,
            net_salary = %calculation.record.draft.net_salary,
            "Salary calculated"
        );
        Ok(calculation)
    }

    /// Calculates and stores payroll for every active employee.
    ///
    /// Employees and attendance are each read once for the whole period.
    /// A failure for one employee is recorded in `failures` and does not
    /// stop the others.
    pub fn calculate_all(&self, month: u32, year: i32) -> EngineResult<BatchOutcome> {
        let start_time = Instant::now();
        let period = PayPeriod::new(month, year)?;
        let employees = self.directory.active_employees()?;

        let mut attendance_by_employee: HashMap<String, Vec<AttendanceRecord>> = HashMap::new();
        for record in self.attendance.records_for_period(&period)? {
            attendance_by_employee
                .entry(record.employee_id.clone())
                .or_default()
                .push(record);
        }

        let mut results = Vec::with_capacity(employees.len());
        let mut failures = Vec::new();
        for employee in &employees {
            let records = attendance_by_employee
                .get(&employee.id)
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            match self.calculate_one(employee, &period, records) {
                Ok(calculation) => results.push(calculation.record),
                Err(err) => {
                    warn!(
                        employee_id = %employee.id,
                        period = %period,
                        code = err.code(),
                        error = %err,
                        "Salary calculation failed"
                    );
                    failures.push(BatchFailure {
                        employee_id: employee.id.clone(),
                        code: err.code().to_string(),
                        message: err.to_string(),
                    });
                }
            }
        }
        results.sort_by(|a, b| a.draft.employee_id.cmp(&b.draft.employee_id));
        failures.sort_by(|a, b| a.employee_id.cmp(&b.employee_id));

        info!(
            period = %period,
            calculated = results.len(),
            failed = failures.len(),
            duration_us = start_time.elapsed().as_micros() as u64,
            "Batch calculation completed"
        );
        Ok(BatchOutcome {
            period,
            calculated: results.len(),
            results,
            failures,
        })
    }

    /// Approves each `calculated` record; others are rejected individually.
    pub fn approve_payroll(&self, payroll_ids: &[Uuid], approved_by: &str) -> ApprovalOutcome {
        let outcome = self.store.approve(payroll_ids, approved_by, Utc::now());
        info!(
            approved_by = %approved_by,
            approved = outcome.approved.len(),
            rejected = outcome.rejected.len(),
            "Payroll approval processed"
        );
        outcome
    }

    /// Marks an approved record as paid, posting cash payments to the ledger.
    pub fn mark_paid(
        &self,
        payroll_id: Uuid,
        payment_method: PaymentMethod,
        paid_date: NaiveDate,
    ) -> EngineResult<PayrollRecord> {
        let record =
            self.store
                .mark_paid(payroll_id, payment_method, paid_date, &self.ledger, Utc::now())?;
        info!(
            payroll_id = %payroll_id,
            employee_id = %record.draft.employee_id,
            payment_method = ?payment_method,
            net_salary = %record.draft.net_salary,
            "Payroll marked paid"
        );
        Ok(record)
    }

    /// All records of a period with per-status counts and totals.
    pub fn get_payroll(&self, month: u32, year: i32) -> EngineResult<PayrollSummary> {
        let period = PayPeriod::new(month, year)?;
        Ok(PayrollSummary::new(period, self.store.list_period(&period)))
    }

    /// The salary book of a period.
    pub fn get_salary_book(&self, month: u32, year: i32) -> EngineResult<SalaryBook> {
        let period = PayPeriod::new(month, year)?;
        let records = self.store.list_period(&period);

        // Employees who have since left are looked up one by one.
        let mut employees: HashMap<String, Employee> = self
            .directory
            .active_employees()?
            .into_iter()
            .map(|employee| (employee.id.clone(), employee))
            .collect();
        for record in &records {
            let employee_id = &record.draft.employee_id;
            if employees.contains_key(employee_id) {
                continue;
            }
            if let Some(employee) = self.directory.find_employee(employee_id)? {
                employees.insert(employee.id.clone(), employee);
            }
        }

        Ok(SalaryBook::build(period, &records, &employees))
    }

    /// Posts a non-payroll cash movement to the ledger.
    pub fn post_ledger_entry(&self, entry: NewLedgerEntry) -> EngineResult<LedgerEntry> {
        let entry = self.ledger.post(entry, Utc::now())?;
        info!(
            sequence = entry.sequence,
            direction = ?entry.direction,
            amount = %entry.amount,
            balance_after = %entry.balance_after,
            "Ledger entry posted"
        );
        Ok(entry)
    }

    /// A consistent copy of the cash ledger.
    pub fn ledger_snapshot(&self) -> LedgerSnapshot {
        self.ledger.snapshot()
    }

    fn calculate_one(
        &self,
        employee: &Employee,
        period: &PayPeriod,
        records: &[AttendanceRecord],
    ) -> EngineResult<PayrollCalculation> {
        let attendance = aggregate_working_days(&employee.id, period, records);
        let mut calculation =
            calculate_salary(employee, period, attendance.working_days, &self.config, 2)?;
        calculation
            .audit_trace
            .steps
            .insert(0, attendance.audit_step(&employee.id, period, 1));

        let record = self.store.upsert(calculation.draft, Utc::now())?;
        debug!(
            employee_id = %employee.id,
            working_days = %attendance.working_days,
            "Payroll record stored"
        );
        Ok(PayrollCalculation {
            record,
            attendance,
            audit_trace: calculation.audit_trace,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LedgerConfig;
    use crate::directory::InMemoryDirectory;
    use crate::models::{AttendanceStatus, PayrollStatus};
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn employee(id: &str, name: &str, base: &str, active: bool) -> Employee {
        Employee {
            id: id.to_string(),
            name: name.to_string(),
            position: "Cashier".to_string(),
            base_salary: dec(base),
            allowances: dec("500000"),
            dependents: 1,
            active,
        }
    }

    fn standard_month(directory: &InMemoryDirectory, employee_id: &str) {
        for d in 1..=22 {
            directory.record_attendance(AttendanceRecord {
                employee_id: employee_id.to_string(),
                work_date: NaiveDate::from_ymd_opt(2024, 3, d).unwrap(),
                status: AttendanceStatus::Present,
            });
        }
        for d in [23, 25] {
            directory.record_attendance(AttendanceRecord {
                employee_id: employee_id.to_string(),
                work_date: NaiveDate::from_ymd_opt(2024, 3, d).unwrap(),
                status: AttendanceStatus::HalfDay,
            });
        }
    }

    fn create_test_service(ledger: LedgerConfig) -> PayrollService {
        let directory = Arc::new(InMemoryDirectory::new());
        directory.add_employee(employee("emp_001", "Nguyen Van A", "10000000", true));
        directory.add_employee(employee("emp_002", "Tran Thi B", "-1", true));
        directory.add_employee(employee("emp_003", "Le Van C", "8000000", false));
        standard_month(&directory, "emp_001");

        let config = PayrollConfig {
            ledger,
            ..PayrollConfig::default()
        };
        PayrollService::new(config, directory.clone(), directory)
    }

    fn default_service() -> PayrollService {
        create_test_service(LedgerConfig::default())
    }

    fn pay_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, 5).unwrap()
    }

    #[test]
    fn test_calculate_salary_end_to_end() {
        let service = default_service();
        let calculation = service.calculate_salary("emp_001", 3, 2024).unwrap();

        assert_eq!(calculation.attendance.working_days, dec("23"));
        assert_eq!(calculation.record.draft.net_salary, dec("8364808"));
        assert_eq!(calculation.record.status(), PayrollStatus::Calculated);
        assert_eq!(calculation.audit_trace.steps[0].rule_id, "working_days");
        assert_eq!(calculation.audit_trace.steps.len(), 7);
    }

    #[test]
    fn test_calculate_unknown_employee() {
        let service = default_service();
        let result = service.calculate_salary("emp_404", 3, 2024);
        assert!(matches!(result, Err(EngineError::EmployeeNotFound { .. })));
        assert!(service.store().is_empty());
    }

    #[test]
    fn test_calculate_inactive_employee() {
        let service = default_service();
        let result = service.calculate_salary("emp_003", 3, 2024);
        assert!(matches!(result, Err(EngineError::EmployeeInactive { .. })));
    }

    #[test]
    fn test_calculate_invalid_period() {
        let service = default_service();
        let result = service.calculate_salary("emp_001", 13, 2024);
        assert!(matches!(result, Err(EngineError::InvalidPeriod { .. })));
        assert!(service.store().is_empty());
    }

    #[test]
    fn test_calculate_all_isolates_failures() {
        let service = default_service();
        let outcome = service.calculate_all(3, 2024).unwrap();

        assert_eq!(outcome.calculated, 1);
        assert_eq!(outcome.results[0].draft.employee_id, "emp_001");
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].employee_id, "emp_002");
        assert_eq!(outcome.failures[0].code, "INVALID_EMPLOYEE");
    }

    #[test]
    fn test_recalculation_after_approval_is_locked() {
        let service = default_service();
        let calculation = service.calculate_salary("emp_001", 3, 2024).unwrap();
        service.approve_payroll(&[calculation.record.id], "manager");

        let result = service.calculate_salary("emp_001", 3, 2024);
        assert!(matches!(result, Err(EngineError::PayrollLocked { .. })));

        let outcome = service.calculate_all(3, 2024).unwrap();
        assert_eq!(outcome.calculated, 0);
        assert!(outcome.failures.iter().any(|f| f.code == "PAYROLL_LOCKED"));
    }

    #[test]
    fn test_full_lifecycle_with_cash() {
        let service = default_service();
        let id = service.calculate_salary("emp_001", 3, 2024).unwrap().record.id;

        let outcome = service.approve_payroll(&[id], "manager");
        assert_eq!(outcome.approved.len(), 1);

        let paid = service.mark_paid(id, PaymentMethod::Cash, pay_date()).unwrap();
        assert_eq!(paid.status(), PayrollStatus::Paid);

        let ledger = service.ledger_snapshot();
        assert_eq!(ledger.balance, dec("-8364808"));
        assert_eq!(ledger.expenses[0].amount, dec("9346154"));
    }

    #[test]
    fn test_cash_payment_rejected_without_funds() {
        let service = create_test_service(LedgerConfig {
            opening_balance: dec("1000000"),
            allow_overdraft: false,
        });
        let id = service.calculate_salary("emp_001", 3, 2024).unwrap().record.id;
        service.approve_payroll(&[id], "manager");

        let result = service.mark_paid(id, PaymentMethod::Cash, pay_date());

        assert!(matches!(result, Err(EngineError::LedgerRejected { .. })));
        assert_eq!(service.store().get(id).unwrap().status(), PayrollStatus::Approved);

        // Funding the drawer lets the same payment through.
        service
            .post_ledger_entry(NewLedgerEntry {
                entry_date: pay_date(),
                direction: crate::models::LedgerDirection::Receipt,
                amount: dec("10000000"),
                description: "Owner top-up".to_string(),
                reference: None,
            })
            .unwrap();
        let paid = service.mark_paid(id, PaymentMethod::Cash, pay_date()).unwrap();
        assert_eq!(paid.status(), PayrollStatus::Paid);
        assert_eq!(service.ledger().balance(), dec("2635192"));
    }

    #[test]
    fn test_get_payroll_totals() {
        let service = default_service();
        service.calculate_all(3, 2024).unwrap();

        let summary = service.get_payroll(3, 2024).unwrap();
        assert_eq!(summary.rows.len(), 1);
        assert_eq!(summary.status_counts.calculated, 1);
        assert_eq!(summary.totals.net_salary, dec("8364808"));
    }

    #[test]
    fn test_salary_book_uses_directory_names() {
        let service = default_service();
        service.calculate_all(3, 2024).unwrap();

        let book = service.get_salary_book(3, 2024).unwrap();
        assert_eq!(book.rows.len(), 1);
        assert_eq!(book.rows[0].name, "Nguyen Van A");
        assert_eq!(book.rows[0].working_days, "23/26");
        assert_eq!(book.totals.gross_salary, dec("9346154"));
    }

    #[test]
    fn test_calculate_all_isolates_oversized_employee() {
        let directory = Arc::new(InMemoryDirectory::new());
        directory.add_employee(employee("emp_001", "Nguyen Van A", "10000000", true));
        let mut oversized = employee("emp_002", "Tran Thi B", "0", true);
        oversized.base_salary = Decimal::MAX;
        oversized.allowances = Decimal::MAX;
        directory.add_employee(oversized);
        standard_month(&directory, "emp_001");
        for d in 1..=5 {
            directory.record_attendance(AttendanceRecord {
                employee_id: "emp_002".to_string(),
                work_date: NaiveDate::from_ymd_opt(2024, 3, d).unwrap(),
                status: AttendanceStatus::Present,
            });
        }
        let service = PayrollService::new(PayrollConfig::default(), directory.clone(), directory);

        let outcome = service.calculate_all(3, 2024).unwrap();

        assert_eq!(outcome.calculated, 1);
        assert_eq!(outcome.results[0].draft.employee_id, "emp_001");
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].employee_id, "emp_002");
        assert_eq!(outcome.failures[0].code, "INVALID_EMPLOYEE");
        assert_eq!(service.store().len(), 1);
    }

    #[test]
    fn test_salary_book_names_inactive_employee() {
        let directory = Arc::new(InMemoryDirectory::new());
        directory.add_employee(employee("emp_001", "Nguyen Van A", "10000000", true));
        directory.add_employee(employee("emp_005", "Pham Thi E", "8000000", true));
        standard_month(&directory, "emp_001");
        standard_month(&directory, "emp_005");
        let service = PayrollService::new(PayrollConfig::default(), directory.clone(), directory.clone());
        service.calculate_all(3, 2024).unwrap();

        // emp_005 leaves after payroll was calculated.
        directory.add_employee(employee("emp_005", "Pham Thi E", "8000000", false));

        let book = service.get_salary_book(3, 2024).unwrap();
        let names: Vec<&str> = book.rows.iter().map(|row| row.name.as_str()).collect();
        assert_eq!(names, vec!["Nguyen Van A", "Pham Thi E"]);
    }
}
