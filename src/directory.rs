//! Collaborator seams for employee and attendance data.
//!
//! Payroll never owns employees or attendance: it reads them through
//! [`EmployeeDirectory`] and [`AttendanceSource`]. [`InMemoryDirectory`]
//! implements both and can be seeded from a JSON snapshot file.
//!
//! # Snapshot format
//!
//! ```json
//! {
//!   "employees": [
//!     { "id": "emp_001", "name": "Nguyen Van A", "position": "Cashier",
//!       "base_salary": "10000000", "allowances": "500000", "dependents": 1 }
//!   ],
//!   "attendance": [
//!     { "employee_id": "emp_001", "work_date": "2024-03-01", "status": "present" }
//!   ]
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::{AttendanceRecord, Employee, PayPeriod};

/// Read access to the HR employee directory.
pub trait EmployeeDirectory: Send + Sync {
    /// Looks up one employee, active or not.
    fn find_employee(&self, employee_id: &str) -> EngineResult<Option<Employee>>;

    /// All currently active employees, ordered by id.
    fn active_employees(&self) -> EngineResult<Vec<Employee>>;
}

/// Read access to classified attendance.
pub trait AttendanceSource: Send + Sync {
    /// One employee's attendance rows dated inside `period`.
    fn records_for_employee(
        &self,
        employee_id: &str,
        period: &PayPeriod,
    ) -> EngineResult<Vec<AttendanceRecord>>;

    /// Every employee's attendance rows dated inside `period`.
    fn records_for_period(&self, period: &PayPeriod) -> EngineResult<Vec<AttendanceRecord>>;
}

/// Serialized form of an [`InMemoryDirectory`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectorySnapshot {
    /// Employees, active or not.
    #[serde(default)]
    pub employees: Vec<Employee>,
    /// Attendance rows for any period.
    #[serde(default)]
    pub attendance: Vec<AttendanceRecord>,
}

#[derive(Debug, Default)]
struct DirectoryState {
    employees: BTreeMap<String, Employee>,
    attendance: Vec<AttendanceRecord>,
}

/// In-memory employee directory and attendance source.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    state: RwLock<DirectoryState>,
}

impl InMemoryDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a directory from a snapshot.
    pub fn from_snapshot(snapshot: DirectorySnapshot) -> Self {
        let directory = Self::new();
        for employee in snapshot.employees {
            directory.add_employee(employee);
        }
        for record in snapshot.attendance {
            directory.record_attendance(record);
        }
        directory
    }

    /// Loads a directory from a JSON snapshot file.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ConfigNotFound`] if the file cannot be read and
    /// [`EngineError::ConfigParseError`] if it is not a valid snapshot.
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;
        let snapshot: DirectorySnapshot =
            serde_json::from_str(&content).map_err(|e| EngineError::ConfigParseError {
                path: path_str,
                message: e.to_string(),
            })?;

        Ok(Self::from_snapshot(snapshot))
    }

    /// Adds or replaces an employee.
    pub fn add_employee(&self, employee: Employee) {
        self.state
            .write()
            .employees
            .insert(employee.id.clone(), employee);
    }

    /// Appends an attendance row.
    pub fn record_attendance(&self, record: AttendanceRecord) {
        self.state.write().attendance.push(record);
    }
}

impl EmployeeDirectory for InMemoryDirectory {
    fn find_employee(&self, employee_id: &str) -> EngineResult<Option<Employee>> {
        Ok(self.state.read().employees.get(employee_id).cloned())
    }

    fn active_employees(&self) -> EngineResult<Vec<Employee>> {
        Ok(self
            .state
            .read()
            .employees
            .values()
            .filter(|e| e.active)
            .cloned()
            .collect())
    }
}

impl AttendanceSource for InMemoryDirectory {
    fn records_for_employee(
        &self,
        employee_id: &str,
        period: &PayPeriod,
    ) -> EngineResult<Vec<AttendanceRecord>> {
        Ok(self
            .state
            .read()
            .attendance
            .iter()
            .filter(|r| r.employee_id == employee_id && period.contains_date(r.work_date))
            .cloned()
            .collect())
    }

    fn records_for_period(&self, period: &PayPeriod) -> EngineResult<Vec<AttendanceRecord>> {
        Ok(self
            .state
            .read()
            .attendance
            .iter()
            .filter(|r| period.contains_date(r.work_date))
            .cloned()
            .collect())
    }
}
