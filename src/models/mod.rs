//! Core data models for the payroll engine.
//!
//! This module contains all the domain models used throughout the engine.

mod attendance;
mod audit;
mod employee;
mod ledger;
mod pay_period;
mod payroll;

pub use attendance::{AttendanceRecord, AttendanceStatus};
pub use audit::{AuditStep, AuditTrace};
pub use employee::{Employee, MAX_VND_AMOUNT};
pub use ledger::{ExpenseRecord, LedgerDirection, LedgerEntry, NewLedgerEntry};
pub use pay_period::PayPeriod;
pub use payroll::{PaymentMethod, PayrollDraft, PayrollRecord, PayrollState, PayrollStatus};
