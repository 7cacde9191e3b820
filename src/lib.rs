//! Payroll and statutory tax engine for Vietnamese retail payroll.
//!
//! This crate turns classified attendance and employee salary data into
//! monthly payroll records: attendance pro-rating, statutory social, health
//! and unemployment insurance, progressive personal income tax, net pay,
//! the `calculated -> approved -> paid` lifecycle, cash-ledger posting of
//! cash salary payments, and the salary book report.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod directory;
pub mod error;
pub mod ledger;
pub mod models;
pub mod report;
pub mod service;
pub mod store;
