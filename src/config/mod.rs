//! Configuration loading and management for the payroll engine.
//!
//! This module provides functionality to load statutory payroll parameters
//! from YAML files: pro-rating divisor, insurance cap and rates, family
//! deductions, the PIT bracket table, and the cash-ledger policy.
//!
//! # Example
//!
//! ```no_run
//! use payroll_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/vn_2024").unwrap();
//! println!("Loaded regime: {}", config.metadata().name);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    InsuranceConfig, InsuranceRates, LedgerConfig, PayrollConfig, RegimeMetadata, TaxBracket,
    TaxConfig,
};
