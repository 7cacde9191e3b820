//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading payroll
//! configurations from YAML files.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{EngineError, EngineResult};

use super::types::{
    InsuranceConfig, LedgerConfig, PayrollConfig, RegimeMetadata, TaxBracket, TaxConfig,
};

/// The `regime` section of regime.yaml.
#[derive(Debug, Deserialize)]
struct RegimeFile {
    regime: RegimeMetadata,
}

/// Loads and provides access to payroll configuration.
///
/// # Directory Structure
///
/// ```text
/// config/vn_2024/
/// ├── regime.yaml      # Regime metadata
/// ├── insurance.yaml   # Standard days, insurance cap and rates
/// ├── tax.yaml         # Family deductions and PIT brackets
/// └── ledger.yaml      # Opening balance and overdraft policy
/// ```
///
/// # Example
///
/// ```no_run
/// use payroll_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/vn_2024")?;
/// println!("Loaded regime: {}", loader.metadata().name);
/// # Ok::<(), payroll_engine::error::EngineError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: PayrollConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - Any required file is missing
    /// - Any file contains invalid YAML
    /// - The loaded parameters fail [`PayrollConfig::validate`]
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let regime = Self::load_yaml::<RegimeFile>(&path.join("regime.yaml"))?;
        let insurance = Self::load_yaml::<InsuranceConfig>(&path.join("insurance.yaml"))?;
        let tax = Self::load_yaml::<TaxConfig>(&path.join("tax.yaml"))?;
        let ledger = Self::load_yaml::<LedgerConfig>(&path.join("ledger.yaml"))?;

        let config = PayrollConfig {
            metadata: regime.regime,
            insurance,
            tax,
            ledger,
        };
        config.validate()?;

        Ok(Self { config })
    }

    /// Wraps an already-built configuration, validating it first.
    pub fn from_config(config: PayrollConfig) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the underlying payroll configuration.
    pub fn config(&self) -> &PayrollConfig {
        &self.config
    }

    /// Consumes the loader, returning the configuration.
    pub fn into_config(self) -> PayrollConfig {
        self.config
    }

    /// Returns the regime metadata.
    pub fn metadata(&self) -> &RegimeMetadata {
        &self.config.metadata
    }

    /// Returns the PIT bracket table.
    pub fn tax_brackets(&self) -> &[TaxBracket] {
        &self.config.tax.brackets
    }
}
