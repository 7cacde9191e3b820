//! Application state for the payroll API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::service::PayrollService;

/// Shared application state.
///
/// Wraps the payroll service so every handler works against the same
/// record store and cash ledger.
#[derive(Clone)]
pub struct AppState {
    service: Arc<PayrollService>,
}

impl AppState {
    /// Creates a new application state around a payroll service.
    pub fn new(service: PayrollService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }

    /// Returns a reference to the payroll service.
    pub fn service(&self) -> &PayrollService {
        &self.service
    }
}
