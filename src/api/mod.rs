//! HTTP API module for the payroll engine.
//!
//! This module provides the REST endpoints for calculating, approving and
//! paying monthly payroll, reading period reports, and working the cash
//! ledger.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{ApproveRequest, CalculateRequest, PayRequest, PeriodRequest};
pub use response::{ApiError, ApiErrorResponse, status_for};
pub use state::AppState;
