//! HTTP request handlers for the payroll API.
//!
//! This module contains the handler functions for all API endpoints.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::EngineError;
use crate::models::NewLedgerEntry;

use super::request::{ApproveRequest, CalculateRequest, PayRequest, PeriodRequest};
use super::response::{ApiError, ApiErrorResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/payroll", get(get_payroll_handler))
        .route("/payroll/calculate", post(calculate_handler))
        .route("/payroll/calculate-all", post(calculate_all_handler))
        .route("/payroll/approve", post(approve_handler))
        .route("/payroll/salary-book", get(salary_book_handler))
        .route("/payroll/:id/pay", post(pay_handler))
        .route("/ledger", get(ledger_handler))
        .route("/ledger/entries", post(post_ledger_entry_handler))
        .with_state(state)
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

fn engine_error_response(correlation_id: Uuid, err: EngineError) -> Response {
    warn!(
        correlation_id = %correlation_id,
        code = err.code(),
        error = %err,
        "Request failed"
    );
    ApiErrorResponse::from(err).into_response()
}

/// Converts a JSON body rejection into a 400 error.
fn json_rejection_response(correlation_id: Uuid, rejection: JsonRejection) -> Response {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            // Get the body text which contains the detailed error from serde
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    ApiErrorResponse::bad_request(error).into_response()
}

fn query_rejection_response(correlation_id: Uuid, rejection: QueryRejection) -> Response {
    let body_text = rejection.body_text();
    warn!(correlation_id = %correlation_id, error = %body_text, "Invalid query string");
    ApiErrorResponse::bad_request(ApiError::validation_error(body_text)).into_response()
}

fn path_rejection_response(correlation_id: Uuid, rejection: PathRejection) -> Response {
    let body_text = rejection.body_text();
    warn!(correlation_id = %correlation_id, error = %body_text, "Invalid path parameter");
    ApiErrorResponse::bad_request(ApiError::validation_error(body_text)).into_response()
}

/// Handler for GET /health.
async fn health_handler(State(state): State<AppState>) -> Response {
    let metadata = &state.service().config().metadata;
    json_response(
        StatusCode::OK,
        serde_json::json!({
            "status": "ok",
            "regime": metadata.code,
            "version": metadata.version
        }),
    )
}

/// Handler for POST /payroll/calculate.
///
/// Calculates one employee's payroll for a month and returns the stored
/// record with its audit trace.
async fn calculate_handler(
    State(state): State<AppState>,
    payload: Result<Json<CalculateRequest>, JsonRejection>,
) -> Response {
    // Generate correlation ID for request tracking
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing calculation request");

    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return json_rejection_response(correlation_id, rejection),
    };

    match state
        .service()
        .calculate_salary(&request.employee_id, request.month, request.year)
    {
        Ok(calculation) => {
            info!(
                correlation_id = %correlation_id,
                employee_id = %request.employee_id,
                payroll_id = %calculation.record.id,
                net_salary = %calculation.record.draft.net_salary,
                duration_us = calculation.audit_trace.duration_us,
                "Calculation completed successfully"
            );
            json_response(StatusCode::OK, calculation)
        }
        Err(err) => engine_error_response(correlation_id, err),
    }
}

/// Handler for POST /payroll/calculate-all.
async fn calculate_all_handler(
    State(state): State<AppState>,
    payload: Result<Json<PeriodRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing batch calculation request");

    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return json_rejection_response(correlation_id, rejection),
    };

    match state.service().calculate_all(request.month, request.year) {
        Ok(outcome) => {
            info!(
                correlation_id = %correlation_id,
                period = %outcome.period,
                calculated = outcome.calculated,
                failed = outcome.failures.len(),
                "Batch calculation completed"
            );
            json_response(StatusCode::OK, outcome)
        }
        Err(err) => engine_error_response(correlation_id, err),
    }
}

/// Handler for POST /payroll/approve.
///
/// Always 200 once the body is valid: ids that cannot be approved are
/// listed under `rejected`.
async fn approve_handler(
    State(state): State<AppState>,
    payload: Result<Json<ApproveRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing approval request");

    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return json_rejection_response(correlation_id, rejection),
    };
    if let Some(message) = request.validate() {
        warn!(correlation_id = %correlation_id, error = %message, "Invalid approval request");
        return ApiErrorResponse::bad_request(ApiError::validation_error(message))
            .into_response();
    }

    let outcome = state
        .service()
        .approve_payroll(&request.payroll_ids, &request.approved_by);
    info!(
        correlation_id = %correlation_id,
        approved = outcome.approved.len(),
        rejected = outcome.rejected.len(),
        "Approval completed"
    );
    json_response(StatusCode::OK, outcome)
}

/// Handler for POST /payroll/:id/pay.
async fn pay_handler(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<PayRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing payment request");

    let payroll_id = match path {
        Ok(Path(id)) => id,
        Err(rejection) => return path_rejection_response(correlation_id, rejection),
    };
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return json_rejection_response(correlation_id, rejection),
    };

    match state
        .service()
        .mark_paid(payroll_id, request.payment_method, request.payment_date)
    {
        Ok(record) => {
            info!(
                correlation_id = %correlation_id,
                payroll_id = %payroll_id,
                "Payment recorded"
            );
            json_response(StatusCode::OK, record)
        }
        Err(err) => engine_error_response(correlation_id, err),
    }
}

/// Handler for GET /payroll?month=&year=.
async fn get_payroll_handler(
    State(state): State<AppState>,
    query: Result<Query<PeriodRequest>, QueryRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let period = match query {
        Ok(Query(period)) => period,
        Err(rejection) => return query_rejection_response(correlation_id, rejection),
    };

    match state.service().get_payroll(period.month, period.year) {
        Ok(summary) => json_response(StatusCode::OK, summary),
        Err(err) => engine_error_response(correlation_id, err),
    }
}

/// Handler for GET /payroll/salary-book?month=&year=.
async fn salary_book_handler(
    State(state): State<AppState>,
    query: Result<Query<PeriodRequest>, QueryRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let period = match query {
        Ok(Query(period)) => period,
        Err(rejection) => return query_rejection_response(correlation_id, rejection),
    };

    match state.service().get_salary_book(period.month, period.year) {
        Ok(book) => json_response(StatusCode::OK, book),
        Err(err) => engine_error_response(correlation_id, err),
    }
}

/// Handler for GET /ledger.
async fn ledger_handler(State(state): State<AppState>) -> Response {
    json_response(StatusCode::OK, state.service().ledger_snapshot())
}

/// Handler for POST /ledger/entries.
async fn post_ledger_entry_handler(
    State(state): State<AppState>,
    payload: Result<Json<NewLedgerEntry>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing ledger posting");

    let entry = match payload {
        Ok(Json(entry)) => entry,
        Err(rejection) => return json_rejection_response(correlation_id, rejection),
    };

    match state.service().post_ledger_entry(entry) {
        Ok(entry) => json_response(StatusCode::CREATED, entry),
        Err(err) => engine_error_response(correlation_id, err),
    }
}
