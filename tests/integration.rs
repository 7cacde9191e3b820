//! Integration tests for the payroll API.
//!
//! This test suite drives the HTTP router end to end:
//! - Single and batch salary calculation
//! - Recalculation of calculated and locked periods
//! - Approval and payment lifecycle
//! - Cash-ledger posting and overdraft rejection
//! - Period summaries and the salary book
//! - Error cases

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tower::ServiceExt;

use payroll_engine::api::{create_router, AppState};
use payroll_engine::config::{ConfigLoader, LedgerConfig};
use payroll_engine::directory::InMemoryDirectory;
use payroll_engine::models::{AttendanceRecord, AttendanceStatus, Employee};
use payroll_engine::service::PayrollService;

// =============================================================================
// Test Helpers
// =============================================================================

fn decimal(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn employee(id: &str, name: &str, base: &str, allowances: &str, dependents: u32) -> Employee {
    Employee {
        id: id.to_string(),
        name: name.to_string(),
        position: "Sales Associate".to_string(),
        base_salary: decimal(base),
        allowances: decimal(allowances),
        dependents,
        active: true,
    }
}

fn mark(directory: &InMemoryDirectory, employee_id: &str, day: u32, status: AttendanceStatus) {
    directory.record_attendance(AttendanceRecord {
        employee_id: employee_id.to_string(),
        work_date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
        status,
    });
}

/// Seeds a small store for March 2024:
/// - emp_001: 22 present + 2 half days, 1 dependent (the reference payslip)
/// - emp_002: 26 present days on 40,000,000 (pays PIT)
/// - emp_003: inactive
/// - emp_004: fractional base salary (fails validation)
fn seeded_directory() -> Arc<InMemoryDirectory> {
    let directory = Arc::new(InMemoryDirectory::new());
    directory.add_employee(employee("emp_001", "Nguyen Van A", "10000000", "500000", 1));
    directory.add_employee(employee("emp_002", "Tran Thi B", "40000000", "0", 0));
    directory.add_employee(Employee {
        active: false,
        ..employee("emp_003", "Le Van C", "8000000", "0", 0)
    });
    directory.add_employee(employee("emp_004", "Pham Van D", "1000000.5", "0", 0));

    for day in 1..=22 {
        mark(&directory, "emp_001", day, AttendanceStatus::Present);
    }
    mark(&directory, "emp_001", 23, AttendanceStatus::HalfDay);
    mark(&directory, "emp_001", 25, AttendanceStatus::HalfDay);
    mark(&directory, "emp_001", 26, AttendanceStatus::Absent);
    mark(&directory, "emp_001", 27, AttendanceStatus::Leave);
    for day in 1..=26 {
        mark(&directory, "emp_002", day, AttendanceStatus::Present);
    }
    directory
}

fn create_router_with_ledger(ledger: Option<LedgerConfig>) -> Router {
    let mut config = ConfigLoader::load("./config/vn_2024")
        .expect("Failed to load config")
        .into_config();
    if let Some(ledger) = ledger {
        config.ledger = ledger;
    }
    let directory = seeded_directory();
    create_router(AppState::new(PayrollService::new(
        config,
        directory.clone(),
        directory,
    )))
}

fn create_router_for_test() -> Router {
    create_router_with_ledger(None)
}

async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

async fn calculate(router: &Router, employee_id: &str) -> (StatusCode, Value) {
    send(
        router,
        "POST",
        "/payroll/calculate",
        Some(json!({ "employee_id": employee_id, "month": 3, "year": 2024 })),
    )
    .await
}

async fn approve(router: &Router, ids: &[&str]) -> (StatusCode, Value) {
    send(
        router,
        "POST",
        "/payroll/approve",
        Some(json!({ "payroll_ids": ids, "approved_by": "store_manager" })),
    )
    .await
}

async fn pay(router: &Router, id: &str, method: &str) -> (StatusCode, Value) {
    send(
        router,
        "POST",
        &format!("/payroll/{}/pay", id),
        Some(json!({ "payment_method": method, "payment_date": "2024-04-05" })),
    )
    .await
}

/// Calculates and approves emp_001, returning the payroll id.
async fn approved_reference_payroll(router: &Router) -> String {
    let (_, result) = calculate(router, "emp_001").await;
    let id = result["record"]["id"].as_str().unwrap().to_string();
    let (status, _) = approve(router, &[&id]).await;
    assert_eq!(status, StatusCode::OK);
    id
}

fn amount(value: &Value) -> Decimal {
    decimal(value.as_str().expect("amounts serialize as strings"))
}

// =============================================================================
// SECTION 1: Calculation
// =============================================================================

#[tokio::test]
async fn test_reference_payslip() {
    let router = create_router_for_test();
    let (status, result) = calculate(&router, "emp_001").await;

    assert_eq!(status, StatusCode::OK);
    let record = &result["record"];
    assert_eq!(record["status"], "calculated");
    assert_eq!(amount(&record["working_days"]), decimal("23"));
    assert_eq!(amount(&record["pro_rated_salary"]), decimal("8846154"));
    assert_eq!(amount(&record["gross_salary"]), decimal("9346154"));
    assert_eq!(amount(&record["social_insurance"]), decimal("747692"));
    assert_eq!(amount(&record["health_insurance"]), decimal("140192"));
    assert_eq!(amount(&record["unemployment_insurance"]), decimal("93462"));
    assert_eq!(amount(&record["taxable_income"]), Decimal::ZERO);
    assert_eq!(amount(&record["pit"]), Decimal::ZERO);
    assert_eq!(amount(&record["net_salary"]), decimal("8364808"));

    assert_eq!(result["attendance"]["present_days"], 22);
    assert_eq!(result["attendance"]["half_days"], 2);
}

#[tokio::test]
async fn test_employer_contributions_recorded() {
    let router = create_router_for_test();
    let (_, result) = calculate(&router, "emp_001").await;

    let record = &result["record"];
    assert_eq!(amount(&record["employer_social_insurance"]), decimal("1635577"));
    assert_eq!(amount(&record["employer_health_insurance"]), decimal("280385"));
    assert_eq!(amount(&record["employer_unemployment_insurance"]), decimal("93462"));
}

#[tokio::test]
async fn test_high_earner_pays_progressive_pit() {
    let router = create_router_for_test();
    let (status, result) = calculate(&router, "emp_002").await;

    assert_eq!(status, StatusCode::OK);
    let record = &result["record"];
    assert_eq!(amount(&record["gross_salary"]), decimal("40000000"));
    assert_eq!(amount(&record["taxable_income"]), decimal("24800000"));
    assert_eq!(amount(&record["pit"]), decimal("3310000"));
    assert_eq!(amount(&record["net_salary"]), decimal("32490000"));
}

#[tokio::test]
async fn test_audit_trace_included() {
    let router = create_router_for_test();
    let (_, result) = calculate(&router, "emp_001").await;

    let steps = result["audit_trace"]["steps"].as_array().unwrap();
    let rule_ids: Vec<&str> = steps.iter().map(|s| s["rule_id"].as_str().unwrap()).collect();
    assert_eq!(
        rule_ids,
        vec![
            "working_days",
            "pro_rated_salary",
            "gross_salary",
            "statutory_insurance",
            "taxable_income",
            "pit",
            "net_salary"
        ]
    );
}

#[tokio::test]
async fn test_recalculation_is_byte_identical() {
    let router = create_router_for_test();
    let (_, first) = calculate(&router, "emp_001").await;
    let (_, second) = calculate(&router, "emp_001").await;

    assert_eq!(first["record"].to_string(), second["record"].to_string());
}

#[tokio::test]
async fn test_calculate_all_isolates_failures() {
    let router = create_router_for_test();
    let (status, result) = send(
        &router,
        "POST",
        "/payroll/calculate-all",
        Some(json!({ "month": 3, "year": 2024 })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["calculated"], 2);
    let results = result["results"].as_array().unwrap();
    assert_eq!(results[0]["employee_id"], "emp_001");
    assert_eq!(results[1]["employee_id"], "emp_002");

    let failures = result["failures"].as_array().unwrap();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0]["employee_id"], "emp_004");
    assert_eq!(failures[0]["code"], "INVALID_EMPLOYEE");
}

// =============================================================================
// SECTION 2: Lifecycle
// =============================================================================

#[tokio::test]
async fn test_approve_then_reapprove_rejected() {
    let router = create_router_for_test();
    let id = approved_reference_payroll(&router).await;

    let (status, result) = approve(&router, &[&id]).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["approved"].as_array().unwrap().len(), 0);
    assert_eq!(result["rejected"][0]["payroll_id"], id.as_str());
    assert_eq!(result["rejected"][0]["code"], "INVALID_TRANSITION");
}

#[tokio::test]
async fn test_approve_unknown_id_rejected_individually() {
    let router = create_router_for_test();
    let (_, calculated) = calculate(&router, "emp_001").await;
    let id = calculated["record"]["id"].as_str().unwrap();
    let unknown = "00000000-0000-0000-0000-000000000000";

    let (status, result) = approve(&router, &[id, unknown]).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["approved"][0]["status"], "approved");
    assert_eq!(result["approved"][0]["approved_by"], "store_manager");
    assert_eq!(result["rejected"][0]["code"], "PAYROLL_NOT_FOUND");
}

#[tokio::test]
async fn test_recalculating_approved_period_is_locked() {
    let router = create_router_for_test();
    approved_reference_payroll(&router).await;

    let (status, result) = calculate(&router, "emp_001").await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(result["code"], "PAYROLL_LOCKED");
}

#[tokio::test]
async fn test_pay_before_approval_conflicts() {
    let router = create_router_for_test();
    let (_, calculated) = calculate(&router, "emp_001").await;
    let id = calculated["record"]["id"].as_str().unwrap();

    let (status, result) = pay(&router, id, "cash").await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(result["code"], "INVALID_TRANSITION");

    let (_, ledger) = send(&router, "GET", "/ledger", None).await;
    assert!(ledger["entries"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_pay_unknown_id_not_found() {
    let router = create_router_for_test();
    let (status, result) = pay(&router, "00000000-0000-0000-0000-000000000000", "cash").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(result["code"], "PAYROLL_NOT_FOUND");
}

// =============================================================================
// SECTION 3: Cash ledger
// =============================================================================

#[tokio::test]
async fn test_cash_payment_posts_to_ledger() {
    let router = create_router_for_test();
    let id = approved_reference_payroll(&router).await;

    let (status, paid) = pay(&router, &id, "cash").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(paid["status"], "paid");
    assert_eq!(paid["payment_method"], "cash");
    assert_eq!(paid["paid_date"], "2024-04-05");

    let (_, ledger) = send(&router, "GET", "/ledger", None).await;
    let entries = ledger["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["sequence"], 1);
    assert_eq!(entries[0]["direction"], "payment");
    assert_eq!(amount(&entries[0]["amount"]), decimal("8364808"));
    assert_eq!(amount(&entries[0]["balance_after"]), decimal("-8364808"));
    assert_eq!(entries[0]["reference"], id.as_str());

    let expenses = ledger["expenses"].as_array().unwrap();
    assert_eq!(expenses[0]["category"], "salary");
    assert_eq!(amount(&expenses[0]["amount"]), decimal("9346154"));
}

#[tokio::test]
async fn test_bank_transfer_not_posted() {
    let router = create_router_for_test();
    let id = approved_reference_payroll(&router).await;

    let (status, paid) = pay(&router, &id, "bank_transfer").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(paid["status"], "paid");

    let (_, ledger) = send(&router, "GET", "/ledger", None).await;
    assert!(ledger["entries"].as_array().unwrap().is_empty());
    assert_eq!(amount(&ledger["balance"]), Decimal::ZERO);
}

#[tokio::test]
async fn test_paying_twice_posts_once() {
    let router = create_router_for_test();
    let id = approved_reference_payroll(&router).await;

    let (first, _) = pay(&router, &id, "cash").await;
    let (second, result) = pay(&router, &id, "cash").await;

    assert_eq!(first, StatusCode::OK);
    assert_eq!(second, StatusCode::CONFLICT);
    assert_eq!(result["code"], "INVALID_TRANSITION");
    let (_, ledger) = send(&router, "GET", "/ledger", None).await;
    assert_eq!(ledger["entries"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_overdraft_rejection_leaves_record_approved() {
    let router = create_router_with_ledger(Some(LedgerConfig {
        opening_balance: decimal("5000000"),
        allow_overdraft: false,
    }));
    let id = approved_reference_payroll(&router).await;

    let (status, result) = pay(&router, &id, "cash").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(result["code"], "LEDGER_REJECTED");

    let (_, summary) = send(&router, "GET", "/payroll?month=3&year=2024", None).await;
    assert_eq!(summary["rows"][0]["status"], "approved");
    let (_, ledger) = send(&router, "GET", "/ledger", None).await;
    assert_eq!(amount(&ledger["balance"]), decimal("5000000"));
    assert!(ledger["expenses"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_receipt_then_salary_payment_running_balance() {
    let router = create_router_with_ledger(Some(LedgerConfig {
        opening_balance: decimal("1000000"),
        allow_overdraft: false,
    }));
    let (status, receipt) = send(
        &router,
        "POST",
        "/ledger/entries",
        Some(json!({
            "entry_date": "2024-04-05",
            "direction": "receipt",
            "amount": "10000000",
            "description": "Daily sales"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(amount(&receipt["balance_after"]), decimal("11000000"));

    let id = approved_reference_payroll(&router).await;
    let (status, _) = pay(&router, &id, "cash").await;
    assert_eq!(status, StatusCode::OK);

    let (_, ledger) = send(&router, "GET", "/ledger", None).await;
    let entries = ledger["entries"].as_array().unwrap();
    assert_eq!(entries[1]["sequence"], 2);
    assert_eq!(amount(&entries[1]["balance_after"]), decimal("2635192"));
    assert_eq!(amount(&ledger["balance"]), decimal("2635192"));
}

// =============================================================================
// SECTION 4: Reports
// =============================================================================

#[tokio::test]
async fn test_payroll_summary_totals() {
    let router = create_router_for_test();
    send(
        &router,
        "POST",
        "/payroll/calculate-all",
        Some(json!({ "month": 3, "year": 2024 })),
    )
    .await;

    let (status, summary) = send(&router, "GET", "/payroll?month=3&year=2024", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["status_counts"]["calculated"], 2);
    assert_eq!(summary["totals"]["employee_count"], 2);
    assert_eq!(amount(&summary["totals"]["gross_salary"]), decimal("49346154"));
    assert_eq!(amount(&summary["totals"]["pit"]), decimal("3310000"));
    assert_eq!(amount(&summary["totals"]["net_salary"]), decimal("40854808"));
}

#[tokio::test]
async fn test_salary_book_rows_and_totals() {
    let router = create_router_for_test();
    send(
        &router,
        "POST",
        "/payroll/calculate-all",
        Some(json!({ "month": 3, "year": 2024 })),
    )
    .await;

    let (status, book) = send(&router, "GET", "/payroll/salary-book?month=3&year=2024", None).await;

    assert_eq!(status, StatusCode::OK);
    let rows = book["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["stt"], 1);
    assert_eq!(rows[0]["name"], "Nguyen Van A");
    assert_eq!(rows[0]["position"], "Sales Associate");
    assert_eq!(rows[0]["working_days"], "23/26");
    assert_eq!(rows[1]["stt"], 2);
    assert_eq!(rows[1]["name"], "Tran Thi B");
    assert_eq!(rows[1]["working_days"], "26/26");

    let net_sum: Decimal = rows.iter().map(|r| amount(&r["net_salary"])).sum();
    assert_eq!(net_sum, amount(&book["totals"]["net_salary"]));
}

#[tokio::test]
async fn test_empty_period_has_zero_totals() {
    let router = create_router_for_test();
    let (status, book) = send(&router, "GET", "/payroll/salary-book?month=1&year=2024", None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(book["rows"].as_array().unwrap().is_empty());
    assert_eq!(amount(&book["totals"]["gross_salary"]), Decimal::ZERO);
}

// =============================================================================
// SECTION 5: Error cases
// =============================================================================

#[tokio::test]
async fn test_invalid_month_rejected() {
    let router = create_router_for_test();
    let (status, result) = send(
        &router,
        "POST",
        "/payroll/calculate",
        Some(json!({ "employee_id": "emp_001", "month": 13, "year": 2024 })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(result["code"], "INVALID_PERIOD");
}

#[tokio::test]
async fn test_inactive_employee_rejected() {
    let router = create_router_for_test();
    let (status, result) = calculate(&router, "emp_003").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(result["code"], "EMPLOYEE_INACTIVE");
}

#[tokio::test]
async fn test_empty_approval_rejected() {
    let router = create_router_for_test();
    let (status, result) = send(
        &router,
        "POST",
        "/payroll/approve",
        Some(json!({ "payroll_ids": [], "approved_by": "store_manager" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(result["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_unknown_payment_method_rejected() {
    let router = create_router_for_test();
    let id = approved_reference_payroll(&router).await;

    let (status, result) = pay(&router, &id, "cheque").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(result["code"], "MALFORMED_JSON");
}

#[tokio::test]
async fn test_negative_ledger_amount_rejected() {
    let router = create_router_for_test();
    let (status, result) = send(
        &router,
        "POST",
        "/ledger/entries",
        Some(json!({
            "entry_date": "2024-04-05",
            "direction": "payment",
            "amount": "-5",
            "description": "Bad"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(result["code"], "LEDGER_REJECTED");
}

#[tokio::test]
async fn test_ledger_balance_overflow_rejected() {
    let router = create_router_for_test();
    let receipt = json!({
        "entry_date": "2024-04-05",
        "direction": "receipt",
        "amount": "79228162514264337593543950335",
        "description": "Float"
    });

    let (status, _) = send(&router, "POST", "/ledger/entries", Some(receipt.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, result) = send(&router, "POST", "/ledger/entries", Some(receipt)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(result["code"], "LEDGER_REJECTED");

    let (_, ledger) = send(&router, "GET", "/ledger", None).await;
    assert_eq!(ledger["entries"].as_array().unwrap().len(), 1);
}
