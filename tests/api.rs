use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{TimeZone, Utc};
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use tower::ServiceExt;

use loan_lifecycle_rs::http::{router, AppState};
use loan_lifecycle_rs::lifecycle::LoanIdSource;
use loan_lifecycle_rs::{
    Decimal, LendingConfig, LoanId, LoanLifecycleService, SafeTimeProvider, Stores, TimeSource,
};

/// replays one loan id forever
struct SameLoanId(LoanId);

impl LoanIdSource for SameLoanId {
    fn candidate(&self) -> LoanId {
        self.0
    }
}

async fn service() -> LoanLifecycleService {
    let stores = Stores::in_memory().await.unwrap();
    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 6, 15, 9, 0, 0).unwrap(),
    ));
    LoanLifecycleService::new(stores, LendingConfig::default(), time).unwrap()
}

async fn app() -> Router {
    router(AppState::new(service().await))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

fn decimal(value: &Value) -> Decimal {
    value.as_str().unwrap().parse().unwrap()
}

fn applicant(salary: u64) -> Value {
    json!({
        "first_name": "Anita",
        "last_name": "Desai",
        "age": 30,
        "phone_number": "9811122233",
        "monthly_salary": salary,
    })
}

async fn register(app: &Router, salary: u64) -> i64 {
    let (_, body) = send(app, "POST", "/api/auth/register", Some(applicant(salary))).await;
    body["data"]["customer_id"].as_i64().unwrap()
}

async fn create_loan(app: &Router, customer_id: i64, amount: u64) -> (StatusCode, Value) {
    send(
        app,
        "POST",
        "/api/auth/create-loan",
        Some(json!({
            "customer_id": customer_id,
            "loan_amount": amount,
            "interest_rate": 10,
            "tenure": 12,
        })),
    )
    .await
}

#[tokio::test]
async fn test_health() {
    let app = app().await;
    let (status, body) = send(&app, "GET", "/", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], "Server is Ready");
}

#[tokio::test]
async fn test_register_creates_then_updates() {
    let app = app().await;

    let (status, created) = send(&app, "POST", "/api/auth/register", Some(applicant(50_000))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["message"], "User Anita Desai created successfully");
    assert_eq!(created["data"]["name"], "Anita Desai");
    assert_eq!(decimal(&created["data"]["approved_limit"]), dec!(1800000));

    let (status, updated) = send(&app, "POST", "/api/auth/register", Some(applicant(75_000))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["message"], "User Anita Desai updated successfully");
    assert_eq!(updated["data"]["customer_id"], created["data"]["customer_id"]);
    assert_eq!(decimal(&updated["data"]["approved_limit"]), dec!(2700000));
}

#[tokio::test]
async fn test_check_eligibility() {
    let app = app().await;
    let customer_id = register(&app, 50_000).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/check-eligibility",
        Some(json!({
            "customer_id": customer_id,
            "loan_amount": 100000,
            "interest_rate": 14,
            "tenure": 12,
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    let data = &body["data"];
    assert_eq!(data["approval"], "Approved");
    assert_eq!(data["credit_score"], 100);
    assert_eq!(decimal(&data["interest_rate"]), dec!(14));
    assert_eq!(decimal(&data["corrected_interest_rate"]), dec!(10));
    assert_eq!(decimal(&data["monthly_installment"]), dec!(9166.67));
}

#[tokio::test]
async fn test_check_eligibility_unknown_customer() {
    let app = app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/check-eligibility",
        Some(json!({
            "customer_id": 77,
            "loan_amount": 100000,
            "interest_rate": 10,
            "tenure": 12,
        })),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Customer not found");
}

#[tokio::test]
async fn test_create_and_view_loan() {
    let app = app().await;
    let customer_id = register(&app, 50_000).await;

    let (status, created) = create_loan(&app, customer_id, 100_000).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["data"]["loan_approved"], true);
    let loan_id = created["data"]["loan_id"].as_i64().unwrap();
    assert!((1000..=9999).contains(&loan_id));

    let (status, view) = send(&app, "GET", &format!("/api/auth/view-loan/{loan_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["data"]["loan_id"], loan_id);
    assert_eq!(view["data"]["customer"]["customer_id"], customer_id);
    assert_eq!(decimal(&view["data"]["monthly_installment"]), dec!(9166.67));
    assert_eq!(view["data"]["tenure"], 12);
}

#[tokio::test]
async fn test_create_loan_rejected_over_limit() {
    let app = app().await;
    let customer_id = register(&app, 10_000).await;

    let (status, body) = create_loan(&app, customer_id, 900_000).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Loan not approved");
    assert_eq!(body["data"]["loan_approved"], false);
    assert!(body["data"]["loan_id"].is_null());
}

#[tokio::test]
async fn test_view_loan_bad_and_missing_ids() {
    let app = app().await;

    let (status, body) = send(&app, "GET", "/api/auth/view-loan/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid loan_id provided");

    let (status, _) = send(&app, "GET", "/api/auth/view-loan/0", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, "GET", "/api/auth/view-loan/4321", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Loan not found");
}

#[tokio::test]
async fn test_payments_and_statement() {
    let app = app().await;
    let customer_id = register(&app, 50_000).await;
    let (_, created) = create_loan(&app, customer_id, 100_000).await;
    let loan_id = created["data"]["loan_id"].as_i64().unwrap();
    let payment_uri = format!("/api/auth/make-payment/{customer_id}/{loan_id}");

    let (status, partial) = send(&app, "GET", &payment_uri, Some(json!({ "amountPaid": 5000 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(partial["message"], "Payment successful");
    assert_eq!(decimal(&partial["data"]["pending_emi_balance"]), dec!(4166.67));
    assert!(partial["data"]["emis_on_time"].is_null());

    let (status, full) = send(&app, "POST", &payment_uri, Some(json!({ "amount_paid": "9166.67" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decimal(&full["data"]["pending_emi_balance"]), Decimal::ZERO);
    assert_eq!(full["data"]["emis_on_time"], 1);

    let (status, statement) = send(
        &app,
        "GET",
        &format!("/api/auth/view-statement/{customer_id}/{loan_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(statement["loan_details"]["loan_id"], loan_id);
    assert_eq!(statement["loan_details"]["emis_on_time"], 1);
    let history = statement["payment_history"].as_array().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(decimal(&history[0]["amount_paid"]), dec!(5000));
}

#[tokio::test]
async fn test_statement_and_payment_for_wrong_customer() {
    let app = app().await;
    let customer_id = register(&app, 50_000).await;
    let (_, created) = create_loan(&app, customer_id, 100_000).await;
    let loan_id = created["data"]["loan_id"].as_i64().unwrap();
    let stranger = customer_id + 1;

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/auth/view-statement/{stranger}/{loan_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Loan not found for the customer");

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/auth/make-payment/{stranger}/{loan_id}"),
        Some(json!({ "amount_paid": 100 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let app = app().await;
    let mut body = applicant(50_000);
    body["age"] = json!(-3);

    let (status, body) = send(&app, "POST", "/api/auth/register", Some(body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid request body provided");

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/create-loan",
        Some(json!({ "customer_id": 1, "loan_amount": "lots" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_unrepresentable_salary_is_bad_request() {
    let app = app().await;
    let mut body = applicant(0);
    body["monthly_salary"] = json!("5000000000000000000000000000");

    let (status, body) = send(&app, "POST", "/api/auth/register", Some(body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid monthly_salary provided");
}

#[tokio::test]
async fn test_unrepresentable_installment_is_bad_request() {
    let app = app().await;
    let mut body = applicant(0);
    body["monthly_salary"] = json!("2000000000000000000000000000");
    let (status, registered) = send(&app, "POST", "/api/auth/register", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    let customer_id = registered["data"]["customer_id"].as_i64().unwrap();

    // approved on score, then (P × R / 100 + P) overflows
    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/create-loan",
        Some(json!({
            "customer_id": customer_id,
            "loan_amount": "70000000000000000000000000000",
            "interest_rate": "-50000000000000000000000000000",
            "tenure": 12,
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid loan_amount provided");
}

#[tokio::test]
async fn test_create_loan_when_ids_run_out() {
    let service = service().await.with_loan_ids(Arc::new(SameLoanId(2468)));
    let app = router(AppState::new(service));
    let customer_id = register(&app, 50_000).await;

    let (status, first) = create_loan(&app, customer_id, 100_000).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["data"]["loan_id"], 2468);

    let (status, body) = create_loan(&app, customer_id, 100_000).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Loan creation failed");
}
