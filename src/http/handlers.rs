use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::decimal::{Money, Rate};
use crate::http::error::{ApiError, UNEXPECTED};
use crate::http::extract::ApiJson;
use crate::http::AppState;
use crate::lifecycle::LoanCreation;
use crate::records::{Customer, CustomerProfile};
use crate::scoring::LoanApplication;
use crate::types::{parse_positive_id, ApprovalStatus, CustomerId, LoanId};

type ApiResult<T> = std::result::Result<T, ApiError>;

/// `{message, data}` success envelope
#[derive(Serialize)]
pub struct Envelope<T> {
    pub message: String,
    pub data: T,
}

impl<T: Serialize> Envelope<T> {
    pub fn new(message: impl Into<String>, data: T) -> Json<Self> {
        Json(Self {
            message: message.into(),
            data,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub age: u32,
    pub phone_number: String,
    pub monthly_salary: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct LoanRequest {
    pub customer_id: CustomerId,
    pub loan_amount: Decimal,
    pub interest_rate: Decimal,
    pub tenure: u32,
}

impl LoanRequest {
    fn application(&self) -> LoanApplication {
        LoanApplication {
            loan_amount: Money::from_decimal(self.loan_amount),
            interest_rate: Rate::from_percentage_decimal(self.interest_rate),
            tenure: self.tenure,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PaymentRequest {
    #[serde(alias = "amountPaid")]
    pub amount_paid: Decimal,
}

#[derive(Debug, Serialize)]
pub struct CustomerData {
    pub customer_id: CustomerId,
    pub name: String,
    pub age: u32,
    pub phone_number: String,
    pub monthly_salary: Money,
    pub approved_limit: Money,
}

impl From<Customer> for CustomerData {
    fn from(customer: Customer) -> Self {
        Self {
            name: customer.full_name(),
            customer_id: customer.customer_id,
            age: customer.age,
            phone_number: customer.phone_number,
            monthly_salary: customer.monthly_salary,
            approved_limit: customer.approved_limit,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EligibilityData {
    pub customer_id: CustomerId,
    pub approval: ApprovalStatus,
    pub credit_score: i32,
    pub interest_rate: Rate,
    pub corrected_interest_rate: Rate,
    pub tenure: u32,
    pub monthly_installment: Money,
}

#[derive(Debug, Serialize)]
pub struct LoanCreatedData {
    pub loan_id: Option<LoanId>,
    pub customer_id: CustomerId,
    pub loan_approved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corrected_interest_rate: Option<Rate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_installment: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PaymentData {
    pub pending_emi_balance: Money,
    pub total_paid: Money,
    pub emis_on_time: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct LoanData {
    pub loan_id: LoanId,
    pub customer: Option<Customer>,
    pub loan_amount: Money,
    pub interest_rate: Rate,
    pub monthly_installment: Money,
    pub tenure: u32,
}

pub async fn health() -> impl IntoResponse {
    Json(json!({ "data": "Server is Ready" }))
}

pub async fn register(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    let profile = CustomerProfile {
        first_name: body.first_name,
        last_name: body.last_name,
        age: body.age,
        phone_number: body.phone_number,
        monthly_salary: Money::from_decimal(body.monthly_salary),
    };

    let registration = state
        .service
        .register(profile)
        .await
        .map_err(ApiError::or("Registration failed"))?;

    let name = registration.customer.full_name();
    let (status, verb) = if registration.created {
        (StatusCode::CREATED, "created")
    } else {
        (StatusCode::OK, "updated")
    };

    Ok((
        status,
        Envelope::new(
            format!("User {name} {verb} successfully"),
            CustomerData::from(registration.customer),
        ),
    ))
}

pub async fn check_eligibility(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoanRequest>,
) -> ApiResult<impl IntoResponse> {
    let eligibility = state
        .service
        .check_eligibility(body.customer_id, body.application())
        .await
        .map_err(ApiError::or("Application failed"))?;

    let assessment = eligibility.assessment;
    Ok((
        StatusCode::CREATED,
        Envelope::new(
            "Application submitted successfully",
            EligibilityData {
                customer_id: eligibility.customer_id,
                approval: assessment.decision.status,
                credit_score: assessment.breakdown.score,
                interest_rate: eligibility.requested_interest_rate,
                corrected_interest_rate: assessment.decision.corrected_interest_rate,
                tenure: eligibility.tenure,
                monthly_installment: assessment.monthly_installment,
            },
        ),
    ))
}

pub async fn create_loan(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoanRequest>,
) -> ApiResult<impl IntoResponse> {
    let creation = state
        .service
        .create_loan(body.customer_id, body.application())
        .await
        .map_err(ApiError::or("Loan creation failed"))?;

    let response = match creation {
        LoanCreation::Approved { loan, .. } => (
            StatusCode::CREATED,
            Envelope::new(
                "Loan approved and created successfully",
                LoanCreatedData {
                    loan_id: Some(loan.loan_id),
                    customer_id: loan.customer_id,
                    loan_approved: true,
                    corrected_interest_rate: Some(loan.interest_rate),
                    monthly_installment: Some(loan.monthly_payment),
                    message: None,
                },
            ),
        ),
        LoanCreation::Rejected { customer_id, .. } => (
            StatusCode::OK,
            Envelope::new(
                "Loan not approved",
                LoanCreatedData {
                    loan_id: None,
                    customer_id,
                    loan_approved: false,
                    corrected_interest_rate: None,
                    monthly_installment: None,
                    message: Some("Loan not approved due to low credit score".to_string()),
                },
            ),
        ),
    };

    Ok(response)
}

pub async fn view_loan(
    State(state): State<AppState>,
    Path(loan_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let loan_id = parse_positive_id("loan_id", &loan_id)?;
    let view = state.service.view_loan(loan_id).await?;

    Ok(Envelope::new(
        "Successfully retrieved loan details!",
        LoanData {
            loan_id: view.loan.loan_id,
            customer: view.customer,
            loan_amount: view.loan.loan_amount,
            interest_rate: view.loan.interest_rate,
            monthly_installment: view.loan.monthly_payment,
            tenure: view.loan.tenure,
        },
    ))
}

pub async fn make_payment(
    State(state): State<AppState>,
    Path((customer_id, loan_id)): Path<(String, String)>,
    ApiJson(body): ApiJson<PaymentRequest>,
) -> ApiResult<impl IntoResponse> {
    let customer_id = parse_positive_id("customer_id", &customer_id)?;
    let loan_id = parse_positive_id("loan_id", &loan_id)?;

    let outcome = state
        .service
        .make_payment(customer_id, loan_id, Money::from_decimal(body.amount_paid))
        .await
        .map_err(ApiError::or(UNEXPECTED))?;

    Ok(Envelope::new(
        "Payment successful",
        PaymentData {
            pending_emi_balance: outcome.pending_emi_balance,
            total_paid: outcome.total_paid,
            emis_on_time: outcome.emis_on_time,
        },
    ))
}

pub async fn view_statement(
    State(state): State<AppState>,
    Path((customer_id, loan_id)): Path<(String, String)>,
) -> ApiResult<impl IntoResponse> {
    let customer_id = parse_positive_id("customer_id", &customer_id)?;
    let loan_id = parse_positive_id("loan_id", &loan_id)?;

    let statement = state.service.view_statement(customer_id, loan_id).await?;
    Ok(Json(statement))
}
