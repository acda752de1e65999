//! HTTP surface mounted under `/api/auth`

pub mod error;
pub mod extract;
pub mod handlers;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::lifecycle::LoanLifecycleService;

pub use error::ApiError;
pub use extract::ApiJson;

/// prefix every lending route is nested under
pub const API_PREFIX: &str = "/api/auth";

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<LoanLifecycleService>,
}

impl AppState {
    pub fn new(service: LoanLifecycleService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let lending = Router::new()
        .route("/register", post(handlers::register))
        .route("/check-eligibility", post(handlers::check_eligibility))
        .route("/create-loan", post(handlers::create_loan))
        .route("/view-loan/:loan_id", get(handlers::view_loan))
        .route(
            "/make-payment/:customer_id/:loan_id",
            get(handlers::make_payment).post(handlers::make_payment),
        )
        .route("/view-statement/:customer_id/:loan_id", get(handlers::view_statement));

    Router::new()
        .route("/", get(handlers::health))
        .nest(API_PREFIX, lending)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
