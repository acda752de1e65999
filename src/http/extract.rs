use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;

use crate::errors::LendingError;
use crate::http::error::ApiError;

/// JSON body whose rejections render as a 400 `{error}` body
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::from(LendingError::validation("request body", rejection.body_text()))
    }
}
