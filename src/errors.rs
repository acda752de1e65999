use thiserror::Error;

use crate::types::{CustomerId, LoanId};

#[derive(Error, Debug)]
pub enum LendingError {
    #[error("invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("customer not found: {customer_id}")]
    CustomerNotFound {
        customer_id: CustomerId,
    },

    #[error("loan not found: {loan_id}")]
    LoanNotFound {
        loan_id: LoanId,
    },

    #[error("loan {loan_id} not found for customer {customer_id}")]
    CustomerLoanNotFound {
        customer_id: CustomerId,
        loan_id: LoanId,
    },

    #[error("loan id {loan_id} already taken")]
    DuplicateLoanId {
        loan_id: LoanId,
    },

    #[error("no free loan id after {attempts} attempts")]
    LoanIdsExhausted {
        attempts: u32,
    },

    #[error("corrupt {table} record: {message}")]
    CorruptRecord {
        table: &'static str,
        message: String,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    #[error("store error: {0}")]
    Store(#[from] sqlx::Error),
}

impl LendingError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        LendingError::Validation {
            field,
            message: message.into(),
        }
    }

    /// true for the "row is absent" family
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            LendingError::CustomerNotFound { .. }
                | LendingError::LoanNotFound { .. }
                | LendingError::CustomerLoanNotFound { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, LendingError>;
