use serde::{Deserialize, Serialize};

use crate::errors::{LendingError, Result};

/// store-generated customer identifier
pub type CustomerId = i64;

/// four-digit loan identifier
pub type LoanId = i64;

/// smallest and largest loan id handed out
pub const LOAN_ID_MIN: LoanId = 1000;
pub const LOAN_ID_MAX: LoanId = 9999;

/// outcome of the approval tier lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApprovalStatus {
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub fn is_approved(&self) -> bool {
        matches!(self, ApprovalStatus::Approved)
    }
}

/// parse a path segment into a positive identifier
pub fn parse_positive_id(field: &'static str, raw: &str) -> Result<i64> {
    match raw.trim().parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(LendingError::validation(
            field,
            format!("expected a positive integer, got {raw:?}"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_positive_id() {
        assert_eq!(parse_positive_id("loan_id", "4821").unwrap(), 4821);
        assert_eq!(parse_positive_id("loan_id", " 12 ").unwrap(), 12);
        assert!(parse_positive_id("loan_id", "0").is_err());
        assert!(parse_positive_id("loan_id", "-3").is_err());
        assert!(parse_positive_id("loan_id", "abc").is_err());
        assert!(parse_positive_id("loan_id", "").is_err());
    }
}
