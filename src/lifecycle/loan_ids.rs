use rand::Rng;

use crate::errors::{LendingError, Result};
use crate::records::Loan;
use crate::store::LoanStore;
use crate::types::{LoanId, LOAN_ID_MAX, LOAN_ID_MIN};

/// supplies candidate loan ids; uniqueness is checked against the store
pub trait LoanIdSource: Send + Sync {
    fn candidate(&self) -> LoanId;
}

/// uniform draw from the four-digit range
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomLoanIds;

impl LoanIdSource for RandomLoanIds {
    fn candidate(&self) -> LoanId {
        rand::thread_rng().gen_range(LOAN_ID_MIN..=LOAN_ID_MAX)
    }
}

/// persist a loan under the first free candidate id, giving up after `attempts` draws
pub async fn insert_with_fresh_id<F>(
    loans: &LoanStore,
    ids: &dyn LoanIdSource,
    attempts: u32,
    build: F,
) -> Result<Loan>
where
    F: Fn(LoanId) -> Loan,
{
    for attempt in 1..=attempts {
        let loan_id = ids.candidate();

        if loans.exists(loan_id).await? {
            tracing::warn!(loan_id, attempt, "loan id collision");
            continue;
        }

        let loan = build(loan_id);
        match loans.insert(&loan).await {
            Ok(()) => return Ok(loan),
            // lost a race for the same id between the check and the insert
            Err(LendingError::DuplicateLoanId { .. }) => {
                tracing::warn!(loan_id, attempt, "loan id taken concurrently");
            }
            Err(e) => return Err(e),
        }
    }

    Err(LendingError::LoanIdsExhausted { attempts })
}
