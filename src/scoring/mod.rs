pub mod approval;
pub mod engine;

use serde::{Deserialize, Serialize};

use crate::config::LendingConfig;
use crate::decimal::{Money, Rate};
use crate::errors::Result;
use crate::payments::installment::monthly_installment;
use crate::records::Loan;

pub use approval::{ApprovalDecision, ApprovalEngine};
pub use engine::{CreditScorer, ScoreBreakdown, ScoreRequest};

/// loan terms as requested by the customer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoanApplication {
    pub loan_amount: Money,
    pub interest_rate: Rate,
    pub tenure: u32,
}

/// full underwriting result for one application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub breakdown: ScoreBreakdown,
    pub decision: ApprovalDecision,
    pub monthly_installment: Money,
}

/// scoring, tier lookup and installment pricing in one pass
pub struct Underwriter {
    scorer: CreditScorer,
    approval: ApprovalEngine,
}

impl Underwriter {
    pub fn new(config: &LendingConfig) -> Self {
        Self {
            scorer: CreditScorer::new(config.scoring.clone()),
            approval: ApprovalEngine::new(config.approval.clone()),
        }
    }

    pub fn assess(
        &self,
        history: &[Loan],
        application: &LoanApplication,
        approved_limit: Money,
        today: chrono::NaiveDate,
    ) -> Result<Assessment> {
        let breakdown = self.scorer.score(
            history,
            &ScoreRequest {
                loan_amount: application.loan_amount,
                approved_limit,
                today,
            },
        );
        let decision = self.approval.decide(breakdown.score, application.interest_rate);
        let monthly_installment = monthly_installment(
            application.loan_amount,
            decision.corrected_interest_rate,
            application.tenure,
        )?;

        Ok(Assessment {
            breakdown,
            decision,
            monthly_installment,
        })
    }
}
