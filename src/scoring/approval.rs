use serde::{Deserialize, Serialize};

use crate::config::{ApprovalPolicy, TierPricing};
use crate::decimal::Rate;
use crate::types::ApprovalStatus;

/// approval outcome with the rate the loan would carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalDecision {
    pub status: ApprovalStatus,
    pub corrected_interest_rate: Rate,
}

impl ApprovalDecision {
    pub fn rejected() -> Self {
        Self {
            status: ApprovalStatus::Rejected,
            corrected_interest_rate: Rate::ZERO,
        }
    }

    pub fn is_approved(&self) -> bool {
        self.status.is_approved()
    }
}

/// maps a score and requested rate onto an approval tier
pub struct ApprovalEngine {
    pub policy: ApprovalPolicy,
}

impl ApprovalEngine {
    pub fn new(policy: ApprovalPolicy) -> Self {
        Self { policy }
    }

    /// first tier whose floor the score clears wins
    pub fn decide(&self, score: i32, requested_rate: Rate) -> ApprovalDecision {
        let Some(tier) = self.policy.tiers.iter().find(|tier| score > tier.score_above) else {
            return ApprovalDecision::rejected();
        };

        let corrected_interest_rate = match tier.pricing {
            TierPricing::Preferential { fallback } => {
                if requested_rate <= self.policy.preferential_rate_ceiling {
                    requested_rate
                } else {
                    fallback
                }
            }
            TierPricing::Fixed(rate) => rate,
        };

        ApprovalDecision {
            status: ApprovalStatus::Approved,
            corrected_interest_rate,
        }
    }
}

impl Default for ApprovalEngine {
    fn default() -> Self {
        Self::new(ApprovalPolicy::default())
    }
}
