use std::net::SocketAddr;

use clap::Parser;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::{LendingError, Result};

/// lending configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LendingConfig {
    pub scoring: ScoringPolicy,
    pub approval: ApprovalPolicy,
    pub limits: LimitPolicy,
    /// random draws tried before loan creation gives up
    pub loan_id_attempts: u32,
}

/// credit score deductions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringPolicy {
    pub base_score: i32,
    /// per loan whose on-time EMI count trails its age in months
    pub delinquent_loan_penalty: i32,
    /// loan count above which `loan_count_penalty` applies
    pub max_loans_without_penalty: usize,
    pub loan_count_penalty: i32,
    /// per loan started in the current calendar year
    pub recent_enquiry_penalty: i32,
    pub large_loan_threshold: Money,
    pub large_loan_penalty: i32,
    /// fraction of the approved limit existing EMIs may consume
    pub max_exposure_ratio: Decimal,
}

/// approval tiers, checked from the highest floor down
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalPolicy {
    pub tiers: Vec<ApprovalTier>,
    /// requested rates up to this ceiling are honoured in the preferential tier
    pub preferential_rate_ceiling: Rate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalTier {
    /// score must be strictly greater than this
    pub score_above: i32,
    pub pricing: TierPricing,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TierPricing {
    /// keep the requested rate when at or below the ceiling, else charge `fallback`
    Preferential { fallback: Rate },
    /// charge a fixed rate regardless of the request
    Fixed(Rate),
}

/// approved limit derivation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitPolicy {
    pub salary_multiplier: Decimal,
    pub rounding_unit: Money,
}

impl Default for LendingConfig {
    fn default() -> Self {
        Self {
            scoring: ScoringPolicy::default(),
            approval: ApprovalPolicy::default(),
            limits: LimitPolicy::default(),
            loan_id_attempts: 64,
        }
    }
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            base_score: 100,
            delinquent_loan_penalty: 20,
            max_loans_without_penalty: 5,
            loan_count_penalty: 10,
            recent_enquiry_penalty: 3,
            large_loan_threshold: Money::from_major(1_000_000),
            large_loan_penalty: 5,
            max_exposure_ratio: dec!(0.5),
        }
    }
}

impl Default for ApprovalPolicy {
    fn default() -> Self {
        Self {
            tiers: vec![
                ApprovalTier {
                    score_above: 50,
                    pricing: TierPricing::Preferential {
                        fallback: Rate::from_percentage(10),
                    },
                },
                ApprovalTier {
                    score_above: 30,
                    pricing: TierPricing::Fixed(Rate::from_percentage(12)),
                },
                ApprovalTier {
                    score_above: 10,
                    pricing: TierPricing::Fixed(Rate::from_percentage(16)),
                },
            ],
            preferential_rate_ceiling: Rate::from_percentage(11),
        }
    }
}

impl Default for LimitPolicy {
    fn default() -> Self {
        Self {
            salary_multiplier: dec!(36),
            rounding_unit: Money::from_major(100_000),
        }
    }
}

impl LendingConfig {
    /// reject configurations the engine cannot evaluate
    pub fn validate(&self) -> Result<()> {
        if self.loan_id_attempts == 0 {
            return Err(LendingError::InvalidConfiguration {
                message: "loan_id_attempts must be at least 1".to_string(),
            });
        }

        if self.limits.rounding_unit.as_decimal() <= Decimal::ZERO {
            return Err(LendingError::InvalidConfiguration {
                message: "limit rounding unit must be positive".to_string(),
            });
        }

        if self.scoring.max_exposure_ratio < Decimal::ZERO {
            return Err(LendingError::InvalidConfiguration {
                message: "max exposure ratio cannot be negative".to_string(),
            });
        }

        let descending = self
            .approval
            .tiers
            .windows(2)
            .all(|pair| pair[0].score_above > pair[1].score_above);
        if !descending {
            return Err(LendingError::InvalidConfiguration {
                message: "approval tiers must be ordered by descending score floor".to_string(),
            });
        }

        Ok(())
    }
}

/// process-level settings, from flags or the environment
#[derive(Debug, Clone, Parser)]
#[command(name = "loan-lifecycle")]
#[command(about = "Loan management backend", long_about = None)]
pub struct ServerConfig {
    /// Address the HTTP server binds to
    #[arg(long, env = "LENDING_BIND", default_value = "127.0.0.1:8080")]
    pub bind: SocketAddr,

    /// SQLite connection string
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite:lending.db?mode=rwc")]
    pub database_url: String,

    /// Maximum pooled store connections
    #[arg(long, env = "DATABASE_MAX_CONNECTIONS", default_value_t = 5)]
    pub max_connections: u32,

    /// Random loan id draws before loan creation fails
    #[arg(long, env = "LOAN_ID_ATTEMPTS", default_value_t = 64)]
    pub loan_id_attempts: u32,
}

impl ServerConfig {
    /// lending configuration with the overrides carried by these settings
    pub fn lending_config(&self) -> LendingConfig {
        LendingConfig {
            loan_id_attempts: self.loan_id_attempts,
            ..LendingConfig::default()
        }
    }
}
