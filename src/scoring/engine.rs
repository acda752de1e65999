use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::config::ScoringPolicy;
use crate::decimal::Money;
use crate::records::Loan;

/// lower and upper bound of a reported score
pub const SCORE_FLOOR: i32 = 0;
pub const SCORE_CEILING: i32 = 100;

/// a proposed loan scored against the customer's history
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreRequest {
    pub loan_amount: Money,
    pub approved_limit: Money,
    pub today: NaiveDate,
}

/// itemised scoring result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ScoreBreakdown {
    pub base: i32,
    pub delinquent_loans: u32,
    pub delinquency_deduction: i32,
    pub loan_count_deduction: i32,
    pub recent_enquiries: u32,
    pub recent_enquiry_deduction: i32,
    pub large_loan_deduction: i32,
    /// requested amount above the approved limit
    pub over_limit: bool,
    /// existing EMIs above the allowed share of the limit
    pub over_exposed: bool,
    /// score before clamping, may be negative
    pub raw_score: i32,
    pub score: i32,
}

/// credit scoring engine
pub struct CreditScorer {
    pub policy: ScoringPolicy,
}

impl CreditScorer {
    pub fn new(policy: ScoringPolicy) -> Self {
        Self { policy }
    }

    /// score a proposed loan; an empty history yields no history deductions
    pub fn score(&self, history: &[Loan], request: &ScoreRequest) -> ScoreBreakdown {
        let policy = &self.policy;
        let mut breakdown = ScoreBreakdown {
            base: policy.base_score,
            ..ScoreBreakdown::default()
        };

        breakdown.delinquent_loans = history
            .iter()
            .filter(|loan| loan.is_behind_schedule(request.today))
            .count() as u32;
        breakdown.delinquency_deduction =
            policy.delinquent_loan_penalty * breakdown.delinquent_loans as i32;

        if history.len() > policy.max_loans_without_penalty {
            breakdown.loan_count_deduction = policy.loan_count_penalty;
        }

        breakdown.recent_enquiries = history
            .iter()
            .filter(|loan| loan.started_in_year(request.today.year()))
            .count() as u32;
        breakdown.recent_enquiry_deduction =
            policy.recent_enquiry_penalty * breakdown.recent_enquiries as i32;

        if request.loan_amount > policy.large_loan_threshold {
            breakdown.large_loan_deduction = policy.large_loan_penalty;
        }

        breakdown.over_limit = request.loan_amount > request.approved_limit;

        let pending_emis: Money = history.iter().map(|loan| loan.monthly_payment).sum();
        let exposure_cap = Money::from_decimal(
            request.approved_limit.as_decimal().saturating_mul(policy.max_exposure_ratio),
        );
        breakdown.over_exposed = pending_emis > exposure_cap;

        breakdown.raw_score = if breakdown.over_limit || breakdown.over_exposed {
            0
        } else {
            breakdown.base
                - breakdown.delinquency_deduction
                - breakdown.loan_count_deduction
                - breakdown.recent_enquiry_deduction
                - breakdown.large_loan_deduction
        };
        breakdown.score = breakdown.raw_score.clamp(SCORE_FLOOR, SCORE_CEILING);

        breakdown
    }
}

impl Default for CreditScorer {
    fn default() -> Self {
        Self::new(ScoringPolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::Rate;
    use crate::records::loan_end_date;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn loan(start: NaiveDate, emis_on_time: u32, monthly_payment: i64) -> Loan {
        Loan {
            loan_id: 1000,
            customer_id: 1,
            loan_amount: Money::from_major(120_000),
            interest_rate: Rate::from_percentage(12),
            tenure: 12,
            monthly_payment: Money::from_major(monthly_payment),
            start_date: start,
            end_date: loan_end_date(start, 12).unwrap(),
            emis_on_time,
        }
    }

    fn request(loan_amount: i64, approved_limit: i64) -> ScoreRequest {
        ScoreRequest {
            loan_amount: Money::from_major(loan_amount),
            approved_limit: Money::from_major(approved_limit),
            today: date(2024, 6, 15),
        }
    }

    #[test]
    fn test_empty_history_scores_full() {
        let breakdown = CreditScorer::default().score(&[], &request(500_000, 1_800_000));

        assert_eq!(breakdown.score, 100);
        assert_eq!(breakdown.delinquent_loans, 0);
        assert_eq!(breakdown.recent_enquiries, 0);
        assert!(!breakdown.over_limit);
        assert!(!breakdown.over_exposed);
    }

    #[test]
    fn test_deductions_stack() {
        // behind by several months, started last year
        let late = loan(date(2023, 6, 1), 2, 10_000);
        // started this year, on schedule
        let fresh = loan(date(2024, 5, 1), 1, 10_000);

        let breakdown = CreditScorer::default().score(&[late, fresh], &request(1_200_000, 1_800_000));

        assert_eq!(breakdown.delinquency_deduction, 20);
        assert_eq!(breakdown.recent_enquiry_deduction, 3);
        assert_eq!(breakdown.large_loan_deduction, 5);
        assert_eq!(breakdown.loan_count_deduction, 0);
        assert_eq!(breakdown.score, 100 - 20 - 3 - 5);
    }

    #[test]
    fn test_delinquency_uses_each_loans_own_count() {
        let on_time = loan(date(2024, 1, 10), 5, 1_000);
        let behind = loan(date(2024, 1, 10), 2, 1_000);

        let breakdown = CreditScorer::default().score(&[on_time, behind], &request(100_000, 1_800_000));

        assert_eq!(breakdown.delinquent_loans, 1);
    }

    #[test]
    fn test_many_loans_penalised_once() {
        let history: Vec<Loan> = (0..6).map(|_| loan(date(2022, 3, 1), 40, 1_000)).collect();

        let breakdown = CreditScorer::default().score(&history, &request(100_000, 1_800_000));

        assert_eq!(breakdown.loan_count_deduction, 10);
        assert_eq!(breakdown.score, 90);
    }

    #[test]
    fn test_over_limit_forces_zero() {
        let breakdown = CreditScorer::default().score(&[], &request(2_000_000, 1_800_000));

        assert!(breakdown.over_limit);
        assert_eq!(breakdown.score, 0);
    }

    #[test]
    fn test_exposure_forces_zero() {
        // 2 × 500k EMIs against a 1.8M limit exceed the 900k cap
        let history = vec![loan(date(2022, 1, 1), 99, 500_000), loan(date(2022, 1, 1), 99, 500_000)];

        let breakdown = CreditScorer::default().score(&history, &request(100_000, 1_800_000));

        assert!(breakdown.over_exposed);
        assert_eq!(breakdown.score, 0);
    }

    #[test]
    fn test_score_clamped_at_zero() {
        let history: Vec<Loan> = (0..7).map(|_| loan(date(2024, 1, 1), 1, 1_000)).collect();

        let breakdown = CreditScorer::default().score(&history, &request(100_000, 1_800_000));

        // 100 - 7×20 - 10 - 7×3
        assert_eq!(breakdown.raw_score, -71);
        assert_eq!(breakdown.score, 0);
    }
}
