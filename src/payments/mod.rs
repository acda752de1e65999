pub mod installment;

use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::records::{Loan, Payment};

pub use installment::monthly_installment;

/// what a single installment payment changed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentOutcome {
    pub payment: Payment,
    /// current EMI minus this payment, never below zero
    pub pending_emi_balance: Money,
    pub total_paid: Money,
    /// new on-time count, `None` when the total covers no full EMI yet
    pub emis_on_time: Option<u32>,
}

/// loan together with its full payment history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    pub loan_details: Loan,
    pub payment_history: Vec<Payment>,
}

impl Statement {
    pub fn total_paid(&self) -> Money {
        self.payment_history.iter().map(|p| p.amount_paid).sum()
    }
}

/// balance left on the current installment after `amount_paid`
pub fn pending_emi_balance(current_emi: Money, amount_paid: Money) -> Money {
    current_emi.saturating_sub(amount_paid).max(Money::ZERO)
}

/// full EMIs covered by everything paid so far
pub fn emis_covered(total_paid: Money, current_emi: Money) -> Option<u32> {
    match total_paid.whole_multiples_of(current_emi) {
        0 => None,
        n => Some(n),
    }
}
