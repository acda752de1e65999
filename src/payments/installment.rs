use rust_decimal::Decimal;

use crate::decimal::{Money, Rate};
use crate::errors::{LendingError, Result};

/// simple interest over the whole tenure, spread evenly:
/// (P × R / 100 + P) / T, rounded to cents
pub fn monthly_installment(principal: Money, annual_rate: Rate, tenure_months: u32) -> Result<Money> {
    if tenure_months == 0 {
        return Err(LendingError::validation("tenure", "must be at least one month"));
    }

    let p = principal.as_decimal();
    p.checked_mul(annual_rate.as_decimal())
        .and_then(|interest| interest.checked_add(p))
        .and_then(|total_repayable| total_repayable.checked_div(Decimal::from(tenure_months)))
        .map(Money::from_decimal)
        .ok_or_else(|| LendingError::validation("loan_amount", "out of range"))
}
