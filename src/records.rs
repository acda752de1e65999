use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};
use rust_decimal::RoundingStrategy;
use serde::{Deserialize, Serialize};

use crate::config::LimitPolicy;
use crate::decimal::{Money, Rate};
use crate::errors::{LendingError, Result};
use crate::types::{CustomerId, LoanId};

/// registered customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub customer_id: CustomerId,
    pub first_name: String,
    pub last_name: String,
    pub age: u32,
    pub phone_number: String,
    pub monthly_salary: Money,
    pub approved_limit: Money,
}

impl Customer {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// registration input; the identity is (first_name, last_name, phone_number)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerProfile {
    pub first_name: String,
    pub last_name: String,
    pub age: u32,
    pub phone_number: String,
    pub monthly_salary: Money,
}

impl CustomerProfile {
    /// true when salary or age differ from the stored row
    pub fn differs_from(&self, customer: &Customer) -> bool {
        self.monthly_salary != customer.monthly_salary || self.age != customer.age
    }
}

/// round(multiplier × salary / unit) × unit, half away from zero
pub fn approved_limit(monthly_salary: Money, policy: &LimitPolicy) -> Result<Money> {
    let out_of_range = || LendingError::validation("monthly_salary", "out of range");
    let unit = policy.rounding_unit.as_decimal();

    let units = policy
        .salary_multiplier
        .checked_mul(monthly_salary.as_decimal())
        .and_then(|scaled| scaled.checked_div(unit))
        .ok_or_else(out_of_range)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);

    units
        .checked_mul(unit)
        .map(Money::from_decimal)
        .ok_or_else(out_of_range)
}

/// approved loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub loan_id: LoanId,
    pub customer_id: CustomerId,
    pub loan_amount: Money,
    pub interest_rate: Rate,
    pub tenure: u32,
    pub monthly_payment: Money,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub emis_on_time: u32,
}

impl Loan {
    /// calendar months between the start month and `today`'s month
    pub fn elapsed_months(&self, today: NaiveDate) -> i64 {
        let years = i64::from(today.year() - self.start_date.year());
        let months = i64::from(today.month()) - i64::from(self.start_date.month());
        years * 12 + months
    }

    /// behind when fewer EMIs were paid on time than months have passed
    pub fn is_behind_schedule(&self, today: NaiveDate) -> bool {
        i64::from(self.emis_on_time) < self.elapsed_months(today)
    }

    pub fn started_in_year(&self, year: i32) -> bool {
        self.start_date.year() == year
    }
}

/// start date advanced by `tenure` calendar months, clamped to month end
pub fn loan_end_date(start_date: NaiveDate, tenure: u32) -> Result<NaiveDate> {
    start_date
        .checked_add_months(Months::new(tenure))
        .ok_or_else(|| LendingError::validation("tenure", format!("{tenure} months overflows the calendar")))
}

/// installment payment, append-only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub customer_id: CustomerId,
    pub loan_id: LoanId,
    pub amount_paid: Money,
    pub paid_date: DateTime<Utc>,
}
