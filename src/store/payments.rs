use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::decimal::Money;
use crate::errors::{LendingError, Result};
use crate::records::Payment;
use crate::types::{CustomerId, LoanId};

use super::decimal_column;

const TABLE: &str = "payments";

/// append-only payment rows
#[derive(Clone)]
pub struct PaymentStore {
    pool: SqlitePool,
}

impl PaymentStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, payment: &Payment) -> Result<()> {
        sqlx::query(
            "INSERT INTO payments (customer_id, loan_id, amount_paid, paid_date) VALUES (?, ?, ?, ?)",
        )
        .bind(payment.customer_id)
        .bind(payment.loan_id)
        .bind(payment.amount_paid.to_string())
        .bind(payment.paid_date)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// payments against a loan in the order they were recorded
    pub async fn list_for_loan(&self, loan_id: LoanId) -> Result<Vec<Payment>> {
        let rows = sqlx::query("SELECT * FROM payments WHERE loan_id = ? ORDER BY payment_id")
            .bind(loan_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(payment_from_row).collect()
    }

    /// exact sum of `amount_paid` for one customer's loan
    pub async fn total_paid(&self, customer_id: CustomerId, loan_id: LoanId) -> Result<Money> {
        let rows = sqlx::query("SELECT amount_paid FROM payments WHERE customer_id = ? AND loan_id = ?")
            .bind(customer_id)
            .bind(loan_id)
            .fetch_all(&self.pool)
            .await?;

        // summed in decimal; SQLite SUM over TEXT would go through REAL
        let mut total = Money::ZERO;
        for row in &rows {
            let amount = Money::from_decimal(decimal_column(row, "amount_paid", TABLE)?);
            total = total
                .checked_add(amount)
                .ok_or_else(|| LendingError::validation("amount_paid", "out of range"))?;
        }
        Ok(total)
    }
}

fn payment_from_row(row: &SqliteRow) -> Result<Payment> {
    Ok(Payment {
        customer_id: row.try_get("customer_id")?,
        loan_id: row.try_get("loan_id")?,
        amount_paid: Money::from_decimal(decimal_column(row, "amount_paid", TABLE)?),
        paid_date: row.try_get("paid_date")?,
    })
}
