use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::decimal::{Money, Rate};
use crate::errors::{LendingError, Result};
use crate::records::Loan;
use crate::types::{CustomerId, LoanId};

use super::decimal_column;

const TABLE: &str = "loan";

/// loan rows keyed by loan id
#[derive(Clone)]
pub struct LoanStore {
    pool: SqlitePool,
}

impl LoanStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// every loan the customer holds, oldest first
    pub async fn list_for_customer(&self, customer_id: CustomerId) -> Result<Vec<Loan>> {
        let rows = sqlx::query("SELECT * FROM loan WHERE customer_id = ? ORDER BY start_date, loan_id")
            .bind(customer_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(loan_from_row).collect()
    }

    pub async fn find(&self, loan_id: LoanId) -> Result<Option<Loan>> {
        let row = sqlx::query("SELECT * FROM loan WHERE loan_id = ?")
            .bind(loan_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(loan_from_row).transpose()
    }

    pub async fn find_for_customer(&self, loan_id: LoanId, customer_id: CustomerId) -> Result<Option<Loan>> {
        let row = sqlx::query("SELECT * FROM loan WHERE loan_id = ? AND customer_id = ?")
            .bind(loan_id)
            .bind(customer_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(loan_from_row).transpose()
    }

    pub async fn exists(&self, loan_id: LoanId) -> Result<bool> {
        let row = sqlx::query("SELECT 1 FROM loan WHERE loan_id = ?")
            .bind(loan_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.is_some())
    }

    /// a taken loan id surfaces as `DuplicateLoanId`
    pub async fn insert(&self, loan: &Loan) -> Result<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO loan (loan_id, customer_id, loan_amount, tenure, interest_rate,
                              monthly_payment, start_date, end_date, emis_on_time)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(loan.loan_id)
        .bind(loan.customer_id)
        .bind(loan.loan_amount.to_string())
        .bind(loan.tenure)
        .bind(loan.interest_rate.as_percentage().to_string())
        .bind(loan.monthly_payment.to_string())
        .bind(loan.start_date)
        .bind(loan.end_date)
        .bind(loan.emis_on_time)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(LendingError::DuplicateLoanId { loan_id: loan.loan_id })
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn update_emis_on_time(
        &self,
        loan_id: LoanId,
        customer_id: CustomerId,
        emis_on_time: u32,
    ) -> Result<()> {
        sqlx::query("UPDATE loan SET emis_on_time = ? WHERE loan_id = ? AND customer_id = ?")
            .bind(emis_on_time)
            .bind(loan_id)
            .bind(customer_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

fn loan_from_row(row: &SqliteRow) -> Result<Loan> {
    Ok(Loan {
        loan_id: row.try_get("loan_id")?,
        customer_id: row.try_get("customer_id")?,
        loan_amount: Money::from_decimal(decimal_column(row, "loan_amount", TABLE)?),
        interest_rate: Rate::from_percentage_decimal(decimal_column(row, "interest_rate", TABLE)?),
        tenure: row.try_get("tenure")?,
        monthly_payment: Money::from_decimal(decimal_column(row, "monthly_payment", TABLE)?),
        start_date: row.try_get("start_date")?,
        end_date: row.try_get("end_date")?,
        emis_on_time: row.try_get("emis_on_time")?,
    })
}
