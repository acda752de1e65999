use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::decimal::Money;
use crate::errors::Result;
use crate::records::{Customer, CustomerProfile};
use crate::types::CustomerId;

use super::decimal_column;

const TABLE: &str = "customer";

/// customer rows keyed by generated id
#[derive(Clone)]
pub struct CustomerStore {
    pool: SqlitePool,
}

impl CustomerStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, customer_id: CustomerId) -> Result<Option<Customer>> {
        let row = sqlx::query("SELECT * FROM customer WHERE customer_id = ?")
            .bind(customer_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(customer_from_row).transpose()
    }

    pub async fn find_by_identity(
        &self,
        first_name: &str,
        last_name: &str,
        phone_number: &str,
    ) -> Result<Option<Customer>> {
        let row = sqlx::query(
            "SELECT * FROM customer WHERE first_name = ? AND last_name = ? AND phone_number = ?",
        )
        .bind(first_name)
        .bind(last_name)
        .bind(phone_number)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(customer_from_row).transpose()
    }

    pub async fn insert(&self, profile: &CustomerProfile, approved_limit: Money) -> Result<Customer> {
        let result = sqlx::query(
            r#"
            INSERT INTO customer (first_name, last_name, age, phone_number, monthly_salary, approved_limit)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .bind(profile.age)
        .bind(&profile.phone_number)
        .bind(profile.monthly_salary.to_string())
        .bind(approved_limit.to_string())
        .execute(&self.pool)
        .await?;

        Ok(Customer {
            customer_id: result.last_insert_rowid(),
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
            age: profile.age,
            phone_number: profile.phone_number.clone(),
            monthly_salary: profile.monthly_salary,
            approved_limit,
        })
    }

    /// salary, age and the limit derived from salary change together
    pub async fn update_profile(
        &self,
        customer_id: CustomerId,
        monthly_salary: Money,
        age: u32,
        approved_limit: Money,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE customer SET monthly_salary = ?, age = ?, approved_limit = ? WHERE customer_id = ?",
        )
        .bind(monthly_salary.to_string())
        .bind(age)
        .bind(approved_limit.to_string())
        .bind(customer_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

fn customer_from_row(row: &SqliteRow) -> Result<Customer> {
    Ok(Customer {
        customer_id: row.try_get("customer_id")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        age: row.try_get("age")?,
        phone_number: row.try_get("phone_number")?,
        monthly_salary: Money::from_decimal(decimal_column(row, "monthly_salary", TABLE)?),
        approved_limit: Money::from_decimal(decimal_column(row, "approved_limit", TABLE)?),
    })
}
