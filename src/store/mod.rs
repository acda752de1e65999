//! SQLite-backed customer, loan and payment stores sharing one pool

pub mod customers;
pub mod loans;
pub mod payments;

use rust_decimal::Decimal;
use sqlx::sqlite::{SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};

use crate::errors::{LendingError, Result};

pub use customers::CustomerStore;
pub use loans::LoanStore;
pub use payments::PaymentStore;

/// the three stores over a shared connection pool
#[derive(Clone)]
pub struct Stores {
    pub customers: CustomerStore,
    pub loans: LoanStore,
    pub payments: PaymentStore,
}

impl Stores {
    /// open a pool on `database_url` and make sure the schema exists
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Self::from_pool(pool).await
    }

    /// private in-memory database, kept alive on a single connection
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        Self::from_pool(pool).await
    }

    pub async fn from_pool(pool: SqlitePool) -> Result<Self> {
        init_schema(&pool).await?;
        Ok(Self {
            customers: CustomerStore::new(pool.clone()),
            loans: LoanStore::new(pool.clone()),
            payments: PaymentStore::new(pool),
        })
    }
}

/// create tables and indexes; safe to run repeatedly
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS customer (
            customer_id INTEGER PRIMARY KEY AUTOINCREMENT,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            age INTEGER NOT NULL,
            phone_number TEXT NOT NULL,
            monthly_salary TEXT NOT NULL,
            approved_limit TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS idx_customer_identity
        ON customer(first_name, last_name, phone_number)
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS loan (
            loan_id INTEGER PRIMARY KEY,
            customer_id INTEGER NOT NULL REFERENCES customer(customer_id),
            loan_amount TEXT NOT NULL,
            tenure INTEGER NOT NULL,
            interest_rate TEXT NOT NULL,
            monthly_payment TEXT NOT NULL,
            start_date TEXT NOT NULL,
            end_date TEXT NOT NULL,
            emis_on_time INTEGER NOT NULL DEFAULT 1
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_loan_customer ON loan(customer_id)")
        .execute(pool)
        .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS payments (
            payment_id INTEGER PRIMARY KEY AUTOINCREMENT,
            customer_id INTEGER NOT NULL,
            loan_id INTEGER NOT NULL REFERENCES loan(loan_id),
            amount_paid TEXT NOT NULL,
            paid_date TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_payments_loan ON payments(loan_id, customer_id)")
        .execute(pool)
        .await?;

    Ok(())
}

/// decimal stored as TEXT
pub(crate) fn decimal_column(row: &SqliteRow, column: &'static str, table: &'static str) -> Result<Decimal> {
    let raw: String = row.try_get(column)?;
    raw.parse::<Decimal>().map_err(|e| LendingError::CorruptRecord {
        table,
        message: format!("{column} = {raw:?}: {e}"),
    })
}
