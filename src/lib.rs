pub mod config;
pub mod decimal;
pub mod errors;
pub mod http;
pub mod lifecycle;
pub mod payments;
pub mod records;
pub mod scoring;
pub mod store;
pub mod telemetry;
pub mod types;

// re-export key types
pub use config::{LendingConfig, ServerConfig};
pub use decimal::{Money, Rate};
pub use errors::{LendingError, Result};
pub use lifecycle::{LoanCreation, LoanLifecycleService};
pub use records::{Customer, CustomerProfile, Loan, Payment};
pub use scoring::{Assessment, LoanApplication, Underwriter};
pub use store::Stores;
pub use types::{ApprovalStatus, CustomerId, LoanId};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
