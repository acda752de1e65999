//! Loan lifecycle: registration, underwriting, origination, repayment

pub mod loan_ids;

use std::sync::Arc;

use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Serialize};

use crate::config::LendingConfig;
use crate::decimal::{Money, Rate};
use crate::errors::{LendingError, Result};
use crate::payments::{emis_covered, pending_emi_balance, PaymentOutcome, Statement};
use crate::records::{approved_limit, loan_end_date, Customer, CustomerProfile, Loan, Payment};
use crate::scoring::{Assessment, LoanApplication, Underwriter};
use crate::store::Stores;
use crate::types::{CustomerId, LoanId};

pub use loan_ids::{insert_with_fresh_id, LoanIdSource, RandomLoanIds};

/// on-time count a fresh loan starts with
pub const INITIAL_EMIS_ON_TIME: u32 = 1;

/// result of a registration call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    pub customer: Customer,
    /// false when an existing customer was matched
    pub created: bool,
}

/// eligibility answer; nothing is persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Eligibility {
    pub customer_id: CustomerId,
    pub requested_interest_rate: Rate,
    pub tenure: u32,
    pub assessment: Assessment,
}

/// loan creation result
#[derive(Debug, Clone, PartialEq)]
pub enum LoanCreation {
    Approved { loan: Loan, assessment: Assessment },
    Rejected { customer_id: CustomerId, assessment: Assessment },
}

/// loan with the owning customer's current record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanView {
    pub loan: Loan,
    pub customer: Option<Customer>,
}

/// orchestrates the stores and the underwriting engine
pub struct LoanLifecycleService {
    stores: Stores,
    config: LendingConfig,
    underwriter: Underwriter,
    time: SafeTimeProvider,
    loan_ids: Arc<dyn LoanIdSource>,
}

impl LoanLifecycleService {
    pub fn new(stores: Stores, config: LendingConfig, time: SafeTimeProvider) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            underwriter: Underwriter::new(&config),
            stores,
            config,
            time,
            loan_ids: Arc::new(RandomLoanIds),
        })
    }

    /// replace the loan id source
    pub fn with_loan_ids(mut self, loan_ids: Arc<dyn LoanIdSource>) -> Self {
        self.loan_ids = loan_ids;
        self
    }

    /// insert a new customer, or refresh salary/age/limit of a known one
    #[tracing::instrument(skip_all, fields(first_name = %profile.first_name, last_name = %profile.last_name))]
    pub async fn register(&self, profile: CustomerProfile) -> Result<Registration> {
        let limit = approved_limit(profile.monthly_salary, &self.config.limits)?;

        let existing = self
            .stores
            .customers
            .find_by_identity(&profile.first_name, &profile.last_name, &profile.phone_number)
            .await?;

        match existing {
            Some(mut customer) => {
                if profile.differs_from(&customer) {
                    self.stores
                        .customers
                        .update_profile(customer.customer_id, profile.monthly_salary, profile.age, limit)
                        .await?;
                    customer.monthly_salary = profile.monthly_salary;
                    customer.age = profile.age;
                    customer.approved_limit = limit;
                    tracing::info!(customer_id = customer.customer_id, approved_limit = %limit, "customer profile updated");
                } else {
                    tracing::debug!(customer_id = customer.customer_id, "customer profile unchanged");
                }
                Ok(Registration { customer, created: false })
            }
            None => {
                let customer = self.stores.customers.insert(&profile, limit).await?;
                tracing::info!(customer_id = customer.customer_id, approved_limit = %limit, "customer registered");
                Ok(Registration { customer, created: true })
            }
        }
    }

    /// underwrite an application without persisting anything
    #[tracing::instrument(skip(self, application))]
    pub async fn check_eligibility(
        &self,
        customer_id: CustomerId,
        application: LoanApplication,
    ) -> Result<Eligibility> {
        let (_, assessment) = self.assess(customer_id, &application).await?;

        Ok(Eligibility {
            customer_id,
            requested_interest_rate: application.interest_rate,
            tenure: application.tenure,
            assessment,
        })
    }

    /// underwrite and, when approved, book the loan under a fresh id
    #[tracing::instrument(skip(self, application))]
    pub async fn create_loan(
        &self,
        customer_id: CustomerId,
        application: LoanApplication,
    ) -> Result<LoanCreation> {
        let (customer, assessment) = self.assess(customer_id, &application).await?;

        if !assessment.decision.is_approved() {
            tracing::info!(customer_id, score = assessment.breakdown.score, "loan rejected");
            return Ok(LoanCreation::Rejected { customer_id, assessment });
        }

        let start_date = self.time.now().date_naive();
        let end_date = loan_end_date(start_date, application.tenure)?;
        let interest_rate = assessment.decision.corrected_interest_rate;
        let monthly_payment = assessment.monthly_installment;

        let loan = insert_with_fresh_id(
            &self.stores.loans,
            self.loan_ids.as_ref(),
            self.config.loan_id_attempts,
            |loan_id| Loan {
                loan_id,
                customer_id: customer.customer_id,
                loan_amount: application.loan_amount,
                interest_rate,
                tenure: application.tenure,
                monthly_payment,
                start_date,
                end_date,
                emis_on_time: INITIAL_EMIS_ON_TIME,
            },
        )
        .await?;

        tracing::info!(
            customer_id,
            loan_id = loan.loan_id,
            amount = %loan.loan_amount,
            rate = %loan.interest_rate,
            emi = %loan.monthly_payment,
            "loan created"
        );
        Ok(LoanCreation::Approved { loan, assessment })
    }

    #[tracing::instrument(skip(self))]
    pub async fn view_loan(&self, loan_id: LoanId) -> Result<LoanView> {
        let loan = self
            .stores
            .loans
            .find(loan_id)
            .await?
            .ok_or(LendingError::LoanNotFound { loan_id })?;

        let customer = self.stores.customers.find_by_id(loan.customer_id).await?;
        if customer.is_none() {
            tracing::warn!(loan_id, customer_id = loan.customer_id, "loan owner missing");
        }

        Ok(LoanView { loan, customer })
    }

    /// record a payment and refresh the loan's on-time EMI count
    ///
    /// The payment row and the count update are separate statements; a
    /// failure between them leaves the payment recorded with a stale count.
    #[tracing::instrument(skip(self, amount_paid), fields(amount_paid = %amount_paid))]
    pub async fn make_payment(
        &self,
        customer_id: CustomerId,
        loan_id: LoanId,
        amount_paid: Money,
    ) -> Result<PaymentOutcome> {
        let loan = self
            .stores
            .loans
            .find_for_customer(loan_id, customer_id)
            .await?
            .ok_or(LendingError::CustomerLoanNotFound { customer_id, loan_id })?;

        let current_emi = loan.monthly_payment;
        let pending = pending_emi_balance(current_emi, amount_paid);

        let payment = Payment {
            customer_id,
            loan_id,
            amount_paid,
            paid_date: self.time.now(),
        };
        self.stores.payments.insert(&payment).await?;

        let total_paid = self.stores.payments.total_paid(customer_id, loan_id).await?;
        let emis_on_time = emis_covered(total_paid, current_emi);
        if let Some(count) = emis_on_time {
            self.stores
                .loans
                .update_emis_on_time(loan_id, customer_id, count)
                .await?;
        }

        tracing::info!(customer_id, loan_id, pending = %pending, total_paid = %total_paid, ?emis_on_time, "payment recorded");
        Ok(PaymentOutcome {
            payment,
            pending_emi_balance: pending,
            total_paid,
            emis_on_time,
        })
    }

    #[tracing::instrument(skip(self))]
    pub async fn view_statement(&self, customer_id: CustomerId, loan_id: LoanId) -> Result<Statement> {
        let loan_details = self
            .stores
            .loans
            .find_for_customer(loan_id, customer_id)
            .await?
            .ok_or(LendingError::CustomerLoanNotFound { customer_id, loan_id })?;

        let payment_history = self.stores.payments.list_for_loan(loan_id).await?;

        Ok(Statement {
            loan_details,
            payment_history,
        })
    }

    async fn assess(
        &self,
        customer_id: CustomerId,
        application: &LoanApplication,
    ) -> Result<(Customer, Assessment)> {
        let customer = self
            .stores
            .customers
            .find_by_id(customer_id)
            .await?
            .ok_or(LendingError::CustomerNotFound { customer_id })?;

        // limit is rederived from salary rather than read back
        let limit = approved_limit(customer.monthly_salary, &self.config.limits)?;
        let history = self.stores.loans.list_for_customer(customer_id).await?;
        let today = self.time.now().date_naive();

        let assessment = self.underwriter.assess(&history, application, limit, today)?;
        tracing::debug!(
            customer_id,
            existing_loans = history.len(),
            breakdown = ?assessment.breakdown,
            status = ?assessment.decision.status,
            "application assessed"
        );

        Ok((customer, assessment))
    }
}
