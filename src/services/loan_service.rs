//! Loan Service - Checkout, renewal and return workflow
//!
//! Input checks happen here; every state transition is delegated to the
//! injected [`LoanRepository`], which applies it atomically.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::{DomainError, LoanQuery, LoanRepository, NewLoan};
use crate::infrastructure::config::LendingPolicy;
use crate::models::loan::LoanDto;
use crate::models::{Loan, LoanDetails};

#[derive(Clone)]
pub struct LoanService {
    loans: Arc<dyn LoanRepository>,
    policy: LendingPolicy,
}

impl LoanService {
    pub fn new(loans: Arc<dyn LoanRepository>, policy: LendingPolicy) -> Self {
        Self { loans, policy }
    }

    /// List loans with their status projected at the current time
    pub async fn list_loans(&self, query: LoanQuery) -> Result<Vec<LoanDetails>, DomainError> {
        tracing::info!(
            "List loans - Filters: search={:?}, status={:?}",
            query.search,
            query.status
        );
        self.loans.find_all(query, Utc::now()).await
    }

    pub async fn get_loan(&self, id: i32) -> Result<Loan, DomainError> {
        let loan = self
            .loans
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("Loan {} not found", id)))?;
        Ok(Loan::project(loan, Utc::now()))
    }

    /// Check out a book for a member
    pub async fn create_loan(&self, dto: LoanDto) -> Result<Loan, DomainError> {
        let now = Utc::now();

        if dto.due_date <= now {
            return Err(DomainError::validation(
                "dueDate",
                "Due date must be in the future",
            ));
        }

        let loan = self
            .loans
            .create(NewLoan {
                user_id: dto.user_id,
                book_id: dto.book_id,
                loan_date: now,
                due_date: dto.due_date,
                max_renewals: self.policy.max_renewals,
            })
            .await
            .inspect_err(|e| {
                tracing::warn!(
                    "Checkout of book {} for user {} refused: {}",
                    dto.book_id,
                    dto.user_id,
                    e
                )
            })?;

        tracing::info!(
            "Loan {} created: book {} to user {}, due {}",
            loan.id,
            loan.book_id,
            loan.user_id,
            loan.due_date
        );

        Ok(Loan::project(loan, now))
    }

    /// Extend an active loan by one renewal window
    pub async fn renew_loan(&self, id: i32) -> Result<Loan, DomainError> {
        let loan = self.loans.renew(id).await?;

        tracing::info!(
            "Loan {} renewed ({}/{}), now due {}",
            loan.id,
            loan.renewal_count,
            loan.max_renewals,
            loan.due_date
        );

        Ok(Loan::project(loan, Utc::now()))
    }

    /// Close an active loan and restock the copy
    pub async fn return_loan(&self, id: i32) -> Result<Loan, DomainError> {
        let now = Utc::now();
        let loan = self.loans.return_loan(id, now).await?;

        tracing::info!("Loan {} returned (book {})", loan.id, loan.book_id);

        Ok(Loan::project(loan, now))
    }

    pub async fn count_active_loans(&self) -> Result<u64, DomainError> {
        self.loans.count_active().await
    }

    pub async fn count_overdue_loans(&self) -> Result<u64, DomainError> {
        self.loans.count_overdue(Utc::now()).await
    }
}
