//! Dashboard Service - Aggregate counters for the landing page

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::DomainError;
use super::{BookService, LoanService, UserService};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_books: u64,
    /// Members with ACTIVE status only
    pub total_users: u64,
    pub active_loans: u64,
    pub overdue_loans: u64,
}

#[derive(Clone)]
pub struct DashboardService {
    books: BookService,
    users: UserService,
    loans: LoanService,
}

impl DashboardService {
    pub fn new(books: BookService, users: UserService, loans: LoanService) -> Self {
        Self {
            books,
            users,
            loans,
        }
    }

    pub async fn stats(&self) -> Result<DashboardStats, DomainError> {
        let (total_books, total_users, active_loans, overdue_loans) = tokio::try_join!(
            self.books.count_books(),
            self.users.count_active_users(),
            self.loans.count_active_loans(),
            self.loans.count_overdue_loans(),
        )?;

        Ok(DashboardStats {
            total_books,
            total_users,
            active_loans,
            overdue_loans,
        })
    }
}
