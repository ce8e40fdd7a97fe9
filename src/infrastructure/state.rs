//! Application state containing services and shared resources

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::domain::{BookRepository, LoanRepository, UserRepository};
use crate::infrastructure::config::LendingPolicy;
use crate::infrastructure::{SeaOrmBookRepository, SeaOrmLoanRepository, SeaOrmUserRepository};
use crate::services::{BookService, DashboardService, LoanService, UserService};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub books: BookService,
    pub users: UserService,
    pub loans: LoanService,
    pub dashboard: DashboardService,
}

impl AppState {
    /// Create a new AppState with SeaORM repositories over `db`
    pub fn new(db: DatabaseConnection, policy: LendingPolicy) -> Self {
        Self::from_repositories(
            Arc::new(SeaOrmBookRepository::new(db.clone())),
            Arc::new(SeaOrmUserRepository::new(db.clone())),
            Arc::new(SeaOrmLoanRepository::new(db)),
            policy,
        )
    }

    /// Wire the services over arbitrary repository implementations
    pub fn from_repositories(
        book_repo: Arc<dyn BookRepository>,
        user_repo: Arc<dyn UserRepository>,
        loan_repo: Arc<dyn LoanRepository>,
        policy: LendingPolicy,
    ) -> Self {
        let books = BookService::new(book_repo);
        let users = UserService::new(user_repo);
        let loans = LoanService::new(loan_repo, policy);
        let dashboard = DashboardService::new(books.clone(), users.clone(), loans.clone());

        Self {
            books,
            users,
            loans,
            dashboard,
        }
    }
}
