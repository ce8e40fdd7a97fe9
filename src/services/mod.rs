//! Services Layer
//!
//! Business operations over injected repositories. HTTP handlers are thin
//! wrappers around these; tests can build them over any repository
//! implementation.

pub mod book_service;
pub mod dashboard_service;
pub mod loan_service;
pub mod user_service;

// Re-export for convenience
pub use book_service::BookService;
pub use dashboard_service::{DashboardService, DashboardStats};
pub use loan_service::LoanService;
pub use user_service::UserService;
