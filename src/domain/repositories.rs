//! Repository trait definitions
//!
//! These traits define the contract for data access.
//! Implementations live in the infrastructure layer.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::models::loan::{self, LoanDetails};
use crate::models::user::{MembershipType, UserStatus};
use crate::models::{Book, User};
use super::DomainError;

/// Filter criteria for book listings
#[derive(Debug, Default, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BookQuery {
    /// Case-insensitive match on title, author or genre
    pub search: Option<String>,
    /// `true`: only books with a copy on the shelf, `false`: only fully lent books
    pub available: Option<bool>,
}

/// Filter criteria for member listings
#[derive(Debug, Default, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserQuery {
    /// Case-insensitive match on name or email
    pub search: Option<String>,
    pub status: Option<UserStatus>,
}

/// Status filter accepted by loan listings, including the derived `OVERDUE`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoanStatusFilter {
    Active,
    Returned,
    Overdue,
}

/// Filter criteria for loan listings
#[derive(Debug, Default, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LoanQuery {
    /// Case-insensitive match on book title, book author or borrower name
    pub search: Option<String>,
    pub status: Option<LoanStatusFilter>,
}

/// Input for creating or fully replacing a book
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookInput {
    #[validate(length(min = 1, max = 200, message = "Title must be 1 to 200 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 100, message = "Author must be 1 to 100 characters"))]
    pub author: String,
    #[validate(length(min = 10, max = 17, message = "ISBN must be 10 to 17 characters"))]
    pub isbn: String,
    /// Upper bound (current year) is checked by the book service
    #[validate(range(min = 1000, message = "Published year must be 1000 or later"))]
    pub published_year: i32,
    #[validate(length(min = 1, message = "Genre is required"))]
    pub genre: String,
    #[validate(range(min = 1, max = 100, message = "Total copies must be between 1 and 100"))]
    pub total_copies: i32,
    pub description: Option<String>,
}

/// Input for registering a member
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserInput {
    #[validate(length(min = 1, max = 100, message = "Name must be 1 to 100 characters"))]
    pub name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 10, max = 15, message = "Phone must be 10 to 15 characters"))]
    pub phone: String,
    pub membership_type: MembershipType,
}

/// Input for fully replacing a member record
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    #[validate(length(min = 1, max = 100, message = "Name must be 1 to 100 characters"))]
    pub name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 10, max = 15, message = "Phone must be 10 to 15 characters"))]
    pub phone: String,
    pub membership_type: MembershipType,
    pub status: UserStatus,
}

/// A checkout ready to be persisted
#[derive(Debug, Clone)]
pub struct NewLoan {
    pub user_id: i32,
    pub book_id: i32,
    pub loan_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub max_renewals: i32,
}

/// Repository trait for Book entity
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Find all books matching the filter, ordered by title
    async fn find_all(&self, query: BookQuery) -> Result<Vec<Book>, DomainError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<Book>, DomainError>;

    async fn find_by_isbn(&self, isbn: &str) -> Result<Option<Book>, DomainError>;

    /// Create a book with every copy available
    async fn create(&self, input: BookInput) -> Result<Book, DomainError>;

    /// Replace a book's fields, shifting available copies by the change in total
    async fn update(&self, id: i32, input: BookInput) -> Result<Book, DomainError>;

    /// Change only the total number of copies
    async fn update_total_copies(&self, id: i32, total_copies: i32) -> Result<Book, DomainError>;

    /// Delete a book that has no active loan
    async fn delete(&self, id: i32) -> Result<(), DomainError>;

    async fn count(&self) -> Result<u64, DomainError>;
}

/// Repository trait for User (member) entity
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find all members matching the filter, ordered by name
    async fn find_all(&self, query: UserQuery) -> Result<Vec<User>, DomainError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<User>, DomainError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;

    async fn create(&self, input: UserInput) -> Result<User, DomainError>;

    async fn update(&self, id: i32, input: UserUpdate) -> Result<User, DomainError>;

    /// Delete a member who has no active loan
    async fn delete(&self, id: i32) -> Result<(), DomainError>;

    /// Count members whose status is ACTIVE
    async fn count_active(&self) -> Result<u64, DomainError>;
}

/// Repository trait for Loan entity
///
/// Every mutating method is atomic: it either applies all of its writes
/// (loan row and book counter) or none.
#[async_trait]
pub trait LoanRepository: Send + Sync {
    /// Find loans matching the filter, newest first, projected at `now`
    async fn find_all(
        &self,
        query: LoanQuery,
        now: DateTime<Utc>,
    ) -> Result<Vec<LoanDetails>, DomainError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<loan::Model>, DomainError>;

    /// Check out a copy: insert the loan and take one copy off the shelf
    async fn create(&self, loan: NewLoan) -> Result<loan::Model, DomainError>;

    /// Push the due date back one renewal window
    async fn renew(&self, id: i32) -> Result<loan::Model, DomainError>;

    /// Close the loan at `returned_at` and put the copy back on the shelf
    async fn return_loan(
        &self,
        id: i32,
        returned_at: DateTime<Utc>,
    ) -> Result<loan::Model, DomainError>;

    async fn count_active(&self) -> Result<u64, DomainError>;

    /// Count ACTIVE loans whose due date is before `now`
    async fn count_overdue(&self, now: DateTime<Utc>) -> Result<u64, DomainError>;
}
