//! SeaORM implementation of LoanRepository
//!
//! Checkout, renewal and return each run in one transaction. The counter and
//! status writes are conditional updates whose affected-row count is checked,
//! so a request that loses a race fails instead of overselling a copy.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
    TransactionTrait,
};

use crate::domain::lending;
use crate::domain::{DomainError, LoanQuery, LoanRepository, LoanStatusFilter, NewLoan};
use crate::models::book::{self, Entity as BookEntity};
use crate::models::loan::{
    ActiveModel, Column, Entity as LoanEntity, LoanDetails, LoanStatus, Model, Relation,
};
use crate::models::user::{self, Entity as UserEntity};
use super::contains_literal;

/// SeaORM-based implementation of LoanRepository
pub struct SeaOrmLoanRepository {
    db: DatabaseConnection,
}

impl SeaOrmLoanRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Turn the listing filter into a query condition. Book and user columns
/// require the listing query to join both tables.
fn filter_condition(query: &LoanQuery, now: DateTime<Utc>) -> Condition {
    let mut condition = Condition::all();

    if let Some(q) = &query.search
        && !q.trim().is_empty()
    {
        let q = q.trim();
        condition = condition.add(
            Condition::any()
                .add(contains_literal(book::Column::Title, q))
                .add(contains_literal(book::Column::Author, q))
                .add(contains_literal(user::Column::Name, q)),
        );
    }

    match query.status {
        Some(LoanStatusFilter::Active) => {
            condition = condition.add(Column::Status.eq(LoanStatus::Active));
        }
        Some(LoanStatusFilter::Returned) => {
            condition = condition.add(Column::Status.eq(LoanStatus::Returned));
        }
        Some(LoanStatusFilter::Overdue) => {
            condition = condition
                .add(Column::Status.eq(LoanStatus::Active))
                .add(Column::DueDate.lt(now));
        }
        None => {}
    }

    condition
}

fn not_found(id: i32) -> DomainError {
    DomainError::NotFound(format!("Loan {} not found", id))
}

async fn load_loan<C: ConnectionTrait>(db: &C, id: i32) -> Result<Model, DomainError> {
    LoanEntity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| not_found(id))
}

#[async_trait]
impl LoanRepository for SeaOrmLoanRepository {
    async fn find_all(
        &self,
        query: LoanQuery,
        now: DateTime<Utc>,
    ) -> Result<Vec<LoanDetails>, DomainError> {
        let loans = LoanEntity::find()
            .join(JoinType::InnerJoin, Relation::Book.def())
            .join(JoinType::InnerJoin, Relation::User.def())
            .filter(filter_condition(&query, now))
            .order_by_desc(Column::LoanDate)
            .all(&self.db)
            .await?;

        if loans.is_empty() {
            return Ok(Vec::new());
        }

        // Fetch related books and members in bulk
        let book_ids: Vec<i32> = loans.iter().map(|l| l.book_id).collect();
        let user_ids: Vec<i32> = loans.iter().map(|l| l.user_id).collect();

        let books: HashMap<i32, book::Model> = BookEntity::find()
            .filter(book::Column::Id.is_in(book_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|b| (b.id, b))
            .collect();

        let users: HashMap<i32, user::Model> = UserEntity::find()
            .filter(user::Column::Id.is_in(user_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        let result = loans
            .into_iter()
            .map(|loan| {
                let book = books.get(&loan.book_id);
                let user = users.get(&loan.user_id);

                LoanDetails {
                    status: lending::display_status(&loan, now),
                    id: loan.id,
                    user_id: loan.user_id,
                    book_id: loan.book_id,
                    book_title: book
                        .map(|b| b.title.clone())
                        .unwrap_or_else(|| "Unknown".to_string()),
                    book_author: book
                        .map(|b| b.author.clone())
                        .unwrap_or_else(|| "Unknown".to_string()),
                    user_name: user
                        .map(|u| u.name.clone())
                        .unwrap_or_else(|| "Unknown".to_string()),
                    user_email: user.map(|u| u.email.clone()).unwrap_or_default(),
                    loan_date: loan.loan_date,
                    due_date: loan.due_date,
                    return_date: loan.return_date,
                    renewal_count: loan.renewal_count,
                    max_renewals: loan.max_renewals,
                }
            })
            .collect();

        Ok(result)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Model>, DomainError> {
        Ok(LoanEntity::find_by_id(id).one(&self.db).await?)
    }

    async fn create(&self, new_loan: NewLoan) -> Result<Model, DomainError> {
        let now = Utc::now();
        let txn = self.db.begin().await?;

        let user = UserEntity::find_by_id(new_loan.user_id)
            .one(&txn)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("User {} not found", new_loan.user_id)))?;

        let book = BookEntity::find_by_id(new_loan.book_id)
            .one(&txn)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("Book {} not found", new_loan.book_id)))?;

        let existing_for_pair = LoanEntity::find()
            .filter(Column::UserId.eq(user.id))
            .filter(Column::BookId.eq(book.id))
            .filter(Column::Status.eq(LoanStatus::Active))
            .count(&txn)
            .await?;

        lending::ensure_can_checkout(user.status, book.available_copies, existing_for_pair > 0)?;

        // Take the copy only if one is still on the shelf at write time
        let taken = BookEntity::update_many()
            .col_expr(
                book::Column::AvailableCopies,
                Expr::col(book::Column::AvailableCopies).sub(1),
            )
            .col_expr(book::Column::UpdatedAt, Expr::value(now))
            .filter(book::Column::Id.eq(book.id))
            .filter(book::Column::AvailableCopies.gt(0))
            .exec(&txn)
            .await?;

        if taken.rows_affected == 0 {
            return Err(DomainError::Unavailable(
                "No copies of this book are available".to_string(),
            ));
        }

        let loan = ActiveModel {
            user_id: Set(user.id),
            book_id: Set(book.id),
            loan_date: Set(new_loan.loan_date),
            due_date: Set(new_loan.due_date),
            return_date: Set(None),
            status: Set(LoanStatus::Active),
            renewal_count: Set(0),
            max_renewals: Set(new_loan.max_renewals),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        Ok(loan)
    }

    async fn renew(&self, id: i32) -> Result<Model, DomainError> {
        let now = Utc::now();
        let txn = self.db.begin().await?;

        let existing = load_loan(&txn, id).await?;
        lending::ensure_can_renew(&existing)?;

        let due_date = lending::renewed_due_date(existing.due_date);

        let renewed = LoanEntity::update_many()
            .col_expr(Column::DueDate, Expr::value(due_date))
            .col_expr(Column::RenewalCount, Expr::col(Column::RenewalCount).add(1))
            .col_expr(Column::UpdatedAt, Expr::value(now))
            .filter(Column::Id.eq(id))
            .filter(Column::Status.eq(LoanStatus::Active))
            .filter(Column::RenewalCount.eq(existing.renewal_count))
            .exec(&txn)
            .await?;

        if renewed.rows_affected == 0 {
            return Err(DomainError::InvalidState(
                "Loan changed while renewing, retry".to_string(),
            ));
        }

        let loan = load_loan(&txn, id).await?;
        txn.commit().await?;
        Ok(loan)
    }

    async fn return_loan(&self, id: i32, returned_at: DateTime<Utc>) -> Result<Model, DomainError> {
        let txn = self.db.begin().await?;

        let existing = load_loan(&txn, id).await?;
        lending::ensure_can_return(&existing)?;

        // Only the first return of a loan can flip it
        let closed = LoanEntity::update_many()
            .col_expr(Column::Status, Expr::value(LoanStatus::Returned))
            .col_expr(Column::ReturnDate, Expr::value(returned_at))
            .col_expr(Column::UpdatedAt, Expr::value(returned_at))
            .filter(Column::Id.eq(id))
            .filter(Column::Status.eq(LoanStatus::Active))
            .exec(&txn)
            .await?;

        if closed.rows_affected == 0 {
            return Err(DomainError::InvalidState("Loan is not active".to_string()));
        }

        let restocked = BookEntity::update_many()
            .col_expr(
                book::Column::AvailableCopies,
                Expr::col(book::Column::AvailableCopies).add(1),
            )
            .col_expr(book::Column::UpdatedAt, Expr::value(returned_at))
            .filter(book::Column::Id.eq(existing.book_id))
            .filter(
                Expr::col(book::Column::AvailableCopies).lt(Expr::col(book::Column::TotalCopies)),
            )
            .exec(&txn)
            .await?;

        if restocked.rows_affected == 0 {
            // Total copies were lowered while this loan was out
            tracing::warn!(
                "Book {} already has every copy on the shelf, loan {} returned without restock",
                existing.book_id,
                id
            );
        }

        let loan = load_loan(&txn, id).await?;
        txn.commit().await?;
        Ok(loan)
    }

    async fn count_active(&self) -> Result<u64, DomainError> {
        let count = LoanEntity::find()
            .filter(Column::Status.eq(LoanStatus::Active))
            .count(&self.db)
            .await?;
        Ok(count)
    }

    async fn count_overdue(&self, now: DateTime<Utc>) -> Result<u64, DomainError> {
        let count = LoanEntity::find()
            .filter(Column::Status.eq(LoanStatus::Active))
            .filter(Column::DueDate.lt(now))
            .count(&self.db)
            .await?;
        Ok(count)
    }
}
