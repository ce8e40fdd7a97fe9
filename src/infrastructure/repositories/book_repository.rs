//! SeaORM implementation of BookRepository

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::domain::lending;
use crate::domain::{BookInput, BookQuery, BookRepository, DomainError};
use crate::models::Book;
use crate::models::book::{ActiveModel, Column, Entity as BookEntity};
use crate::models::loan::{self, Entity as LoanEntity, LoanStatus};
use super::contains_literal;

/// SeaORM-based implementation of BookRepository
pub struct SeaOrmBookRepository {
    db: DatabaseConnection,
}

impl SeaOrmBookRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Turn the listing filter into a query condition
fn filter_condition(query: &BookQuery) -> Condition {
    let mut condition = Condition::all();

    if let Some(q) = &query.search
        && !q.trim().is_empty()
    {
        let q = q.trim();
        condition = condition.add(
            Condition::any()
                .add(contains_literal(Column::Title, q))
                .add(contains_literal(Column::Author, q))
                .add(contains_literal(Column::Genre, q)),
        );
    }

    match query.available {
        Some(true) => condition = condition.add(Column::AvailableCopies.gt(0)),
        Some(false) => condition = condition.add(Column::AvailableCopies.eq(0)),
        None => {}
    }

    condition
}

fn not_found(id: i32) -> DomainError {
    DomainError::NotFound(format!("Book {} not found", id))
}

#[async_trait]
impl BookRepository for SeaOrmBookRepository {
    async fn find_all(&self, query: BookQuery) -> Result<Vec<Book>, DomainError> {
        let books = BookEntity::find()
            .filter(filter_condition(&query))
            .order_by_asc(Column::Title)
            .all(&self.db)
            .await?;

        Ok(books.into_iter().map(Book::from).collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Book>, DomainError> {
        let book = BookEntity::find_by_id(id).one(&self.db).await?;
        Ok(book.map(Book::from))
    }

    async fn find_by_isbn(&self, isbn: &str) -> Result<Option<Book>, DomainError> {
        let book = BookEntity::find()
            .filter(Column::Isbn.eq(isbn))
            .one(&self.db)
            .await?;
        Ok(book.map(Book::from))
    }

    async fn create(&self, input: BookInput) -> Result<Book, DomainError> {
        let now = chrono::Utc::now();

        let new_book = ActiveModel {
            title: Set(input.title),
            author: Set(input.author),
            isbn: Set(input.isbn),
            published_year: Set(input.published_year),
            genre: Set(input.genre),
            total_copies: Set(input.total_copies),
            available_copies: Set(input.total_copies),
            description: Set(input.description),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = new_book.insert(&self.db).await?;
        Ok(Book::from(result))
    }

    async fn update(&self, id: i32, input: BookInput) -> Result<Book, DomainError> {
        let txn = self.db.begin().await?;

        let existing = BookEntity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| not_found(id))?;

        let available = lending::recompute_available_copies(
            existing.available_copies,
            existing.total_copies,
            input.total_copies,
        );

        let mut active: ActiveModel = existing.into();
        active.title = Set(input.title);
        active.author = Set(input.author);
        active.isbn = Set(input.isbn);
        active.published_year = Set(input.published_year);
        active.genre = Set(input.genre);
        active.total_copies = Set(input.total_copies);
        active.available_copies = Set(available);
        active.description = Set(input.description);
        active.updated_at = Set(chrono::Utc::now());

        let result = active.update(&txn).await?;
        txn.commit().await?;

        Ok(Book::from(result))
    }

    async fn update_total_copies(&self, id: i32, total_copies: i32) -> Result<Book, DomainError> {
        let txn = self.db.begin().await?;

        let existing = BookEntity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| not_found(id))?;

        let available = lending::recompute_available_copies(
            existing.available_copies,
            existing.total_copies,
            total_copies,
        );

        let mut active: ActiveModel = existing.into();
        active.total_copies = Set(total_copies);
        active.available_copies = Set(available);
        active.updated_at = Set(chrono::Utc::now());

        let result = active.update(&txn).await?;
        txn.commit().await?;

        Ok(Book::from(result))
    }

    async fn delete(&self, id: i32) -> Result<(), DomainError> {
        let txn = self.db.begin().await?;

        BookEntity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| not_found(id))?;

        let active_loans = LoanEntity::find()
            .filter(loan::Column::BookId.eq(id))
            .filter(loan::Column::Status.eq(LoanStatus::Active))
            .count(&txn)
            .await?;
        lending::ensure_no_active_loans(active_loans, "book")?;

        // Returned loans go with the record
        LoanEntity::delete_many()
            .filter(loan::Column::BookId.eq(id))
            .exec(&txn)
            .await?;

        let result = BookEntity::delete_by_id(id).exec(&txn).await?;
        if result.rows_affected == 0 {
            return Err(not_found(id));
        }

        txn.commit().await?;
        Ok(())
    }

    async fn count(&self) -> Result<u64, DomainError> {
        Ok(BookEntity::find().count(&self.db).await?)
    }
}
