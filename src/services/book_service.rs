//! Book Service - Catalog and inventory operations

use std::sync::Arc;

use chrono::{Datelike, Utc};
use validator::Validate;

use crate::domain::{BookInput, BookQuery, BookRepository, DomainError};
use crate::models::Book;

#[derive(Clone)]
pub struct BookService {
    books: Arc<dyn BookRepository>,
}

/// Field checks that `validator` cannot express statically
fn validate_book(input: &BookInput) -> Result<(), DomainError> {
    input.validate()?;

    let current_year = Utc::now().year();
    if input.published_year > current_year {
        return Err(DomainError::validation(
            "publishedYear",
            format!("Published year cannot be after {}", current_year),
        ));
    }

    Ok(())
}

fn validate_total_copies(total_copies: i32) -> Result<(), DomainError> {
    if !(1..=100).contains(&total_copies) {
        return Err(DomainError::validation(
            "totalCopies",
            "Total copies must be between 1 and 100",
        ));
    }
    Ok(())
}

impl BookService {
    pub fn new(books: Arc<dyn BookRepository>) -> Self {
        Self { books }
    }

    pub async fn list_books(&self, query: BookQuery) -> Result<Vec<Book>, DomainError> {
        tracing::info!(
            "List books - Filters: search={:?}, available={:?}",
            query.search,
            query.available
        );
        self.books.find_all(query).await
    }

    pub async fn get_book(&self, id: i32) -> Result<Book, DomainError> {
        self.books
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("Book {} not found", id)))
    }

    pub async fn create_book(&self, input: BookInput) -> Result<Book, DomainError> {
        validate_book(&input)?;

        if self.books.find_by_isbn(&input.isbn).await?.is_some() {
            return Err(DomainError::Conflict(format!(
                "ISBN {} already exists",
                input.isbn
            )));
        }

        let book = self.books.create(input).await?;
        tracing::info!("Book {} created ({})", book.id, book.isbn);
        Ok(book)
    }

    /// Replace a book record. Available copies follow the change in total.
    pub async fn update_book(&self, id: i32, input: BookInput) -> Result<Book, DomainError> {
        validate_book(&input)?;

        let existing = self.get_book(id).await?;

        if input.isbn != existing.isbn
            && let Some(other) = self.books.find_by_isbn(&input.isbn).await?
            && other.id != id
        {
            return Err(DomainError::Conflict(format!(
                "ISBN {} already exists",
                input.isbn
            )));
        }

        let book = self.books.update(id, input).await?;
        tracing::info!(
            "Book {} updated, copies {}/{}",
            book.id,
            book.available_copies,
            book.total_copies
        );
        Ok(book)
    }

    pub async fn update_copies(&self, id: i32, total_copies: i32) -> Result<Book, DomainError> {
        validate_total_copies(total_copies)?;

        let book = self.books.update_total_copies(id, total_copies).await?;
        tracing::info!(
            "Book {} copies changed to {}/{}",
            book.id,
            book.available_copies,
            book.total_copies
        );
        Ok(book)
    }

    pub async fn delete_book(&self, id: i32) -> Result<(), DomainError> {
        self.books.delete(id).await?;
        tracing::info!("Book {} deleted", id);
        Ok(())
    }

    pub async fn count_books(&self) -> Result<u64, DomainError> {
        self.books.count().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(published_year: i32, total_copies: i32) -> BookInput {
        BookInput {
            title: "Clean Code".to_string(),
            author: "Robert C. Martin".to_string(),
            isbn: "978-0132350884".to_string(),
            published_year,
            genre: "Technology".to_string(),
            total_copies,
            description: None,
        }
    }

    #[test]
    fn test_valid_book_passes() {
        assert!(validate_book(&input(2008, 3)).is_ok());
    }

    #[test]
    fn test_future_publication_year_is_rejected() {
        let next_year = Utc::now().year() + 1;
        match validate_book(&input(next_year, 3)) {
            Err(DomainError::Validation { details, .. }) => {
                assert_eq!(details[0].field, "publishedYear");
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_field_bounds_are_reported_per_field() {
        let mut book = input(999, 0);
        book.isbn = "123".to_string();

        match validate_book(&book) {
            Err(DomainError::Validation { details, .. }) => {
                let fields: Vec<&str> = details.iter().map(|d| d.field.as_str()).collect();
                assert_eq!(fields, vec!["isbn", "publishedYear", "totalCopies"]);
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_copy_bounds() {
        assert!(validate_total_copies(1).is_ok());
        assert!(validate_total_copies(100).is_ok());
        assert!(validate_total_copies(0).is_err());
        assert!(validate_total_copies(101).is_err());
    }
}
