//! Domain error types
//!
//! These errors are framework-agnostic and represent business-level failures.
//! The api layer decides how each one is rendered to callers.

use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// A single rejected input field
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub code: String,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum DomainError {
    /// Malformed or out-of-range input
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        details: Vec<FieldError>,
    },
    #[error("{0}")]
    NotFound(String),
    /// Uniqueness or referential rule violated (duplicate ISBN, active loans on delete...)
    #[error("{0}")]
    Conflict(String),
    /// Entity is not in a state that allows the operation
    #[error("{0}")]
    InvalidState(String),
    #[error("{0}")]
    Unavailable(String),
    #[error("User already has an active loan for this book")]
    DuplicateLoan,
    #[error("Renewal limit reached ({renewals}/{max})")]
    RenewalLimitReached { renewals: i32, max: i32 },
    /// Database/persistence error
    #[error("Database error: {0}")]
    Database(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        DomainError::Validation {
            details: vec![FieldError {
                field: field.to_string(),
                code: "invalid".to_string(),
                message: message.clone(),
            }],
            message,
        }
    }

    /// Stable machine-readable identifier of the error kind
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::Validation { .. } => "VALIDATION_ERROR",
            DomainError::NotFound(_) => "NOT_FOUND",
            DomainError::Conflict(_) => "CONFLICT",
            DomainError::InvalidState(_) => "INVALID_STATE",
            DomainError::Unavailable(_) => "UNAVAILABLE",
            DomainError::DuplicateLoan => "DUPLICATE_LOAN",
            DomainError::RenewalLimitReached { .. } => "RENEWAL_LIMIT_REACHED",
            DomainError::Database(_) | DomainError::Internal(_) => "INTERNAL",
        }
    }
}

// Conversion from SeaORM errors (used in infrastructure layer)
impl From<sea_orm::DbErr> for DomainError {
    fn from(e: sea_orm::DbErr) -> Self {
        match e.sql_err() {
            Some(sea_orm::SqlErr::UniqueConstraintViolation(msg)) => {
                DomainError::Conflict(format!("Duplicate value: {}", msg))
            }
            _ => DomainError::Database(e.to_string()),
        }
    }
}

/// Struct field name as it appears in JSON bodies (`total_copies` -> `totalCopies`)
fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

impl From<validator::ValidationErrors> for DomainError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details: Vec<FieldError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                let field = camel_case(field);
                errs.iter().map(move |e| FieldError {
                    field: field.clone(),
                    code: e.code.to_string(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid value for {}", field)),
                })
            })
            .collect();
        details.sort_by(|a, b| a.field.cmp(&b.field));

        DomainError::Validation {
            message: "Invalid data".to_string(),
            details,
        }
    }
}
