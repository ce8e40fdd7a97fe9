//! HTTP rendering of domain errors

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{DomainError, FieldError};

/// Error body returned by every endpoint
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

#[derive(Debug)]
pub struct ApiError(pub DomainError);

pub type ApiResult<T> = Result<T, ApiError>;

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        ApiError(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(DomainError::Validation {
            message: "Invalid data".to_string(),
            details: vec![FieldError {
                field: "body".to_string(),
                code: "invalid_json".to_string(),
                message: rejection.body_text(),
            }],
        })
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError(DomainError::Validation {
            message: "Invalid query parameters".to_string(),
            details: vec![FieldError {
                field: "query".to_string(),
                code: "invalid_query".to_string(),
                message: rejection.body_text(),
            }],
        })
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError(DomainError::validation("id", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.0.code().to_string();

        let (status, error, details) = match self.0 {
            DomainError::Validation { message, details } => {
                (StatusCode::BAD_REQUEST, message, Some(details))
            }
            DomainError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),
            e @ (DomainError::Conflict(_)
            | DomainError::InvalidState(_)
            | DomainError::Unavailable(_)
            | DomainError::DuplicateLoan
            | DomainError::RenewalLimitReached { .. }) => {
                (StatusCode::BAD_REQUEST, e.to_string(), None)
            }
            DomainError::Database(msg) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                )
            }
            DomainError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error,
            code,
            details,
        });

        (status, body).into_response()
    }
}
