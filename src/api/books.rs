use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{BookInput, BookQuery};
use crate::infrastructure::AppState;
use crate::models::Book;
use super::MessageResponse;
use super::error::ApiResult;

/// Body of `PUT /api/books/{id}/copies`
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCopiesRequest {
    pub total_copies: i32,
}

#[utoipa::path(
    get,
    path = "/api/books",
    params(BookQuery),
    responses(
        (status = 200, description = "Books ordered by title", body = [Book]),
        (status = 400, description = "Invalid query", body = ErrorResponse)
    )
)]
pub async fn list_books(
    State(state): State<AppState>,
    query: Result<Query<BookQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Book>>> {
    let Query(query) = query?;
    Ok(Json(state.books.list_books(query).await?))
}

#[utoipa::path(
    get,
    path = "/api/books/{id}",
    params(("id" = i32, Path, description = "Book id")),
    responses(
        (status = 200, body = Book),
        (status = 404, description = "Book not found", body = ErrorResponse)
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> ApiResult<Json<Book>> {
    let Path(id) = id?;
    Ok(Json(state.books.get_book(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/books",
    request_body = BookInput,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Validation failed or duplicate ISBN", body = ErrorResponse)
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    body: Result<Json<BookInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Book>)> {
    let Json(input) = body?;
    let book = state.books.create_book(input).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

#[utoipa::path(
    put,
    path = "/api/books/{id}",
    params(("id" = i32, Path, description = "Book id")),
    request_body = BookInput,
    responses(
        (status = 200, body = Book),
        (status = 400, body = ErrorResponse),
        (status = 404, body = ErrorResponse)
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
    body: Result<Json<BookInput>, JsonRejection>,
) -> ApiResult<Json<Book>> {
    let Path(id) = id?;
    let Json(input) = body?;
    Ok(Json(state.books.update_book(id, input).await?))
}

/// Change the number of owned copies; the shelf count moves by the same delta, never below zero
#[utoipa::path(
    put,
    path = "/api/books/{id}/copies",
    params(("id" = i32, Path, description = "Book id")),
    request_body = UpdateCopiesRequest,
    responses(
        (status = 200, body = Book),
        (status = 400, body = ErrorResponse),
        (status = 404, body = ErrorResponse)
    )
)]
pub async fn update_copies(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
    body: Result<Json<UpdateCopiesRequest>, JsonRejection>,
) -> ApiResult<Json<Book>> {
    let Path(id) = id?;
    let Json(request) = body?;
    Ok(Json(state.books.update_copies(id, request.total_copies).await?))
}

#[utoipa::path(
    delete,
    path = "/api/books/{id}",
    params(("id" = i32, Path, description = "Book id")),
    responses(
        (status = 200, body = MessageResponse),
        (status = 400, description = "Book has active loans", body = ErrorResponse),
        (status = 404, body = ErrorResponse)
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Path(id) = id?;
    state.books.delete_book(id).await?;
    Ok(Json(MessageResponse::new("Book deleted successfully")))
}
