use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
};

use crate::domain::LoanQuery;
use crate::infrastructure::AppState;
use crate::models::loan::LoanDto;
use crate::models::{Loan, LoanDetails};
use super::error::ApiResult;

#[utoipa::path(
    get,
    path = "/api/loans",
    params(LoanQuery),
    responses(
        (status = 200, description = "Loans, most recent first", body = [LoanDetails]),
        (status = 400, body = ErrorResponse)
    )
)]
pub async fn list_loans(
    State(state): State<AppState>,
    query: Result<Query<LoanQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<LoanDetails>>> {
    let Query(query) = query?;
    Ok(Json(state.loans.list_loans(query).await?))
}

#[utoipa::path(
    get,
    path = "/api/loans/{id}",
    params(("id" = i32, Path, description = "Loan id")),
    responses(
        (status = 200, body = Loan),
        (status = 404, body = ErrorResponse)
    )
)]
pub async fn get_loan(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> ApiResult<Json<Loan>> {
    let Path(id) = id?;
    Ok(Json(state.loans.get_loan(id).await?))
}

/// Check a book out to a member
#[utoipa::path(
    post,
    path = "/api/loans",
    request_body = LoanDto,
    responses(
        (status = 201, description = "Loan created, one copy taken off the shelf", body = Loan),
        (status = 400, description = "Inactive member, no copy or duplicate", body = ErrorResponse),
        (status = 404, description = "Unknown member or book", body = ErrorResponse)
    )
)]
pub async fn create_loan(
    State(state): State<AppState>,
    body: Result<Json<LoanDto>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Loan>)> {
    let Json(dto) = body?;
    let loan = state.loans.create_loan(dto).await?;
    Ok((StatusCode::CREATED, Json(loan)))
}

#[utoipa::path(
    post,
    path = "/api/loans/{id}/renew",
    params(("id" = i32, Path, description = "Loan id")),
    responses(
        (status = 200, description = "Due date pushed back 14 days", body = Loan),
        (status = 400, description = "Loan not active or at renewal limit", body = ErrorResponse),
        (status = 404, body = ErrorResponse)
    )
)]
pub async fn renew_loan(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> ApiResult<Json<Loan>> {
    let Path(id) = id?;
    Ok(Json(state.loans.renew_loan(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/loans/{id}/return",
    params(("id" = i32, Path, description = "Loan id")),
    responses(
        (status = 200, description = "Loan closed, copy back on the shelf", body = Loan),
        (status = 400, description = "Loan already returned", body = ErrorResponse),
        (status = 404, body = ErrorResponse)
    )
)]
pub async fn return_loan(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> ApiResult<Json<Loan>> {
    let Path(id) = id?;
    Ok(Json(state.loans.return_loan(id).await?))
}
