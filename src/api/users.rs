use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
};

use crate::domain::{UserInput, UserQuery, UserUpdate};
use crate::infrastructure::AppState;
use crate::models::User;
use super::MessageResponse;
use super::error::ApiResult;

#[utoipa::path(
    get,
    path = "/api/users",
    params(UserQuery),
    responses(
        (status = 200, description = "Members by name with active loan counts", body = [User]),
        (status = 400, body = ErrorResponse)
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    query: Result<Query<UserQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<User>>> {
    let Query(query) = query?;
    Ok(Json(state.users.list_users(query).await?))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = i32, Path, description = "User id")),
    responses(
        (status = 200, body = User),
        (status = 404, body = ErrorResponse)
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> ApiResult<Json<User>> {
    let Path(id) = id?;
    Ok(Json(state.users.get_user(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/users",
    request_body = UserInput,
    responses(
        (status = 201, body = User),
        (status = 400, description = "Validation failed or email taken", body = ErrorResponse)
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    body: Result<Json<UserInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let Json(input) = body?;
    let user = state.users.create_user(input).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[utoipa::path(
    put,
    path = "/api/users/{id}",
    params(("id" = i32, Path, description = "User id")),
    request_body = UserUpdate,
    responses(
        (status = 200, body = User),
        (status = 400, body = ErrorResponse),
        (status = 404, body = ErrorResponse)
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
    body: Result<Json<UserUpdate>, JsonRejection>,
) -> ApiResult<Json<User>> {
    let Path(id) = id?;
    let Json(input) = body?;
    Ok(Json(state.users.update_user(id, input).await?))
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(("id" = i32, Path, description = "User id")),
    responses(
        (status = 200, body = MessageResponse),
        (status = 400, description = "User has active loans", body = ErrorResponse),
        (status = 404, body = ErrorResponse)
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Path(id) = id?;
    state.users.delete_user(id).await?;
    Ok(Json(MessageResponse::new("User deleted successfully")))
}
