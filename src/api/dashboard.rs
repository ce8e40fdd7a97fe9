use axum::{Json, extract::State};

use crate::infrastructure::AppState;
use crate::services::DashboardStats;
use super::error::ApiResult;

#[utoipa::path(
    get,
    path = "/api/dashboard/stats",
    responses(
        (status = 200, body = DashboardStats),
        (status = 500, body = ErrorResponse)
    )
)]
pub async fn get_stats(State(state): State<AppState>) -> ApiResult<Json<DashboardStats>> {
    Ok(Json(state.dashboard.stats().await?))
}
