use axum::{Json, extract::State};

use crate::{AppState, error::ApiError, models::DashboardStats};

/// get_stats
///
/// [Admin Route] Headline counts for the dashboard: total sermons, total
/// missions, active ministries, and unread contact messages.
#[utoipa::path(
    get,
    path = "/admin/stats",
    responses((status = 200, description = "Dashboard stats", body = DashboardStats))
)]
pub async fn get_stats(State(state): State<AppState>) -> Result<Json<DashboardStats>, ApiError> {
    Ok(Json(state.repo.get_stats().await?))
}
