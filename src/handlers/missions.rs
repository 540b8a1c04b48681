use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    AppState,
    error::ApiError,
    models::{MessageResponse, Mission, MissionFilter, MissionPayload},
};

/// list_missions
///
/// [Public Route] Missions as a bare array, newest start date first,
/// capped at 20 unless a limit is given. Location filter matches any of a
/// mission's location names.
#[utoipa::path(
    get,
    path = "/missions",
    params(MissionFilter),
    responses((status = 200, description = "Missions", body = [Mission]))
)]
pub async fn list_missions(
    State(state): State<AppState>,
    Query(filter): Query<MissionFilter>,
) -> Result<Json<Vec<Mission>>, ApiError> {
    Ok(Json(state.repo.list_missions(&filter).await?))
}

/// get_mission
///
/// [Public Route] Single mission by id.
#[utoipa::path(
    get,
    path = "/missions/{id}",
    responses(
        (status = 200, description = "Mission", body = Mission),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_mission(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Mission>, ApiError> {
    state
        .repo
        .get_mission(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Mission not found".to_string()))
}

/// list_all_missions
///
/// [Admin Route] Every mission, unpaged.
#[utoipa::path(
    get,
    path = "/admin/missions",
    responses((status = 200, description = "All missions", body = [Mission]))
)]
pub async fn list_all_missions(
    State(state): State<AppState>,
) -> Result<Json<Vec<Mission>>, ApiError> {
    Ok(Json(state.repo.list_all_missions().await?))
}

/// create_mission
///
/// [Admin Route] Validates the mission and its nested locations/updates,
/// then persists it. Status defaults to "Active".
#[utoipa::path(
    post,
    path = "/admin/missions",
    request_body = MissionPayload,
    responses(
        (status = 201, description = "Created", body = Mission),
        (status = 400, description = "Validation failed")
    )
)]
pub async fn create_mission(
    State(state): State<AppState>,
    Json(mut payload): Json<MissionPayload>,
) -> Result<(StatusCode, Json<Mission>), ApiError> {
    payload.normalize();
    payload.validate()?;

    let mission = state.repo.create_mission(payload).await?;
    Ok((StatusCode::CREATED, Json(mission)))
}

/// update_mission
///
/// [Admin Route] Full replace of an existing mission, nested documents
/// included.
#[utoipa::path(
    put,
    path = "/admin/missions/{id}",
    request_body = MissionPayload,
    responses(
        (status = 200, description = "Updated", body = Mission),
        (status = 404, description = "Not found")
    )
)]
pub async fn update_mission(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(mut payload): Json<MissionPayload>,
) -> Result<Json<Mission>, ApiError> {
    payload.normalize();
    payload.validate()?;

    state
        .repo
        .update_mission(id, payload)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Mission not found".to_string()))
}

/// delete_mission
///
/// [Admin Route] Removes a mission.
#[utoipa::path(
    delete,
    path = "/admin/missions/{id}",
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_mission(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    if state.repo.delete_mission(id).await? {
        Ok(Json(MessageResponse::new("Mission deleted successfully")))
    } else {
        Err(ApiError::NotFound("Mission not found".to_string()))
    }
}
