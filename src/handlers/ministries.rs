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
    models::{MessageResponse, Ministry, MinistryFilter, MinistryPayload},
};

/// list_ministries
///
/// [Public Route] Active ministries as a bare array, sorted by name.
#[utoipa::path(
    get,
    path = "/ministries",
    params(MinistryFilter),
    responses((status = 200, description = "Active ministries", body = [Ministry]))
)]
pub async fn list_ministries(
    State(state): State<AppState>,
    Query(filter): Query<MinistryFilter>,
) -> Result<Json<Vec<Ministry>>, ApiError> {
    Ok(Json(state.repo.list_ministries(&filter, true).await?))
}

/// get_ministry
///
/// [Public Route] Single active ministry by id. Deactivated ministries are
/// invisible here.
#[utoipa::path(
    get,
    path = "/ministries/{id}",
    responses(
        (status = 200, description = "Ministry", body = Ministry),
        (status = 404, description = "Not found or inactive")
    )
)]
pub async fn get_ministry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Ministry>, ApiError> {
    state
        .repo
        .get_ministry(id, true)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Ministry not found".to_string()))
}

/// list_all_ministries
///
/// [Admin Route] Every ministry, active or not.
#[utoipa::path(
    get,
    path = "/admin/ministries",
    responses((status = 200, description = "All ministries", body = [Ministry]))
)]
pub async fn list_all_ministries(
    State(state): State<AppState>,
) -> Result<Json<Vec<Ministry>>, ApiError> {
    Ok(Json(state.repo.list_all_ministries().await?))
}

/// create_ministry
///
/// [Admin Route] Persists a new ministry; is_active defaults to true.
#[utoipa::path(
    post,
    path = "/admin/ministries",
    request_body = MinistryPayload,
    responses(
        (status = 201, description = "Created", body = Ministry),
        (status = 400, description = "Validation failed")
    )
)]
pub async fn create_ministry(
    State(state): State<AppState>,
    Json(mut payload): Json<MinistryPayload>,
) -> Result<(StatusCode, Json<Ministry>), ApiError> {
    payload.normalize();
    payload.validate()?;

    let ministry = state.repo.create_ministry(payload).await?;
    Ok((StatusCode::CREATED, Json(ministry)))
}

/// update_ministry
///
/// [Admin Route] Full replace; flipping is_active off hides the ministry
/// from the public routes without deleting it.
#[utoipa::path(
    put,
    path = "/admin/ministries/{id}",
    request_body = MinistryPayload,
    responses(
        (status = 200, description = "Updated", body = Ministry),
        (status = 404, description = "Not found")
    )
)]
pub async fn update_ministry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(mut payload): Json<MinistryPayload>,
) -> Result<Json<Ministry>, ApiError> {
    payload.normalize();
    payload.validate()?;

    state
        .repo
        .update_ministry(id, payload)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Ministry not found".to_string()))
}

/// delete_ministry
///
/// [Admin Route] Removes a ministry.
#[utoipa::path(
    delete,
    path = "/admin/ministries/{id}",
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_ministry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    if state.repo.delete_ministry(id).await? {
        Ok(Json(MessageResponse::new("Ministry deleted successfully")))
    } else {
        Err(ApiError::NotFound("Ministry not found".to_string()))
    }
}
