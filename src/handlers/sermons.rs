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
    models::{
        MessageResponse, PageParams, Pagination, Sermon, SermonFilter, SermonList, SermonPayload,
    },
};

const DEFAULT_LIMIT: i64 = 50;

/// list_sermons
///
/// [Public Route] Paged sermon listing, newest first. Supports category,
/// speaker, and free-text filters; "All" disables a filter.
#[utoipa::path(
    get,
    path = "/sermons",
    params(SermonFilter),
    responses((status = 200, description = "Sermons page", body = SermonList))
)]
pub async fn list_sermons(
    State(state): State<AppState>,
    Query(filter): Query<SermonFilter>,
) -> Result<Json<SermonList>, ApiError> {
    let params = PageParams::new(filter.page, filter.limit, DEFAULT_LIMIT);
    let page = state.repo.list_sermons(&filter, params).await?;

    Ok(Json(SermonList {
        sermons: page.items,
        pagination: Pagination::new(params, page.total),
    }))
}

/// get_sermon
///
/// [Public Route] Single sermon by id.
#[utoipa::path(
    get,
    path = "/sermons/{id}",
    responses(
        (status = 200, description = "Sermon", body = Sermon),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_sermon(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Sermon>, ApiError> {
    state
        .repo
        .get_sermon(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Sermon not found".to_string()))
}

/// list_all_sermons
///
/// [Admin Route] Every sermon, unpaged, for the dashboard table.
#[utoipa::path(
    get,
    path = "/admin/sermons",
    responses((status = 200, description = "All sermons", body = [Sermon]))
)]
pub async fn list_all_sermons(
    State(state): State<AppState>,
) -> Result<Json<Vec<Sermon>>, ApiError> {
    Ok(Json(state.repo.list_all_sermons().await?))
}

/// create_sermon
///
/// [Admin Route] Validates, normalizes (trimmed strings, lowercased tags),
/// and persists a new sermon.
#[utoipa::path(
    post,
    path = "/admin/sermons",
    request_body = SermonPayload,
    responses(
        (status = 201, description = "Created", body = Sermon),
        (status = 400, description = "Validation failed")
    )
)]
pub async fn create_sermon(
    State(state): State<AppState>,
    Json(mut payload): Json<SermonPayload>,
) -> Result<(StatusCode, Json<Sermon>), ApiError> {
    payload.normalize();
    payload.validate()?;

    let sermon = state.repo.create_sermon(payload).await?;
    Ok((StatusCode::CREATED, Json(sermon)))
}

/// update_sermon
///
/// [Admin Route] Full replace of an existing sermon. The payload is held to
/// the same validation as creation; created_at is preserved.
#[utoipa::path(
    put,
    path = "/admin/sermons/{id}",
    request_body = SermonPayload,
    responses(
        (status = 200, description = "Updated", body = Sermon),
        (status = 404, description = "Not found")
    )
)]
pub async fn update_sermon(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(mut payload): Json<SermonPayload>,
) -> Result<Json<Sermon>, ApiError> {
    payload.normalize();
    payload.validate()?;

    state
        .repo
        .update_sermon(id, payload)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Sermon not found".to_string()))
}

/// delete_sermon
///
/// [Admin Route] Removes a sermon and acknowledges with a message body.
#[utoipa::path(
    delete,
    path = "/admin/sermons/{id}",
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_sermon(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    if state.repo.delete_sermon(id).await? {
        Ok(Json(MessageResponse::new("Sermon deleted successfully")))
    } else {
        Err(ApiError::NotFound("Sermon not found".to_string()))
    }
}
