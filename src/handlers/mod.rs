pub mod articles;
pub mod auth;
pub mod contact;
pub mod ministries;
pub mod missions;
pub mod sermons;
pub mod stats;
pub mod uploads;

use axum::{
    Json,
    http::{Method, StatusCode, Uri},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body of the liveness endpoint.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// health_check
///
/// [Public Route] Liveness probe. Always 200 while the process is up.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".to_string(),
        message: "Reformation Baptist Church API is running".to_string(),
        timestamp: Utc::now(),
    })
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct NotFoundBody {
    pub error: String,
    pub message: String,
}

/// Catch-all for unmatched routes: JSON, never an HTML error page.
pub async fn not_found(method: Method, uri: Uri) -> (StatusCode, Json<NotFoundBody>) {
    (
        StatusCode::NOT_FOUND,
        Json(NotFoundBody {
            error: "Endpoint not found".to_string(),
            message: format!("Cannot {method} {uri}"),
        }),
    )
}
