use axum::{
    Json,
    extract::{Multipart, State},
    http::{HeaderMap, StatusCode, header},
};
use chrono::Utc;

use crate::{
    AppState,
    error::{ApiError, FieldError},
    models::UploadResponse,
    storage::{UploadKind, unique_filename},
};

/// Builds the public URL a stored file will be served back from. Honors
/// x-forwarded-proto so URLs come out https behind a TLS-terminating proxy.
fn public_url(headers: &HeaderMap, filename: &str) -> String {
    let proto = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("http");
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    format!("{proto}://{host}/uploads/{filename}")
}

fn missing_file() -> ApiError {
    ApiError::Validation(vec![FieldError {
        field: "file".to_string(),
        message: "No file uploaded".to_string(),
    }])
}

/// upload_media
///
/// [Admin Route] Accepts one multipart file field named `image` (PNG/JPEG,
/// 5 MiB) or `audio` (MP3/M4A/WAV, 25 MiB). The file is stored under a
/// sanitized, timestamped name and answered with its public URL.
///
/// Failure modes: 415 for a MIME type outside the field's allow-list, 413
/// over the size ceiling, 400 when no recognized field is present.
#[utoipa::path(
    post,
    path = "/admin/uploads",
    request_body(content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Stored", body = UploadResponse),
        (status = 400, description = "No file uploaded"),
        (status = 413, description = "File too large"),
        (status = 415, description = "Unsupported file type")
    )
)]
pub async fn upload_media(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| missing_file())?
    {
        let kind = match field.name() {
            Some("image") => UploadKind::Image,
            Some("audio") => UploadKind::Audio,
            _ => continue,
        };

        let content_type = field.content_type().unwrap_or("").to_string();
        let extension = kind.extension_for(&content_type).ok_or_else(|| {
            let shown = if content_type.is_empty() {
                "unknown"
            } else {
                content_type.as_str()
            };
            ApiError::UnsupportedMediaType(format!("Unsupported file type: {shown}"))
        })?;

        let original = field.file_name().unwrap_or("file").to_string();
        // The router's body limit backstops this; oversize fields abort the
        // read and both paths end in a 413.
        let bytes = field.bytes().await.map_err(|_| ApiError::PayloadTooLarge)?;
        if bytes.len() > kind.max_bytes() {
            return Err(ApiError::PayloadTooLarge);
        }

        let filename = unique_filename(&original, extension, Utc::now().timestamp_millis());
        state
            .uploads
            .save(&filename, &bytes)
            .await
            .map_err(ApiError::Internal)?;

        tracing::info!(file = %filename, bytes = bytes.len(), "stored upload");

        return Ok((
            StatusCode::CREATED,
            Json(UploadResponse {
                url: public_url(&headers, &filename),
            }),
        ));
    }

    Err(missing_file())
}
