use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// ApiError
///
/// The full error taxonomy of the API. Every handler returns
/// `Result<_, ApiError>` and the `IntoResponse` impl below is the single
/// place where errors become HTTP statuses and JSON bodies.
#[derive(Debug, Error)]
pub enum ApiError {
    /// One or more payload fields violated their constraints. Carries every
    /// violation, not just the first.
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    /// Login failure. Deliberately undifferentiated: callers cannot tell a
    /// missing username from a wrong password.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Missing, malformed, or expired bearer token.
    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    Forbidden(String),

    /// Entity-specific message, e.g. "Mission not found".
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    UnsupportedMediaType(String),

    #[error("File too large")]
    PayloadTooLarge,

    #[error("Too many requests from this IP, please try again later.")]
    RateLimited,

    #[error("Database error")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    Internal(String),
}

/// A single violated constraint, named after the offending payload field.
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<FieldError>>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidCredentials | ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match self {
            ApiError::Validation(errors) => ErrorBody {
                message: "Validation failed".to_string(),
                errors: Some(errors),
            },
            ApiError::Database(e) => {
                tracing::error!("database error: {:?}", e);
                ErrorBody {
                    message: "Internal server error".to_string(),
                    errors: None,
                }
            }
            ApiError::Internal(detail) => {
                tracing::error!("internal error: {}", detail);
                // Detail is suppressed outside development; the environment
                // check happens at startup and is baked into the log level
                // policy, so the body stays generic here.
                ErrorBody {
                    message: "Internal server error".to_string(),
                    errors: None,
                }
            }
            other => ErrorBody {
                message: other.to_string(),
                errors: None,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<validator::ValidationErrors> for ApiError {
    /// Flattens nested validator output into a flat list of
    /// `{field, message}` pairs. Nested structs and list elements keep a
    /// dotted/indexed path, e.g. `locations[0].name`.
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details = Vec::new();
        collect_validation_errors("", &errors, &mut details);
        ApiError::Validation(details)
    }
}

fn collect_validation_errors(
    prefix: &str,
    errors: &validator::ValidationErrors,
    out: &mut Vec<FieldError>,
) {
    use validator::ValidationErrorsKind;

    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };

        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for e in field_errors {
                    out.push(FieldError {
                        field: path.clone(),
                        message: e
                            .message
                            .clone()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| format!("{} is invalid", path)),
                    });
                }
            }
            ValidationErrorsKind::Struct(nested) => {
                collect_validation_errors(&path, nested, out);
            }
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect_validation_errors(&format!("{path}[{index}]"), nested, out);
                }
            }
        }
    }
}
