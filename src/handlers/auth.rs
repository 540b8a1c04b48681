use axum::{Json, extract::State, http::StatusCode};
use validator::Validate;

use crate::{
    AppState,
    auth::{hash_password, issue_token, verify_password},
    config::Env,
    error::ApiError,
    models::{CreateAdminRequest, CreateAdminResponse, LoginRequest, LoginResponse, PublicUser},
};

/// login
///
/// [Public Route] Exchanges credentials for a 24-hour bearer token. Failures
/// are deliberately undifferentiated: an unknown username and a wrong
/// password both produce the same 401.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    payload.validate()?;

    let user = state
        .repo
        .get_user_by_username(payload.username.trim())
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    if !verify_password(&payload.password, &user.password_hash) {
        return Err(ApiError::InvalidCredentials);
    }

    let token = issue_token(user.id, &user.role, &state.config)?;
    tracing::info!(user = %user.username, "admin login");

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        token,
        user: PublicUser::from(&user),
    }))
}

/// create_admin
///
/// [Public Route, development only] Bootstraps an admin account. Hard 403 in
/// production regardless of payload; 409 when the username is taken.
#[utoipa::path(
    post,
    path = "/auth/create-admin",
    request_body = CreateAdminRequest,
    responses(
        (status = 201, description = "Admin created", body = CreateAdminResponse),
        (status = 403, description = "Disabled in production"),
        (status = 409, description = "Username taken")
    )
)]
pub async fn create_admin(
    State(state): State<AppState>,
    Json(payload): Json<CreateAdminRequest>,
) -> Result<(StatusCode, Json<CreateAdminResponse>), ApiError> {
    if state.config.env == Env::Production {
        return Err(ApiError::Forbidden("Not allowed in production".to_string()));
    }

    payload.validate()?;
    let username = payload.username.trim();

    if state.repo.get_user_by_username(username).await?.is_some() {
        return Err(ApiError::Conflict("Admin user already exists".to_string()));
    }

    let password_hash = hash_password(&payload.password)?;
    let user = state.repo.create_user(username, &password_hash, "admin").await?;
    tracing::info!(user = %user.username, "admin account created");

    Ok((
        StatusCode::CREATED,
        Json(CreateAdminResponse {
            message: "Admin user created successfully".to_string(),
            user: PublicUser::from(&user),
        }),
    ))
}
