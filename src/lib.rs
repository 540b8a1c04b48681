use std::sync::Arc;

use axum::{
    Router,
    extract::{DefaultBodyLimit, FromRef, Request},
    http::{HeaderName, HeaderValue},
    middleware::{self, Next},
    response::Response,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod rate_limit;
pub mod repository;
pub mod routes;
pub mod storage;

use auth::AuthUser;
use rate_limit::rate_limit_middleware;
use routes::{admin, public};

// --- Public Re-exports ---

// Makes core state types easily accessible to main.rs and the test suite.
pub use config::{AppConfig, Env};
pub use error::ApiError;
pub use rate_limit::RateLimiterState;
pub use repository::{MemoryRepository, PostgresRepository, RepositoryState};
pub use storage::{LocalDiskStore, MockUploadStore, UploadStoreState};

/// Multipart ceiling: the 25 MiB audio limit plus encoding overhead.
/// Per-kind limits are enforced in the upload handler.
const MAX_UPLOAD_BODY_BYTES: usize = 26 * 1024 * 1024;

/// ApiDoc
///
/// Auto-generates the OpenAPI document from the `#[utoipa::path]` and
/// `ToSchema` annotations. Served at `/api-docs/openapi.json` and browsable
/// at `/swagger-ui`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health_check,
        handlers::auth::login, handlers::auth::create_admin,
        handlers::sermons::list_sermons, handlers::sermons::get_sermon,
        handlers::sermons::list_all_sermons, handlers::sermons::create_sermon,
        handlers::sermons::update_sermon, handlers::sermons::delete_sermon,
        handlers::articles::list_published_articles, handlers::articles::get_published_article,
        handlers::articles::list_all_articles, handlers::articles::create_article,
        handlers::articles::update_article, handlers::articles::delete_article,
        handlers::missions::list_missions, handlers::missions::get_mission,
        handlers::missions::list_all_missions, handlers::missions::create_mission,
        handlers::missions::update_mission, handlers::missions::delete_mission,
        handlers::ministries::list_ministries, handlers::ministries::get_ministry,
        handlers::ministries::list_all_ministries, handlers::ministries::create_ministry,
        handlers::ministries::update_ministry, handlers::ministries::delete_ministry,
        handlers::contact::submit_contact, handlers::contact::list_contact_messages,
        handlers::contact::mark_message_read, handlers::contact::delete_contact_message,
        handlers::uploads::upload_media,
        handlers::stats::get_stats,
    ),
    components(
        schemas(
            models::Sermon, models::SermonPayload, models::SermonList,
            models::Article, models::ArticlePayload, models::ArticleList,
            models::Mission, models::MissionPayload, models::MissionLocation,
            models::Coordinates, models::MissionUpdate,
            models::Ministry, models::MinistryPayload,
            models::ContactMessage, models::ContactPayload, models::ContactList,
            models::ContactSubmitResponse,
            models::LoginRequest, models::LoginResponse, models::PublicUser,
            models::CreateAdminRequest, models::CreateAdminResponse,
            models::MessageResponse, models::UploadResponse,
            models::DashboardStats, models::Pagination,
            handlers::HealthResponse,
        )
    ),
    tags(
        (name = "church-api", description = "Church website and dashboard API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single, thread-safe container holding all application services and
/// configuration, shared across every request.
#[derive(Clone)]
pub struct AppState {
    /// Repository layer: persistence behind a trait object.
    pub repo: RepositoryState,
    /// Upload store: where media files land.
    pub uploads: UploadStoreState,
    /// Loaded, immutable environment configuration.
    pub config: AppConfig,
    /// Per-IP request ceiling.
    pub rate_limiter: Arc<RateLimiterState>,
}

impl AppState {
    pub fn new(repo: RepositoryState, uploads: UploadStoreState, config: AppConfig) -> Self {
        let rate_limiter = Arc::new(RateLimiterState::new(
            config.rate_limit_window_secs,
            config.rate_limit_max_requests,
        ));
        Self {
            repo,
            uploads,
            config,
            rate_limiter,
        }
    }
}

// These let extractors pull individual services out of the shared state.

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for UploadStoreState {
    fn from_ref(app_state: &AppState) -> UploadStoreState {
        app_state.uploads.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Gate for the protected admin routes. Extracting `AuthUser` performs the
/// whole check: a missing, malformed, or expired token rejects the request
/// with 401 before the handler runs.
pub async fn auth_middleware(_auth_user: AuthUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the full routing tree, applies the middleware stack, and
/// registers the application state.
pub fn create_router(state: AppState) -> Router {
    // CORS: pinned to the configured frontend origin when one is set,
    // permissive otherwise (development).
    let cors = match state
        .config
        .frontend_url
        .as_deref()
        .and_then(|origin| origin.parse::<HeaderValue>().ok())
    {
        Some(origin) => CorsLayer::new()
            .allow_methods(Any)
            .allow_headers(Any)
            .allow_origin(origin),
        None => CorsLayer::new()
            .allow_methods(Any)
            .allow_headers(Any)
            .allow_origin(Any),
    };

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        // Auto-generated API documentation.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Public site routes, no auth.
        .merge(public::public_routes())
        // Dashboard API; everything but /admin/login is token-gated inside.
        .nest("/admin", admin::admin_routes(state.clone()))
        // Stored uploads served back as static files.
        .nest_service("/uploads", ServeDir::new(&state.config.uploads_dir))
        // Unknown paths answer JSON, not an HTML error page.
        .fallback(handlers::not_found)
        // Blanket per-IP ceiling across the whole API.
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BODY_BYTES))
        .with_state(state);

    // Observability and correlation layers, outermost.
    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Span factory for TraceLayer: correlates every log line of a request with
/// its generated x-request-id.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
