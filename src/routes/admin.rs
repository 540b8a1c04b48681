use crate::{AppState, auth_middleware, handlers};
use axum::{
    Router, middleware,
    routing::{delete, get, patch, post, put},
};

/// Admin Router Module
///
/// The dashboard API, nested under /admin by the top-level router. Every
/// route except POST /admin/login is wrapped in the bearer-token middleware;
/// the route_layer only fires for matched routes, so unknown /admin paths
/// still 404 instead of 401.
pub fn admin_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        // GET /admin/stats
        // Dashboard headline counts.
        .route("/stats", get(handlers::stats::get_stats))
        // POST /admin/uploads
        // Multipart media intake (image or audio field).
        .route("/uploads", post(handlers::uploads::upload_media))
        // Sermons CRUD. The admin listing is unpaged.
        .route("/sermons", get(handlers::sermons::list_all_sermons))
        .route("/sermons", post(handlers::sermons::create_sermon))
        .route("/sermons/{id}", put(handlers::sermons::update_sermon))
        .route("/sermons/{id}", delete(handlers::sermons::delete_sermon))
        // Articles CRUD. The admin listing includes drafts.
        .route("/articles", get(handlers::articles::list_all_articles))
        .route("/articles", post(handlers::articles::create_article))
        .route("/articles/{id}", put(handlers::articles::update_article))
        .route("/articles/{id}", delete(handlers::articles::delete_article))
        // Missions CRUD.
        .route("/missions", get(handlers::missions::list_all_missions))
        .route("/missions", post(handlers::missions::create_mission))
        .route("/missions/{id}", put(handlers::missions::update_mission))
        .route("/missions/{id}", delete(handlers::missions::delete_mission))
        // Ministries CRUD.
        .route("/ministries", get(handlers::ministries::list_all_ministries))
        .route("/ministries", post(handlers::ministries::create_ministry))
        .route("/ministries/{id}", put(handlers::ministries::update_ministry))
        .route(
            "/ministries/{id}",
            delete(handlers::ministries::delete_ministry),
        )
        // Contact inbox.
        .route(
            "/contact-messages",
            get(handlers::contact::list_contact_messages),
        )
        .route(
            "/contact-messages/{id}/read",
            patch(handlers::contact::mark_message_read),
        )
        .route(
            "/contact-messages/{id}",
            delete(handlers::contact::delete_contact_message),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        // POST /admin/login
        // Same handler as /auth/login; the dashboard frontend talks to the
        // admin prefix only.
        .route("/login", post(handlers::auth::login))
        .merge(protected)
}
