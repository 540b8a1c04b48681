use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Unauthenticated endpoints for the public website. Read handlers only
/// surface content meant to be visible: published articles, active
/// ministries. Drafts and deactivated records 404 here.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe with a JSON body for monitors and load balancers.
        .route("/health", get(handlers::health_check))
        // POST /auth/login
        // Credential exchange for a bearer token.
        .route("/auth/login", post(handlers::auth::login))
        // POST /auth/create-admin
        // Development-only bootstrap; hard 403 in production.
        .route("/auth/create-admin", post(handlers::auth::create_admin))
        // GET /sermons?category=&speaker=&search=&page=&limit=
        // Paged sermon listing, newest first.
        .route("/sermons", get(handlers::sermons::list_sermons))
        // Article reads live under the sermons prefix, which the public
        // frontend treats as one "teaching" section. Registered before
        // /sermons/{id} so "articles" is never parsed as a sermon id.
        .route(
            "/sermons/articles",
            get(handlers::articles::list_published_articles),
        )
        .route(
            "/sermons/articles/{id}",
            get(handlers::articles::get_published_article),
        )
        // GET /sermons/{id}
        .route("/sermons/{id}", get(handlers::sermons::get_sermon))
        // GET /missions?status=&location=&limit=
        // Bare array, newest start date first, default cap 20.
        .route("/missions", get(handlers::missions::list_missions))
        .route("/missions/{id}", get(handlers::missions::get_mission))
        // GET /ministries?ageGroup=&search=
        // Active ministries only, sorted by name.
        .route("/ministries", get(handlers::ministries::list_ministries))
        .route("/ministries/{id}", get(handlers::ministries::get_ministry))
        // POST /contact
        // Contact-form intake; stores the message unread.
        .route("/contact", post(handlers::contact::submit_contact))
}
