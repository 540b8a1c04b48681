use std::net::SocketAddr;
use std::sync::Arc;

use church_api::{
    AppState,
    config::{AppConfig, Env},
    create_router,
    repository::{PostgresRepository, RepositoryState},
    storage::{LocalDiskStore, UploadStoreState},
};
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Asynchronous entry point: configuration, logging, database (with
/// migrations), upload store, and the HTTP server, in that order. Startup is
/// fail-fast: a missing database or secret aborts the process immediately.
#[tokio::main]
async fn main() {
    // Load .env before configuration is read.
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // RUST_LOG wins; otherwise a sensible development default.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "church_api=debug,tower_http=info,axum=trace".into());

    // Pretty output for humans in development, JSON for log aggregators in
    // production.
    match config.env {
        Env::Development => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.db_url)
        .await
        .expect("FATAL: Failed to connect to Postgres. Check DATABASE_URL.");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("FATAL: Database migration failed.");

    let repo = Arc::new(PostgresRepository::new(pool)) as RepositoryState;
    let uploads = Arc::new(LocalDiskStore::new(&config.uploads_dir)) as UploadStoreState;

    let port = config.port;
    let app_state = AppState::new(repo, uploads, config);
    // into_make_service_with_connect_info keeps peer addresses available to
    // the rate limiter.
    let app = create_router(app_state).into_make_service_with_connect_info::<SocketAddr>();

    let listener = TcpListener::bind(("0.0.0.0", port))
        .await
        .expect("FATAL: Failed to bind TCP listener.");

    tracing::info!("Listening on 0.0.0.0:{port}");
    tracing::info!("API documentation available at: http://localhost:{port}/swagger-ui");

    axum::serve(listener, app)
        .await
        .expect("FATAL: HTTP server exited with an error.");
}
