pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::db::Database;
use crate::services::sessions::{SessionRegistry, DEFAULT_COMPLETED_TTL};

/// How often expired quiz sessions are swept out
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub sessions: Arc<SessionRegistry>,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        Self::with_sessions(db, SessionRegistry::new())
    }

    pub fn with_sessions(db: Database, sessions: SessionRegistry) -> Self {
        Self {
            db: Arc::new(db),
            sessions: Arc::new(sessions),
        }
    }
}

/// Build the API router
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        // Notebook routes
        .route(
            "/api/notebooks",
            get(routes::notebooks::list).post(routes::notebooks::create),
        )
        .route(
            "/api/notebooks/:id",
            get(routes::notebooks::get)
                .put(routes::notebooks::update)
                .delete(routes::notebooks::delete),
        )
        .route("/api/notebooks/:id/pin", post(routes::notebooks::toggle_pin))
        // Card routes
        .route(
            "/api/notebooks/:id/cards",
            get(routes::cards::list_in_notebook).post(routes::cards::create),
        )
        .route(
            "/api/notebooks/:id/cards/batch",
            post(routes::cards::batch_create),
        )
        .route("/api/cards", get(routes::cards::search))
        .route(
            "/api/cards/:id",
            put(routes::cards::update).delete(routes::cards::delete),
        )
        .route("/api/import/preview", post(routes::cards::preview_import))
        // Quiz routes
        .route("/api/quiz", post(routes::quiz::start))
        .route(
            "/api/quiz/:id",
            get(routes::quiz::progress).delete(routes::quiz::abandon),
        )
        .route("/api/quiz/:id/grade", post(routes::quiz::grade))
        .route("/api/quiz/:id/summary", get(routes::quiz::summary));

    Router::new()
        .route("/health", get(health_check))
        .merge(api)
        .with_state(state)
}

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    tracing::info!("Connecting to database...");
    let db = Database::connect(&config.database_url, config.max_connections).await?;

    tracing::info!("Running migrations...");
    db.run_migrations().await?;

    let sessions = SessionRegistry::with_ttls(
        Duration::from_secs(config.session_idle_secs),
        DEFAULT_COMPLETED_TTL,
    );
    let state = AppState::with_sessions(db, sessions);
    spawn_session_sweeper(state.sessions.clone());

    let app = router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr = config.bind_addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}

fn spawn_session_sweeper(sessions: Arc<SessionRegistry>) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SESSION_SWEEP_INTERVAL);
        loop {
            ticker.tick().await;
            let removed = sessions.sweep().await;
            if removed > 0 {
                tracing::debug!(removed, "Swept expired quiz sessions");
            }
        }
    });
}
