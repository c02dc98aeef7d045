pub mod auth;
pub mod chat;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod pages;
pub mod policy;
pub mod res;
pub mod restaurants;
pub mod reviews;
pub mod session;
pub mod store;
pub mod uploads;
pub mod users;

use axum::Router;
use axum::extract::FromRef;
use axum::routing::get;
use sqlx::SqlitePool;
use tokio::sync::broadcast;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tower_sessions::cookie::SameSite;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

pub use config::Config;
pub use error::{AppError, AppResult};
use uploads::UploadStore;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub chat_tx: broadcast::Sender<String>,
    pub uploads: UploadStore,
    pub config: Config,
}

impl AppState {
    pub fn new(db_pool: SqlitePool, config: Config) -> AppState {
        AppState {
            db_pool,
            chat_tx: broadcast::channel(64).0,
            uploads: UploadStore::new(config.upload_dir.clone()),
            config,
        }
    }
}

/// Builds the full application, session layer included, so tests exercise
/// the same router `main` serves.
pub fn app(state: AppState) -> Router {
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_name("session")
        .with_secure(false)
        .with_http_only(true)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::days(7)));

    Router::new()
        .route("/", get(pages::index))
        .route("/home", get(pages::home))
        .merge(auth::router())
        .nest("/restaurants", restaurants::router())
        .nest("/chat", chat::router())
        .nest("/users", users::router())
        .nest_service("/uploads", ServeDir::new(state.uploads.root().to_path_buf()))
        .with_state(state)
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
}
