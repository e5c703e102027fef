//! tunebox-server library interface
//!
//! Media catalog backend: user accounts, admin-only song upload/delete,
//! session-gated metadata reads and public audio streaming.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod services;

pub use crate::config::ServerConfig;
pub use crate::error::{ApiError, ApiResult};

use axum::extract::DefaultBodyLimit;
use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::services::{
    AccessGate, CatalogService, IdentityService, Library, SessionStore, SongDirectory,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub identity: IdentityService,
    pub gate: AccessGate,
    pub library: Library,
    pub sessions: SessionStore,
    /// Service startup timestamp for uptime reporting
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(db: SqlitePool, config: ServerConfig) -> Self {
        let identity = IdentityService::new(db.clone());
        let catalog = CatalogService::new(db);
        let gate = AccessGate::new(identity.clone(), config.admin_username.as_str());
        let library = Library::new(
            catalog,
            SongDirectory::new(&config.song_directory),
            &config.allowed_extensions,
        );
        let sessions = SessionStore::new(config.session_idle_timeout);

        Self {
            config: Arc::new(config),
            identity,
            gate,
            library,
            sessions,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    let max_upload_bytes = state.config.max_upload_bytes;

    Router::new()
        .merge(api::auth_routes())
        .merge(api::song_routes())
        .merge(api::health_routes())
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
