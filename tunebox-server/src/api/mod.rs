//! HTTP API handlers for tunebox-server
//!
//! Handlers are thin: extract the session, run the gate where required,
//! call one service method, shape the JSON.

pub mod auth;
pub mod health;
pub mod session;
pub mod songs;

pub use auth::auth_routes;
pub use health::health_routes;
pub use session::{Session, SESSION_COOKIE};
pub use songs::song_routes;
