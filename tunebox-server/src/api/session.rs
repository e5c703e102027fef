//! Session cookie handling
//!
//! The `Session` extractor reads the `tunebox_session` cookie and resolves it
//! against the in-memory `SessionStore`. It never rejects: a missing or
//! unknown token yields an unauthenticated identity, and each handler decides
//! what that means.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::COOKIE, request::Parts, HeaderMap},
};
use std::convert::Infallible;
use uuid::Uuid;

use crate::services::SessionIdentity;
use crate::AppState;

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "tunebox_session";

/// Session identity of the current request
#[derive(Debug, Clone, Copy)]
pub struct Session(pub SessionIdentity);

#[async_trait]
impl FromRequestParts<AppState> for Session {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let identity = match session_token(&parts.headers) {
            Some(token) => state.sessions.resolve(token).await,
            None => SessionIdentity::anonymous(),
        };
        Ok(Session(identity))
    }
}

/// Extract the session token from the Cookie header(s)
pub fn session_token(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}

/// Set-Cookie value establishing a session
pub fn session_cookie(token: Uuid) -> String {
    format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, token)
}

/// Set-Cookie value clearing the session cookie
pub fn expired_session_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}
