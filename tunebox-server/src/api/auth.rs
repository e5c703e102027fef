//! Account endpoints: register, login, logout
//!
//! POST /register, POST /login, POST /logout

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header::SET_COOKIE, StatusCode},
    response::{AppendHeaders, IntoResponse},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use tunebox_common::db::UserId;

use super::session::{expired_session_cookie, session_cookie, Session};
use crate::services::IdentityError;
use crate::{ApiError, ApiResult, AppState};

/// Request payload for register and login
///
/// Both fields are optional at the serde level so that a missing field is
/// answered with our own 400 rather than the extractor's rejection.
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: String,
    pub id: UserId,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// POST /register
///
/// **Request:** `{"username": "...", "password": "..."}`
///
/// **Errors:**
/// - 400 Bad Request: username or password missing/empty
/// - 409 Conflict: username already exists
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    let Json(payload) = payload?;
    let (username, password) = match (payload.username, payload.password) {
        (Some(u), Some(p)) if !u.is_empty() && !p.is_empty() => (u, p),
        _ => {
            return Err(ApiError::BadRequest(
                "Username and password are required".to_string(),
            ))
        }
    };

    let id = state.identity.register(&username, &password).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully".to_string(),
            id,
        }),
    ))
}

/// POST /login
///
/// Verifies credentials and binds a fresh session token to the user,
/// replacing any token the client already presented.
///
/// **Errors:**
/// - 401 Unauthorized: unknown username or wrong password (same message)
pub async fn login(
    State(state): State<AppState>,
    Session(session): Session,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(payload) = payload?;
    let username = payload.username.unwrap_or_default();
    let password = payload.password.unwrap_or_default();

    let user_id = match state.identity.verify(&username, &password).await {
        Ok(user_id) => user_id,
        Err(IdentityError::InvalidCredentials) => {
            warn!(username = %username, "Failed login");
            return Err(IdentityError::InvalidCredentials.into());
        }
        Err(e) => return Err(e.into()),
    };

    let token = state.sessions.establish(user_id, session.token).await;
    info!(user_id, "Login successful");

    Ok((
        AppendHeaders([(SET_COOKIE, session_cookie(token))]),
        Json(MessageResponse {
            message: "Login successful".to_string(),
        }),
    ))
}

/// POST /logout
///
/// **Errors:**
/// - 401 Unauthorized: no active session
pub async fn logout(
    State(state): State<AppState>,
    Session(session): Session,
) -> ApiResult<impl IntoResponse> {
    let (Some(token), Some(user_id)) = (session.token, session.user_id) else {
        return Err(ApiError::Unauthenticated("Authentication required".to_string()));
    };

    state.sessions.clear(token).await;
    info!(user_id, "Logged out");

    Ok((
        AppendHeaders([(SET_COOKIE, expired_session_cookie())]),
        Json(MessageResponse {
            message: "Logged out successfully".to_string(),
        }),
    ))
}

/// Build account routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
}
