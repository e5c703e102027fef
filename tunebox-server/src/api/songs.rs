//! Song endpoints
//!
//! | Route              | Session        |
//! |--------------------|----------------|
//! | POST /upload       | admin          |
//! | DELETE /songs/:id  | admin          |
//! | GET /songs         | any            |
//! | GET /songs/:id     | any            |
//! | GET /play/:id      | none           |
//!
//! `/play/:id` is public; the metadata routes require a session.

use axum::{
    body::Body,
    extract::{
        multipart::MultipartRejection,
        rejection::PathRejection,
        Multipart, Path, State,
    },
    http::header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tokio_util::io::ReaderStream;
use tunebox_common::db::{Song, SongId};

use super::session::Session;
use crate::services::{Role, UploadForm, UploadedFile};
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    #[serde(flatten)]
    pub song: Song,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// POST /upload
///
/// **Request:** multipart form with `file`, `title`, `author`, `duration`
///
/// **Errors:**
/// - 401 / 403: no session / not the admin
/// - 400: missing file, invalid duration, unsupported format
/// - 413: body over the configured upload limit
pub async fn upload_song(
    State(state): State<AppState>,
    Session(session): Session,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<UploadResponse>> {
    // Gate before touching the body
    let grant = state.gate.require(&session, Role::Admin).await?;

    let multipart = multipart.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let form = read_upload_form(multipart).await?;
    let song = state.library.upload(&grant, form).await?;

    Ok(Json(UploadResponse {
        message: "Song uploaded successfully".to_string(),
        song,
    }))
}

/// Collect the known form fields; unknown fields are skipped
async fn read_upload_form(mut multipart: Multipart) -> ApiResult<UploadForm> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await? {
        match field.name() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await?;
                form.file = Some(UploadedFile {
                    file_name,
                    bytes: bytes.to_vec(),
                });
            }
            Some("title") => form.title = Some(field.text().await?),
            Some("author") => form.author = Some(field.text().await?),
            Some("duration") => form.duration = Some(field.text().await?),
            _ => {}
        }
    }

    Ok(form)
}

/// GET /songs
pub async fn list_songs(
    State(state): State<AppState>,
    Session(session): Session,
) -> ApiResult<Json<Vec<Song>>> {
    let grant = state.gate.require(&session, Role::Listener).await?;
    Ok(Json(state.library.list(&grant).await?))
}

/// GET /songs/:id
pub async fn get_song(
    State(state): State<AppState>,
    Session(session): Session,
    path: Result<Path<SongId>, PathRejection>,
) -> ApiResult<Json<Song>> {
    let grant = state.gate.require(&session, Role::Listener).await?;
    let Path(song_id) = path?;
    Ok(Json(state.library.get(&grant, song_id).await?))
}

/// DELETE /songs/:id
///
/// Succeeds even when the song file could not be removed; the response then
/// carries a `warning`.
pub async fn delete_song(
    State(state): State<AppState>,
    Session(session): Session,
    path: Result<Path<SongId>, PathRejection>,
) -> ApiResult<Json<DeleteResponse>> {
    let grant = state.gate.require(&session, Role::Admin).await?;
    let Path(song_id) = path?;
    let outcome = state.library.delete(&grant, song_id).await?;

    Ok(Json(DeleteResponse {
        message: "Song deleted successfully".to_string(),
        warning: outcome.warning(),
    }))
}

/// GET /play/:id
///
/// Streams the song file. No session required.
pub async fn play_song(
    State(state): State<AppState>,
    path: Result<Path<SongId>, PathRejection>,
) -> ApiResult<Response> {
    let Path(song_id) = path?;
    let stream = state.library.play(song_id).await?;

    let headers = [
        (CONTENT_TYPE, stream.content_type.to_string()),
        (CONTENT_LENGTH, stream.content_length.to_string()),
        (
            CONTENT_DISPOSITION,
            format!("inline; filename=\"{}\"", stream.song.file_reference),
        ),
    ];
    let body = Body::from_stream(ReaderStream::new(stream.file));

    Ok((headers, body).into_response())
}

/// Build song routes
pub fn song_routes() -> Router<AppState> {
    Router::new()
        .route("/upload", post(upload_song))
        .route("/songs", get(list_songs))
        .route("/songs/:id", get(get_song).delete(delete_song))
        .route("/play/:id", get(play_song))
}
