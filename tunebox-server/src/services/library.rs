//! Upload/Serve Workflow
//!
//! Composes the Authorization Gate (via `Grant`), the Catalog Service and the
//! song directory:
//! - upload: validate, store blob, insert row
//! - delete: look up row, remove blob (best effort), remove row
//! - play: resolve row, open blob for streaming (no session required)
//!
//! Upload validation order: file present, duration, extension. All three
//! checks run before any blob or row is written.

use std::io;
use std::sync::Arc;
use thiserror::Error;
use tokio::fs::File;
use tracing::{error, info, warn};
use tunebox_common::db::{Song, SongId};
use tunebox_common::Error as StoreError;

use super::authorization::{AuthorizationError, Grant, Role};
use super::catalog::{CatalogError, CatalogService};
use super::song_directory::{
    content_type_for, sanitize_filename, split_extension, BlobRemoval, SongDirectory,
};

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("No file part")]
    MissingFile,

    #[error("Invalid duration provided")]
    InvalidDuration,

    #[error("Invalid file format: {0}")]
    UnsupportedFormat(String),

    #[error("Song not found: {0}")]
    NotFound(SongId),

    /// Row exists but its blob is gone from the song directory
    #[error("Song file not found: {0}")]
    BlobMissing(String),

    #[error(transparent)]
    Authorization(#[from] AuthorizationError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Song directory error: {0}")]
    Io(#[from] io::Error),
}

impl From<CatalogError> for LibraryError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound(id) => LibraryError::NotFound(id),
            CatalogError::Store(e) => LibraryError::Store(e),
        }
    }
}

/// File part of an upload form
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Name as sent by the client, unsanitized
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Raw upload form fields, exactly as received
#[derive(Debug, Clone, Default)]
pub struct UploadForm {
    pub file: Option<UploadedFile>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub duration: Option<String>,
}

/// What happened to the blob during a delete
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlobCleanup {
    Removed,
    AlreadyAbsent,
    /// Removal hit a real I/O error; the row was still deleted
    Failed,
}

#[derive(Debug, Clone)]
pub struct DeleteOutcome {
    pub song: Song,
    pub blob: BlobCleanup,
}

impl DeleteOutcome {
    /// Warning to surface to the caller when the blob could not be removed
    pub fn warning(&self) -> Option<String> {
        match self.blob {
            BlobCleanup::Failed => Some(format!(
                "Song file {} could not be removed and may need manual cleanup",
                self.song.file_reference
            )),
            BlobCleanup::Removed | BlobCleanup::AlreadyAbsent => None,
        }
    }
}

/// An opened blob ready to stream
#[derive(Debug)]
pub struct SongStream {
    pub song: Song,
    pub file: File,
    pub content_type: &'static str,
    pub content_length: u64,
}

#[derive(Clone)]
pub struct Library {
    catalog: CatalogService,
    songs: SongDirectory,
    allowed_extensions: Arc<[String]>,
}

impl Library {
    pub fn new(catalog: CatalogService, songs: SongDirectory, allowed_extensions: &[String]) -> Self {
        let allowed_extensions = allowed_extensions
            .iter()
            .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
            .collect::<Vec<_>>()
            .into();
        Self {
            catalog,
            songs,
            allowed_extensions,
        }
    }

    pub fn song_directory(&self) -> &SongDirectory {
        &self.songs
    }

    /// Store an uploaded file and create its catalog row (admin only)
    pub async fn upload(&self, grant: &Grant, form: UploadForm) -> Result<Song, LibraryError> {
        grant.ensure(Role::Admin)?;

        // (a) file present
        let file = form
            .file
            .filter(|f| !f.file_name.is_empty())
            .ok_or(LibraryError::MissingFile)?;

        // (b) duration is a non-negative integer
        let duration = parse_duration(form.duration.as_deref())?;

        // (c) extension on the allow-list
        let file_name = sanitize_filename(&file.file_name);
        if !self.is_allowed(&file_name) {
            return Err(LibraryError::UnsupportedFormat(file.file_name));
        }

        let stored_name = self.songs.store(&file_name, &file.bytes).await?;

        let title = form.title.unwrap_or_default();
        let author = form.author.unwrap_or_default();
        match self.catalog.add(&title, &author, duration, &stored_name).await {
            Ok(song) => {
                info!(
                    song_id = song.id,
                    user_id = grant.user_id(),
                    "Uploaded {} ({} bytes)",
                    song.file_reference,
                    file.bytes.len()
                );
                Ok(song)
            }
            Err(e) => {
                // No row will reference the blob, so take it back out
                if let Err(cleanup) = self.songs.remove(&stored_name).await {
                    error!("Failed to remove orphaned blob {}: {}", stored_name, cleanup);
                }
                Err(e.into())
            }
        }
    }

    /// Remove a song's blob and row (admin only)
    ///
    /// A blob that is already gone is fine. A real I/O failure on the blob
    /// does not block the row deletion; it is reported in the outcome.
    pub async fn delete(&self, grant: &Grant, song_id: SongId) -> Result<DeleteOutcome, LibraryError> {
        grant.ensure(Role::Admin)?;

        let song = self.catalog.get(song_id).await?;

        let blob = match self.songs.remove(&song.file_reference).await {
            Ok(BlobRemoval::Removed) => BlobCleanup::Removed,
            Ok(BlobRemoval::AlreadyAbsent) => {
                warn!("Blob {} for song {} was already absent", song.file_reference, song_id);
                BlobCleanup::AlreadyAbsent
            }
            Err(e) => {
                warn!(
                    "Failed to remove blob {} for song {}: {}",
                    song.file_reference, song_id, e
                );
                BlobCleanup::Failed
            }
        };

        self.catalog.delete(song_id).await?;
        info!(song_id, user_id = grant.user_id(), "Deleted song {}", song.title);

        Ok(DeleteOutcome { song, blob })
    }

    pub async fn get(&self, grant: &Grant, song_id: SongId) -> Result<Song, LibraryError> {
        grant.ensure(Role::Listener)?;
        Ok(self.catalog.get(song_id).await?)
    }

    pub async fn list(&self, grant: &Grant) -> Result<Vec<Song>, LibraryError> {
        grant.ensure(Role::Listener)?;
        Ok(self.catalog.list().await?)
    }

    /// Open a song's blob for streaming
    ///
    /// Public: takes no grant. The row must exist; the blob's existence is
    /// whatever the song directory reports.
    pub async fn play(&self, song_id: SongId) -> Result<SongStream, LibraryError> {
        let song = self.catalog.get(song_id).await?;

        let file = match self.songs.open(&song.file_reference).await {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(LibraryError::BlobMissing(song.file_reference));
            }
            Err(e) => return Err(e.into()),
        };
        let content_length = file.metadata().await?.len();

        Ok(SongStream {
            content_type: content_type_for(&song.file_reference),
            song,
            file,
            content_length,
        })
    }

    fn is_allowed(&self, file_name: &str) -> bool {
        match split_extension(file_name) {
            (_, Some(ext)) => {
                let ext = ext.to_ascii_lowercase();
                self.allowed_extensions.iter().any(|allowed| *allowed == ext)
            }
            (_, None) => false,
        }
    }
}

/// Parse a duration form field: ASCII digits only, must fit in i64
pub fn parse_duration(raw: Option<&str>) -> Result<i64, LibraryError> {
    let raw = raw.ok_or(LibraryError::InvalidDuration)?;
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(LibraryError::InvalidDuration);
    }
    raw.parse::<i64>().map_err(|_| LibraryError::InvalidDuration)
}
