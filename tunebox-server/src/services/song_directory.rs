//! Song directory: the blob namespace holding uploaded audio files
//!
//! Blobs are keyed by sanitized file name. Names are claimed with
//! `create_new`, so an upload never overwrites a blob another catalog row
//! may still reference; a taken name gets a numeric suffix instead.

use std::io;
use std::path::PathBuf;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// Upper bound on `name-N.ext` candidates tried for one upload
const MAX_NAME_ATTEMPTS: u32 = 1000;

/// Outcome of removing a blob
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlobRemoval {
    Removed,
    AlreadyAbsent,
}

#[derive(Debug, Clone)]
pub struct SongDirectory {
    root: PathBuf,
}

impl SongDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create the directory if it does not exist yet
    pub async fn ensure_exists(&self) -> io::Result<()> {
        fs::create_dir_all(&self.root).await
    }

    /// Write `bytes` under `file_name` (or a suffixed variant if taken)
    ///
    /// `file_name` must already be sanitized. Returns the name actually used.
    pub async fn store(&self, file_name: &str, bytes: &[u8]) -> io::Result<String> {
        for attempt in 0..MAX_NAME_ATTEMPTS {
            let candidate = candidate_name(file_name, attempt);
            let path = self.path_of(&candidate)?;

            let mut file = match OpenOptions::new().write(true).create_new(true).open(&path).await {
                Ok(file) => file,
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e),
            };

            if let Err(e) = write_blob(&mut file, bytes).await {
                drop(file);
                if let Err(cleanup) = fs::remove_file(&path).await {
                    warn!("Failed to remove partial blob {}: {}", path.display(), cleanup);
                }
                return Err(e);
            }

            if attempt > 0 {
                debug!("Blob name {} taken, stored as {}", file_name, candidate);
            }
            return Ok(candidate);
        }

        Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("no free blob name for {}", file_name),
        ))
    }

    /// Open a blob for streaming; a missing blob is `ErrorKind::NotFound`
    pub async fn open(&self, file_name: &str) -> io::Result<File> {
        File::open(self.path_of(file_name)?).await
    }

    /// Remove a blob, treating "already gone" as success
    pub async fn remove(&self, file_name: &str) -> io::Result<BlobRemoval> {
        match fs::remove_file(self.path_of(file_name)?).await {
            Ok(()) => Ok(BlobRemoval::Removed),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(BlobRemoval::AlreadyAbsent),
            Err(e) => Err(e),
        }
    }

    /// Resolve a blob name to a path inside the directory
    ///
    /// Names containing separators or parent references never resolve.
    fn path_of(&self, file_name: &str) -> io::Result<PathBuf> {
        if file_name.is_empty()
            || file_name.starts_with('.')
            || file_name.contains(|c: char| matches!(c, '/' | '\\' | '\0'))
        {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid blob name: {:?}", file_name),
            ));
        }
        Ok(self.root.join(file_name))
    }
}

async fn write_blob(file: &mut File, bytes: &[u8]) -> io::Result<()> {
    file.write_all(bytes).await?;
    file.flush().await
}

fn candidate_name(file_name: &str, attempt: u32) -> String {
    if attempt == 0 {
        return file_name.to_string();
    }
    match split_extension(file_name) {
        (stem, Some(ext)) => format!("{}-{}.{}", stem, attempt, ext),
        (stem, None) => format!("{}-{}", stem, attempt),
    }
}

/// Split `name.ext` into stem and extension (without the dot)
pub fn split_extension(file_name: &str) -> (&str, Option<&str>) {
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => (stem, Some(ext)),
        _ => (file_name, None),
    }
}

/// Reduce an uploaded file name to a safe blob name
///
/// Path separators become spaces, whitespace runs become `_`, anything
/// outside ASCII `[A-Za-z0-9._-]` is dropped, and leading/trailing `.`/`_`
/// are trimmed. May return an empty string.
pub fn sanitize_filename(file_name: &str) -> String {
    let spaced: String = file_name
        .chars()
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");

    let filtered: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();

    filtered.trim_matches(|c: char| c == '.' || c == '_').to_string()
}

/// MIME type for serving a blob, by extension
pub fn content_type_for(file_name: &str) -> &'static str {
    let ext = split_extension(file_name).1.map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("ogg") | Some("oga") => "audio/ogg",
        Some("opus") => "audio/opus",
        Some("flac") => "audio/flac",
        Some("m4a") => "audio/mp4",
        Some("aac") => "audio/aac",
        _ => "application/octet-stream",
    }
}
