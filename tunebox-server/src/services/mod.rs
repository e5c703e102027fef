//! Business services
//!
//! Everything here is free of HTTP concerns; `crate::api` wraps these with
//! axum extractors and responses.

pub mod authorization;
pub mod catalog;
pub mod identity;
pub mod library;
pub mod sessions;
pub mod song_directory;

pub use authorization::{authorize, AccessGate, Authorization, AuthorizationError, Grant, Role};
pub use catalog::{CatalogError, CatalogService};
pub use identity::{IdentityError, IdentityService};
pub use library::{DeleteOutcome, Library, LibraryError, SongStream, UploadForm, UploadedFile};
pub use sessions::{SessionIdentity, SessionStore};
pub use song_directory::SongDirectory;
