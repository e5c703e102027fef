//! # tunebox common library
//!
//! Shared code for the tunebox workspace:
//! - Error type used by every layer below the HTTP boundary
//! - Bootstrap configuration (TOML file + root folder resolution)
//! - Database initialization and row models for `users` and `songs`

pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
