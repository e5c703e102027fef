//! Runtime configuration for tunebox-server
//!
//! Built once at startup from the resolved root folder, the TOML bootstrap
//! file and command-line overrides, then handed to `AppState::new`.

use std::path::{Path, PathBuf};
use std::time::Duration;
use tunebox_common::config::{
    RootFolderInitializer, TomlConfig, DEFAULT_ADMIN_USERNAME, DEFAULT_ALLOWED_EXTENSIONS,
    DEFAULT_BIND_ADDRESS, DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_PORT,
    DEFAULT_SESSION_IDLE_TIMEOUT_SECS,
};

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database_path: PathBuf,
    pub song_directory: PathBuf,
    pub bind_address: String,
    pub port: u16,
    /// Username allowed to upload and delete songs
    pub admin_username: String,
    /// Lowercase extensions without the dot
    pub allowed_extensions: Vec<String>,
    pub max_upload_bytes: usize,
    pub session_idle_timeout: Duration,
}

impl ServerConfig {
    /// Combine the root folder, TOML values and an optional port override
    pub fn new(root_folder: &Path, toml: &TomlConfig, port_override: Option<u16>) -> Self {
        let layout = RootFolderInitializer::new(root_folder.to_path_buf());

        let allowed_extensions = toml
            .allowed_extensions
            .clone()
            .unwrap_or_else(|| DEFAULT_ALLOWED_EXTENSIONS.iter().map(|s| s.to_string()).collect());

        Self {
            database_path: layout.database_path(),
            song_directory: layout.song_directory(),
            bind_address: toml
                .bind_address
                .clone()
                .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string()),
            port: port_override.or(toml.port).unwrap_or(DEFAULT_PORT),
            admin_username: toml
                .admin_username
                .clone()
                .unwrap_or_else(|| DEFAULT_ADMIN_USERNAME.to_string()),
            allowed_extensions,
            max_upload_bytes: toml.max_upload_bytes.unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            session_idle_timeout: Duration::from_secs(
                toml.session_idle_timeout_secs
                    .unwrap_or(DEFAULT_SESSION_IDLE_TIMEOUT_SECS),
            ),
        }
    }

    /// Defaults for everything but the root folder
    pub fn with_root(root_folder: &Path) -> Self {
        Self::new(root_folder, &TomlConfig::default(), None)
    }

    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}
