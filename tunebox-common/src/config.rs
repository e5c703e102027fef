//! Bootstrap configuration and root folder resolution
//!
//! Bootstrap settings come from an optional TOML file. Everything has a
//! compiled default, so a missing file only produces a warning.
//!
//! Root folder priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable `TUNEBOX_ROOT_FOLDER`
//! 3. TOML config file (`root_folder`)
//! 4. OS-dependent compiled default (fallback)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "TUNEBOX_ROOT_FOLDER";

/// Environment variable pointing at an explicit TOML config file
pub const CONFIG_FILE_ENV: &str = "TUNEBOX_CONFIG";

/// Database file name inside the root folder
pub const DATABASE_FILE_NAME: &str = "tunebox.db";

/// Blob namespace (song directory) inside the root folder
pub const SONG_DIRECTORY_NAME: &str = "songs";

pub const DEFAULT_PORT: u16 = 5780;
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1";
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg", "flac", "m4a", "aac"];
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;
pub const DEFAULT_SESSION_IDLE_TIMEOUT_SECS: u64 = 24 * 60 * 60;

/// Bootstrap configuration loaded from TOML file
///
/// Every field is optional; unset fields fall back to the compiled defaults
/// above. Changes require a restart.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Root folder holding the database and the song directory
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    /// HTTP server port
    #[serde(default)]
    pub port: Option<u16>,

    /// Address the HTTP server binds to
    #[serde(default)]
    pub bind_address: Option<String>,

    /// Username allowed to mutate the catalog
    #[serde(default)]
    pub admin_username: Option<String>,

    /// Accepted audio file extensions (lowercase, without the dot)
    #[serde(default)]
    pub allowed_extensions: Option<Vec<String>>,

    /// Maximum request body size for uploads
    #[serde(default)]
    pub max_upload_bytes: Option<usize>,

    /// Seconds a session may sit unused before it expires
    #[serde(default)]
    pub session_idle_timeout_secs: Option<u64>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Parse a TOML config file
    ///
    /// Fails if the file is unreadable or malformed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
    }

    /// Load the config file if one exists, otherwise use defaults
    ///
    /// A missing file logs a warning. A malformed file is still an error.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path.map(Path::to_path_buf).or_else(default_config_path) else {
            warn!("No config file location available, using defaults");
            return Ok(Self::default());
        };

        if !path.exists() {
            warn!("Config file not found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let config = Self::load(&path)?;
        info!("Loaded config file: {}", path.display());
        Ok(config)
    }
}

/// Default config file location
///
/// `TUNEBOX_CONFIG` if set, otherwise `<config dir>/tunebox/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_FILE_ENV) {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|d| d.join("tunebox").join("config.toml"))
}

/// Resolve the root folder following the priority order in the module docs
pub fn resolve_root_folder(cli_arg: Option<&Path>, toml_config: &TomlConfig) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Some(path) = &toml_config.root_folder {
        return path.clone();
    }

    // Priority 4: OS-dependent compiled default
    default_root_folder()
}

/// OS-dependent default root folder path
pub fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("tunebox"))
        .unwrap_or_else(|| PathBuf::from("./tunebox_data"))
}

/// Creates the root folder layout on first run
#[derive(Debug, Clone)]
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    /// Create the root folder and the song directory if missing
    pub fn ensure_directory_exists(&self) -> Result<()> {
        if !self.root_folder.exists() {
            info!("Creating root folder: {}", self.root_folder.display());
        }
        std::fs::create_dir_all(&self.root_folder)?;
        std::fs::create_dir_all(self.song_directory())?;
        Ok(())
    }

    pub fn root_folder(&self) -> &Path {
        &self.root_folder
    }

    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILE_NAME)
    }

    pub fn song_directory(&self) -> PathBuf {
        self.root_folder.join(SONG_DIRECTORY_NAME)
    }
}
