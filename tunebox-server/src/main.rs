//! tunebox-server - media catalog backend
//!
//! Startup sequence:
//! 1. Parse command line, load the TOML bootstrap file
//! 2. Initialize tracing
//! 3. Resolve and create the root folder (database + song directory)
//! 4. Open the database, build state and router, serve

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tunebox_common::config::{resolve_root_folder, RootFolderInitializer, TomlConfig};
use tunebox_server::{build_router, AppState, ServerConfig};

#[derive(Parser, Debug)]
#[command(name = "tunebox-server")]
#[command(about = "Media catalog backend: accounts, uploads and streaming")]
#[command(version)]
struct Args {
    /// Port to listen on (overrides the config file)
    #[arg(short, long, env = "TUNEBOX_PORT")]
    port: Option<u16>,

    /// Root folder holding tunebox.db and the songs directory
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// Path to the TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let toml_config = TomlConfig::load_or_default(args.config.as_deref())
        .context("Failed to load config file")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("tunebox_server={0},tunebox_common={0},tower_http=info", toml_config.logging.level)
                    .into()
            }),
        )
        .init();

    info!(
        "Starting tunebox-server v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let root_folder = resolve_root_folder(args.root_folder.as_deref(), &toml_config);
    let initializer = RootFolderInitializer::new(root_folder);
    initializer
        .ensure_directory_exists()
        .context("Failed to initialize root folder")?;
    info!("Root folder: {}", initializer.root_folder().display());

    let config = ServerConfig::new(initializer.root_folder(), &toml_config, args.port);
    info!("Database: {}", config.database_path.display());
    info!("Song directory: {}", config.song_directory.display());
    info!("Admin username: {}", config.admin_username);

    let db_pool = tunebox_common::db::init_database(&config.database_path).await?;
    info!("Database connection established");

    let listen_address = config.listen_address();
    let state = AppState::new(db_pool, config);
    state
        .library
        .song_directory()
        .ensure_exists()
        .await
        .context("Failed to create song directory")?;

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&listen_address)
        .await
        .with_context(|| format!("Failed to bind {}", listen_address))?;
    info!("Listening on http://{}", listen_address);
    info!("Health check: http://{}/health", listen_address);

    axum::serve(listener, app).await?;

    Ok(())
}
