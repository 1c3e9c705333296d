//! addlocal - import a local session archive
//!
//! Walks an archive directory of session folders and loads challenges,
//! sessions, artists and audio files into the archive database, copying
//! each MP3 into managed media storage.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use sarch_common::config::{ArchiveConfig, ConfigOverrides};
use sarch_common::db;
use sarch_common::MediaStorage;
use sarch_ingest::{Console, Importer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for addlocal
#[derive(Parser, Debug)]
#[command(name = "addlocal")]
#[command(about = "Add files from a local archive")]
#[command(
    long_about = "Add files from a local archive.\n\n\
    Each subdirectory of ARCHIVE_PATH is one session and must contain a \
    sessioninfo.json. Tracks are read from the subdirectories listed under \
    \"filedirs\" (default: files/). Database and media locations are taken \
    from SARCH_ROOT_FOLDER, SARCH_DATABASE, SARCH_MEDIA_ROOT or the config file."
)]
#[command(version)]
struct Args {
    /// Archive directory holding one folder per session
    archive_path: PathBuf,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Console output goes to stdout; diagnostics to stderr
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    info!(
        "addlocal {} (git {}, built {}, {})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    // Database and media locations come from SARCH_* variables or the config file
    let config = ArchiveConfig::resolve(&ConfigOverrides::default());
    info!("Database: {}", config.database_path.display());
    info!("Media root: {}", config.media_root.display());

    let pool = db::init_database(&config.database_path)
        .await
        .context("Failed to open archive database")?;
    let storage = MediaStorage::from_config(&config);

    let mut importer = Importer::new(pool.clone(), storage, Console::stdout());
    let result = importer
        .run(&args.archive_path)
        .await
        .with_context(|| format!("Import of {} aborted", args.archive_path.display()));

    pool.close().await;

    let stats = result?;
    info!(
        challenges_created = stats.challenges_created,
        sessions_created = stats.sessions_created,
        artists_created = stats.artists_created,
        files_added = stats.files_added,
        files_skipped = stats.files_skipped,
        "Done"
    );

    Ok(())
}
