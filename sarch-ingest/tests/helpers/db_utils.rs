//! Database Test Utilities

use anyhow::Result;
use sarch_common::db::init_database;
use sarch_common::MediaStorage;
use sarch_ingest::{Console, ImportResult, ImportStats, Importer};
use sqlx::SqlitePool;
use std::path::Path;
use tempfile::TempDir;

/// Database and media storage in a temporary root folder
///
/// `_root` must be kept alive for the duration of the test.
pub struct TestArchive {
    pub _root: TempDir,
    pub pool: SqlitePool,
    pub storage: MediaStorage,
}

/// Create a fresh database and media root
pub async fn create_test_archive_db() -> Result<TestArchive> {
    let root = TempDir::new()?;
    let pool = init_database(&root.path().join("sarch.db")).await?;
    let storage = MediaStorage::new(root.path().join("media"), "/media/");

    Ok(TestArchive {
        _root: root,
        pool,
        storage,
    })
}

impl TestArchive {
    /// Run the importer over `archive`, capturing console output
    pub async fn import(&self, archive: &Path) -> (ImportResult<ImportStats>, String) {
        let console = Console::new(Vec::new(), false);
        let mut importer = Importer::new(self.pool.clone(), self.storage.clone(), console);
        let result = importer.run(archive).await;
        let output = String::from_utf8_lossy(&importer.into_console().into_inner()).into_owned();
        (result, output)
    }

    pub async fn count(&self, table: &str) -> i64 {
        sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }
}
