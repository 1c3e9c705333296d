//! Database models and queries

pub mod artists;
pub mod audio_files;
pub mod challenges;
pub mod init;
pub mod models;
pub mod sessions;

pub use init::*;
pub use models::*;

use chrono::NaiveDate;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::slug::generate_unique_slug;
use crate::{Error, Result};

/// Storage format of `DATE` columns
pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

/// Generate a slug that is unique within `table`
pub(crate) async fn unique_slug(pool: &SqlitePool, table: &str, basename: &str) -> Result<String> {
    let sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE slug = ?)", table);
    let sql = sql.as_str();

    generate_unique_slug(basename, |candidate| async move {
        let found: i64 = sqlx::query_scalar(sql)
            .bind(candidate)
            .fetch_one(pool)
            .await?;
        Ok::<_, Error>(found != 0)
    })
    .await
}

pub(crate) fn parse_guid(value: &str) -> Result<Uuid> {
    Uuid::parse_str(value)
        .map_err(|e| Error::Internal(format!("Invalid guid '{}' in database: {}", value, e)))
}

pub(crate) fn parse_optional_guid(value: Option<String>) -> Result<Option<Uuid>> {
    value.as_deref().map(parse_guid).transpose()
}

pub(crate) fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|e| Error::Internal(format!("Invalid date '{}' in database: {}", value, e)))
}
