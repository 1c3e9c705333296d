//! Artist database operations

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use super::{parse_guid, unique_slug, Artist};
use crate::slug::SlugSource;
use crate::Result;

const SELECT_COLUMNS: &str = "SELECT guid, slug, name FROM artists";

fn from_row(row: &SqliteRow) -> Result<Artist> {
    let guid: String = row.get("guid");

    Ok(Artist {
        guid: parse_guid(&guid)?,
        slug: row.get("slug"),
        name: row.get("name"),
    })
}

/// Insert or update an artist, assigning a unique slug on first save
pub async fn save(pool: &SqlitePool, artist: &mut Artist) -> Result<()> {
    if artist.slug.is_empty() {
        artist.slug = unique_slug(pool, "artists", &artist.slug_basename()).await?;
        debug!(slug = %artist.slug, "Generated artist slug");
    }

    sqlx::query(
        r#"
        INSERT INTO artists (guid, slug, name)
        VALUES (?, ?, ?)
        ON CONFLICT(guid) DO UPDATE SET
            slug = excluded.slug,
            name = excluded.name,
            updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(artist.guid.to_string())
    .bind(&artist.slug)
    .bind(&artist.name)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load artist by guid
pub async fn load(pool: &SqlitePool, guid: Uuid) -> Result<Option<Artist>> {
    let row = sqlx::query(&format!("{} WHERE guid = ?", SELECT_COLUMNS))
        .bind(guid.to_string())
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(from_row).transpose()
}

/// Load artist by exact name
pub async fn load_by_name(pool: &SqlitePool, name: &str) -> Result<Option<Artist>> {
    let row = sqlx::query(&format!("{} WHERE name = ?", SELECT_COLUMNS))
        .bind(name)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(from_row).transpose()
}

/// Fetch the artist with this name, creating it if absent
///
/// Returns the artist and whether it was created.
pub async fn get_or_create(pool: &SqlitePool, name: &str) -> Result<(Artist, bool)> {
    if let Some(artist) = load_by_name(pool, name).await? {
        return Ok((artist, false));
    }

    let mut artist = Artist::new(name);
    save(pool, &mut artist).await?;
    Ok((artist, true))
}

/// All artists ordered by name
pub async fn list(pool: &SqlitePool) -> Result<Vec<Artist>> {
    let rows = sqlx::query(&format!("{} ORDER BY name", SELECT_COLUMNS))
        .fetch_all(pool)
        .await?;

    rows.iter().map(from_row).collect()
}
