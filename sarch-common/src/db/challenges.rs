//! Challenge database operations

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use super::{parse_guid, unique_slug, Challenge};
use crate::slug::SlugSource;
use crate::Result;

const SELECT_COLUMNS: &str =
    "SELECT guid, slug, name, blurb, description, copyright_issues FROM challenges";

fn from_row(row: &SqliteRow) -> Result<Challenge> {
    let guid: String = row.get("guid");
    let copyright: i64 = row.get("copyright_issues");

    Ok(Challenge {
        guid: parse_guid(&guid)?,
        slug: row.get("slug"),
        name: row.get("name"),
        blurb: row.get("blurb"),
        description: row.get("description"),
        copyright_issues: copyright != 0,
    })
}

/// Insert or update a challenge
///
/// Assigns a unique slug on first save. Fails with a unique violation when the
/// name is already used by another challenge.
pub async fn save(pool: &SqlitePool, challenge: &mut Challenge) -> Result<()> {
    if challenge.slug.is_empty() {
        challenge.slug = unique_slug(pool, "challenges", &challenge.slug_basename()).await?;
        debug!(slug = %challenge.slug, "Generated challenge slug");
    }

    sqlx::query(
        r#"
        INSERT INTO challenges (guid, slug, name, blurb, description, copyright_issues)
        VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT(guid) DO UPDATE SET
            slug = excluded.slug,
            name = excluded.name,
            blurb = excluded.blurb,
            description = excluded.description,
            copyright_issues = excluded.copyright_issues,
            updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(challenge.guid.to_string())
    .bind(&challenge.slug)
    .bind(&challenge.name)
    .bind(&challenge.blurb)
    .bind(&challenge.description)
    .bind(challenge.copyright_issues as i64)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load challenge by guid
pub async fn load(pool: &SqlitePool, guid: Uuid) -> Result<Option<Challenge>> {
    let row = sqlx::query(&format!("{} WHERE guid = ?", SELECT_COLUMNS))
        .bind(guid.to_string())
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(from_row).transpose()
}

/// Load challenge by slug
pub async fn load_by_slug(pool: &SqlitePool, slug: &str) -> Result<Option<Challenge>> {
    let row = sqlx::query(&format!("{} WHERE slug = ?", SELECT_COLUMNS))
        .bind(slug)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(from_row).transpose()
}

/// Fetch the challenge matching both name and copyright flag, creating it if absent
///
/// Returns the challenge and whether it was created.
pub async fn get_or_create(
    pool: &SqlitePool,
    name: &str,
    copyright_issues: bool,
) -> Result<(Challenge, bool)> {
    let row = sqlx::query(&format!(
        "{} WHERE name = ? AND copyright_issues = ?",
        SELECT_COLUMNS
    ))
    .bind(name)
    .bind(copyright_issues as i64)
    .fetch_optional(pool)
    .await?;

    if let Some(row) = row {
        return Ok((from_row(&row)?, false));
    }

    let mut challenge = Challenge::new(name, copyright_issues);
    save(pool, &mut challenge).await?;
    Ok((challenge, true))
}

/// All challenges ordered by name
pub async fn list(pool: &SqlitePool) -> Result<Vec<Challenge>> {
    let rows = sqlx::query(&format!("{} ORDER BY name", SELECT_COLUMNS))
        .fetch_all(pool)
        .await?;

    rows.iter().map(from_row).collect()
}

/// Number of stored challenges
pub async fn count(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM challenges")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
