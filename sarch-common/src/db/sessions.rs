//! Session database operations

use chrono::{Datelike, NaiveDate};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use super::{parse_date, parse_guid, unique_slug, Session, DATE_FORMAT};
use crate::slug::SlugSource;
use crate::{Error, Result};

const SELECT_COLUMNS: &str = "SELECT guid, slug, challenge_id, date FROM sessions";

fn from_row(row: &SqliteRow) -> Result<Session> {
    let guid: String = row.get("guid");
    let challenge_id: String = row.get("challenge_id");
    let date: String = row.get("date");

    Ok(Session {
        guid: parse_guid(&guid)?,
        slug: row.get("slug"),
        challenge_id: parse_guid(&challenge_id)?,
        date: parse_date(&date)?,
    })
}

/// Insert or update a session
///
/// A session saved without a slug gets one generated from its date (`YYYYMMDD`).
pub async fn save(pool: &SqlitePool, session: &mut Session) -> Result<()> {
    if session.slug.is_empty() {
        session.slug = unique_slug(pool, "sessions", &session.slug_basename()).await?;
        debug!(slug = %session.slug, "Generated session slug");
    }

    sqlx::query(
        r#"
        INSERT INTO sessions (guid, slug, challenge_id, date)
        VALUES (?, ?, ?, ?)
        ON CONFLICT(guid) DO UPDATE SET
            slug = excluded.slug,
            challenge_id = excluded.challenge_id,
            date = excluded.date,
            updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(session.guid.to_string())
    .bind(&session.slug)
    .bind(session.challenge_id.to_string())
    .bind(session.date.format(DATE_FORMAT).to_string())
    .execute(pool)
    .await?;

    Ok(())
}

/// Load session by guid
pub async fn load(pool: &SqlitePool, guid: Uuid) -> Result<Option<Session>> {
    let row = sqlx::query(&format!("{} WHERE guid = ?", SELECT_COLUMNS))
        .bind(guid.to_string())
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(from_row).transpose()
}

/// Load session by slug
pub async fn load_by_slug(pool: &SqlitePool, slug: &str) -> Result<Option<Session>> {
    let row = sqlx::query(&format!("{} WHERE slug = ?", SELECT_COLUMNS))
        .bind(slug)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(from_row).transpose()
}

/// Fetch the session matching challenge, date and slug, creating it if absent
///
/// Returns the session and whether it was created. A different session that
/// already owns `slug` makes the insert fail with a unique violation.
pub async fn get_or_create(
    pool: &SqlitePool,
    challenge_id: Uuid,
    date: NaiveDate,
    slug: &str,
) -> Result<(Session, bool)> {
    let row = sqlx::query(&format!(
        "{} WHERE challenge_id = ? AND date = ? AND slug = ?",
        SELECT_COLUMNS
    ))
    .bind(challenge_id.to_string())
    .bind(date.format(DATE_FORMAT).to_string())
    .bind(slug)
    .fetch_optional(pool)
    .await?;

    if let Some(row) = row {
        return Ok((from_row(&row)?, false));
    }

    let mut session = Session::with_slug(challenge_id, date, slug);
    save(pool, &mut session).await?;
    Ok((session, true))
}

/// Sessions of one challenge, oldest first
pub async fn list_for_challenge(pool: &SqlitePool, challenge_id: Uuid) -> Result<Vec<Session>> {
    let rows = sqlx::query(&format!(
        "{} WHERE challenge_id = ? ORDER BY date, slug",
        SELECT_COLUMNS
    ))
    .bind(challenge_id.to_string())
    .fetch_all(pool)
    .await?;

    rows.iter().map(from_row).collect()
}

/// All sessions, oldest first
pub async fn list(pool: &SqlitePool) -> Result<Vec<Session>> {
    let rows = sqlx::query(&format!("{} ORDER BY date, slug", SELECT_COLUMNS))
        .fetch_all(pool)
        .await?;

    rows.iter().map(from_row).collect()
}

/// All sessions ordered by date and split into calendar months
///
/// Each inner vector holds the sessions of one (year, month); months without
/// sessions are absent.
pub async fn grouped_by_month(pool: &SqlitePool) -> Result<Vec<Vec<Session>>> {
    Ok(group_by_month(list(pool).await?))
}

fn group_by_month(sessions: Vec<Session>) -> Vec<Vec<Session>> {
    let mut groups: Vec<Vec<Session>> = Vec::new();

    for session in sessions {
        let month = (session.date.year(), session.date.month());
        let current = groups
            .last()
            .and_then(|group| group.first())
            .map(|first| (first.date.year(), first.date.month()));

        if current == Some(month) {
            if let Some(group) = groups.last_mut() {
                group.push(session);
                continue;
            }
        }
        groups.push(vec![session]);
    }

    groups
}

/// Copyright flag inherited from the session's challenge
pub async fn copyright_issues(pool: &SqlitePool, session: &Session) -> Result<bool> {
    let flag: Option<i64> =
        sqlx::query_scalar("SELECT copyright_issues FROM challenges WHERE guid = ?")
            .bind(session.challenge_id.to_string())
            .fetch_optional(pool)
            .await?;

    flag.map(|f| f != 0)
        .ok_or_else(|| Error::NotFound(format!("challenge {}", session.challenge_id)))
}

/// Number of stored sessions
pub async fn count(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sessions")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
