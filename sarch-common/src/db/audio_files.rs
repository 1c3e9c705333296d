//! Audio file database operations
//!
//! Saving an audio file also rewrites the ID3 title/artist of its stored
//! payload so the file agrees with the database row.

use std::io::Read;

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use super::{artists, parse_guid, parse_optional_guid, unique_slug, AudioFile, Session};
use crate::audio::{self, TrackTags};
use crate::slug::SlugSource;
use crate::storage::MediaStorage;
use crate::{Error, Result};

const SELECT_COLUMNS: &str =
    "SELECT guid, slug, session_id, session_subsection, data, artist_id, name FROM audio_files";

fn from_row(row: &SqliteRow) -> Result<AudioFile> {
    let guid: String = row.get("guid");
    let session_id: String = row.get("session_id");
    let artist_id: Option<String> = row.get("artist_id");

    Ok(AudioFile {
        guid: parse_guid(&guid)?,
        slug: row.get("slug"),
        session_id: parse_guid(&session_id)?,
        session_subsection: row.get("session_subsection"),
        data: row.get("data"),
        artist_id: parse_optional_guid(artist_id)?,
        name: row.get("name"),
    })
}

/// Insert or update an audio file and sync the stored payload's tags
///
/// Assigns a unique slug on first save. After the row is written, the ID3
/// title is set to the file's name (when non-empty) and the artist to the
/// linked artist's name (when linked).
pub async fn save(pool: &SqlitePool, storage: &MediaStorage, file: &mut AudioFile) -> Result<()> {
    save_row(pool, file).await?;
    sync_tags(pool, storage, file).await
}

async fn save_row(pool: &SqlitePool, file: &mut AudioFile) -> Result<()> {
    if file.slug.is_empty() {
        file.slug = unique_slug(pool, "audio_files", &file.slug_basename()).await?;
        debug!(slug = %file.slug, "Generated audio file slug");
    }

    sqlx::query(
        r#"
        INSERT INTO audio_files (guid, slug, session_id, session_subsection, data, artist_id, name)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(guid) DO UPDATE SET
            slug = excluded.slug,
            session_id = excluded.session_id,
            session_subsection = excluded.session_subsection,
            data = excluded.data,
            artist_id = excluded.artist_id,
            name = excluded.name,
            updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(file.guid.to_string())
    .bind(&file.slug)
    .bind(file.session_id.to_string())
    .bind(&file.session_subsection)
    .bind(&file.data)
    .bind(file.artist_id.map(|id| id.to_string()))
    .bind(&file.name)
    .execute(pool)
    .await?;

    Ok(())
}

async fn sync_tags(pool: &SqlitePool, storage: &MediaStorage, file: &AudioFile) -> Result<()> {
    if file.data.is_empty() {
        return Err(Error::InvalidInput(format!(
            "audio file '{}' has no stored payload",
            file.name
        )));
    }

    let artist = match file.artist_id {
        Some(id) => artists::load(pool, id).await?.map(|a| a.name),
        None => None,
    };

    let tags = TrackTags {
        title: Some(file.name.clone()).filter(|n| !n.is_empty()),
        artist,
    };
    audio::write_tags(&file.filepath(storage), &tags)
}

/// Copy `content` into storage for `file` and save it
///
/// The payload is stored under `archive/<session-slug>/<name>`; the name
/// actually used (after collision renaming) ends up in `file.data`.
pub async fn save_with_payload<R: Read>(
    pool: &SqlitePool,
    storage: &MediaStorage,
    file: &mut AudioFile,
    session: Option<&Session>,
    name: &str,
    content: &mut R,
) -> Result<()> {
    let upload_path = MediaStorage::upload_path(session.map(|s| s.slug.as_str()), name);
    file.data = storage.save(&upload_path, content)?;
    save(pool, storage, file).await
}

/// Load audio file by guid
pub async fn load(pool: &SqlitePool, guid: Uuid) -> Result<Option<AudioFile>> {
    let row = sqlx::query(&format!("{} WHERE guid = ?", SELECT_COLUMNS))
        .bind(guid.to_string())
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(from_row).transpose()
}

/// Load audio file by slug
pub async fn load_by_slug(pool: &SqlitePool, slug: &str) -> Result<Option<AudioFile>> {
    let row = sqlx::query(&format!("{} WHERE slug = ?", SELECT_COLUMNS))
        .bind(slug)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(from_row).transpose()
}

/// Files of one session ordered by name
pub async fn list_for_session(pool: &SqlitePool, session_id: Uuid) -> Result<Vec<AudioFile>> {
    let rows = sqlx::query(&format!(
        "{} WHERE session_id = ? ORDER BY name, slug",
        SELECT_COLUMNS
    ))
    .bind(session_id.to_string())
    .fetch_all(pool)
    .await?;

    rows.iter().map(from_row).collect()
}

/// Files credited to one artist ordered by name
pub async fn list_for_artist(pool: &SqlitePool, artist_id: Uuid) -> Result<Vec<AudioFile>> {
    let rows = sqlx::query(&format!(
        "{} WHERE artist_id = ? ORDER BY name, slug",
        SELECT_COLUMNS
    ))
    .bind(artist_id.to_string())
    .fetch_all(pool)
    .await?;

    rows.iter().map(from_row).collect()
}

/// Files of one session grouped by subsection label
///
/// Groups follow the label order; inside a group files are sorted by
/// case-insensitive name.
pub async fn files_by_subsection(
    pool: &SqlitePool,
    session_id: Uuid,
) -> Result<Vec<Vec<AudioFile>>> {
    let rows = sqlx::query(&format!(
        "{} WHERE session_id = ? ORDER BY session_subsection",
        SELECT_COLUMNS
    ))
    .bind(session_id.to_string())
    .fetch_all(pool)
    .await?;

    let files = rows.iter().map(from_row).collect::<Result<Vec<_>>>()?;
    Ok(group_by_subsection(files))
}

fn group_by_subsection(files: Vec<AudioFile>) -> Vec<Vec<AudioFile>> {
    let mut groups: Vec<Vec<AudioFile>> = Vec::new();

    for file in files {
        let same_group = groups
            .last()
            .and_then(|group| group.first())
            .is_some_and(|first| first.session_subsection == file.session_subsection);

        if same_group {
            if let Some(group) = groups.last_mut() {
                group.push(file);
                continue;
            }
        }
        groups.push(vec![file]);
    }

    for group in &mut groups {
        group.sort_by_cached_key(|f| f.name.to_lowercase());
    }
    groups
}

/// Number of stored audio files
pub async fn count(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM audio_files")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
