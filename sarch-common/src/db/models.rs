//! Database models
//!
//! Four archive entities: a [`Challenge`] owns many [`Session`]s, a session
//! owns many [`AudioFile`]s, and an audio file optionally credits an [`Artist`].

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::slug::SlugSource;
use crate::storage::MediaStorage;
use crate::Result;

/// Themed prompt under which recording sessions take place
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge {
    pub guid: Uuid,
    /// Empty until first saved
    pub slug: String,
    pub name: String,
    pub blurb: String,
    /// Long-form markdown, may contain HTML
    pub description: String,
    pub copyright_issues: bool,
}

impl Challenge {
    pub fn new(name: impl Into<String>, copyright_issues: bool) -> Self {
        Self {
            guid: Uuid::new_v4(),
            slug: String::new(),
            name: name.into(),
            blurb: String::new(),
            description: String::new(),
            copyright_issues,
        }
    }
}

impl SlugSource for Challenge {
    fn slug_basename(&self) -> String {
        self.name.clone()
    }
}

impl fmt::Display for Challenge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// One dated recording event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub guid: Uuid,
    /// By convention equal to the session's source directory name
    pub slug: String,
    pub challenge_id: Uuid,
    pub date: NaiveDate,
}

impl Session {
    pub fn new(challenge_id: Uuid, date: NaiveDate) -> Self {
        Self {
            guid: Uuid::new_v4(),
            slug: String::new(),
            challenge_id,
            date,
        }
    }

    /// Session with an explicitly chosen slug
    pub fn with_slug(challenge_id: Uuid, date: NaiveDate, slug: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            ..Self::new(challenge_id, date)
        }
    }
}

impl SlugSource for Session {
    fn slug_basename(&self) -> String {
        self.date.format("%Y%m%d").to_string()
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.slug)
    }
}

/// Performer credited on audio files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    pub guid: Uuid,
    pub slug: String,
    pub name: String,
}

impl Artist {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            guid: Uuid::new_v4(),
            slug: String::new(),
            name: name.into(),
        }
    }
}

impl SlugSource for Artist {
    fn slug_basename(&self) -> String {
        self.name.clone()
    }
}

impl fmt::Display for Artist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Recording stored in managed media storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioFile {
    pub guid: Uuid,
    pub slug: String,
    pub session_id: Uuid,
    /// Free-text grouping label within the session, empty for none
    pub session_subsection: String,
    /// Storage-relative name of the audio payload
    pub data: String,
    pub artist_id: Option<Uuid>,
    pub name: String,
}

impl AudioFile {
    pub fn new(
        session_id: Uuid,
        name: impl Into<String>,
        session_subsection: impl Into<String>,
    ) -> Self {
        Self {
            guid: Uuid::new_v4(),
            slug: String::new(),
            session_id,
            session_subsection: session_subsection.into(),
            data: String::new(),
            artist_id: None,
            name: name.into(),
        }
    }

    /// Basename of the stored payload
    pub fn filename(&self) -> &str {
        Path::new(&self.data)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(&self.data)
    }

    /// Absolute path of the stored payload
    pub fn filepath(&self, storage: &MediaStorage) -> PathBuf {
        storage.path(&self.data)
    }

    /// Size of the stored payload in bytes
    pub fn filesize(&self, storage: &MediaStorage) -> Result<u64> {
        storage.size(&self.data)
    }

    /// Public URL of the stored payload
    pub fn url(&self, storage: &MediaStorage) -> String {
        storage.url(&self.data)
    }

    /// Playing time in whole seconds
    pub fn duration(&self, storage: &MediaStorage) -> Result<u64> {
        let info = crate::audio::probe_mp3(&self.filepath(storage))?;
        Ok(info.duration.as_secs_f64().round() as u64)
    }
}

impl SlugSource for AudioFile {
    fn slug_basename(&self) -> String {
        self.name.clone()
    }
}

impl fmt::Display for AudioFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
