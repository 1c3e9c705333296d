//! Archive Layout Builder
//!
//! Builds `<archive>/<session-dir>/...` trees on disk for importer tests.

use std::path::{Path, PathBuf};

use serde_json::{json, Value};
use tempfile::TempDir;

use super::audio_generator::{generate_test_mp3, Mp3Config};

/// Temporary archive directory
pub struct ArchiveBuilder {
    dir: TempDir,
}

impl ArchiveBuilder {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self {
            dir: TempDir::new()?,
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Create an empty session directory
    pub fn session_dir(&self, name: &str) -> anyhow::Result<PathBuf> {
        let path = self.dir.path().join(name);
        std::fs::create_dir_all(&path)?;
        Ok(path)
    }

    /// Create a session directory with the given sessioninfo.json content
    pub fn session(&self, name: &str, info: &Value) -> anyhow::Result<PathBuf> {
        let path = self.session_dir(name)?;
        std::fs::write(
            path.join("sessioninfo.json"),
            serde_json::to_string_pretty(info)?,
        )?;
        Ok(path)
    }

    /// Create a session directory with a minimal sessioninfo.json
    pub fn basic_session(&self, name: &str, date: &str, challenge: &str) -> anyhow::Result<PathBuf> {
        self.session(
            name,
            &json!({
                "session.date": date,
                "challenge.name": challenge,
                "challenge.copyright": false
            }),
        )
    }

    /// Write an MP3 into `<session>/<subdir>/<filename>`
    pub fn add_mp3(
        &self,
        session: &str,
        subdir: &str,
        filename: &str,
        config: &Mp3Config,
    ) -> anyhow::Result<PathBuf> {
        let dir = self.dir.path().join(session).join(subdir);
        std::fs::create_dir_all(&dir)?;
        generate_test_mp3(&dir.join(filename), config)
    }

    /// Write an arbitrary file into `<session>/<relative>`
    pub fn add_file(&self, session: &str, relative: &str, content: &[u8]) -> anyhow::Result<PathBuf> {
        let path = self.dir.path().join(session).join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, content)?;
        Ok(path)
    }
}
