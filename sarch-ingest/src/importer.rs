//! Local archive importer
//!
//! Single sequential pass over an archive directory laid out as:
//!
//! ```text
//! <archive>/<session-dir>/sessioninfo.json
//! <archive>/<session-dir>/challenge.md          (optional)
//! <archive>/<session-dir>/<subdir>/*.mp3         (subdirs from filedirs, default "files")
//! ```
//!
//! Each session directory becomes a Session (slug = directory name) of the
//! Challenge named in its `sessioninfo.json`; each MP3 becomes an AudioFile
//! whose bytes are copied into managed storage. Failures are handled at the
//! narrowest scope: a bad session, subdirectory or file is reported and
//! skipped, and nothing already written is rolled back. Database constraint
//! violations and I/O failures abort the run.

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use sarch_common::audio;
use sarch_common::db::{artists, audio_files, challenges, sessions, AudioFile, Session};
use sarch_common::MediaStorage;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::console::Console;
use crate::error::{ImportError, ImportResult};
use crate::session_info::{FileDir, SessionInfo, CHALLENGE_MARKDOWN_FILENAME};

const SEPARATOR: &str = "--------------------------------------------";
const AUDIO_SUFFIX: &str = ".mp3";

/// Counters collected during one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportStats {
    /// Session directories visited
    pub directories: usize,
    /// Session directories fully processed
    pub sessions_imported: usize,
    /// Session directories abandoned on an error
    pub sessions_skipped: usize,
    pub challenges_created: usize,
    pub sessions_created: usize,
    pub artists_created: usize,
    pub files_added: usize,
    pub files_skipped: usize,
    /// Configured file subdirectories that did not exist
    pub missing_file_dirs: usize,
}

/// Imports a local archive into the database and media storage
pub struct Importer<W: Write = io::Stdout> {
    pool: SqlitePool,
    storage: MediaStorage,
    console: Console<W>,
    stats: ImportStats,
}

impl<W: Write> Importer<W> {
    pub fn new(pool: SqlitePool, storage: MediaStorage, console: Console<W>) -> Self {
        Self {
            pool,
            storage,
            console,
            stats: ImportStats::default(),
        }
    }

    pub fn stats(&self) -> &ImportStats {
        &self.stats
    }

    pub fn console(&self) -> &Console<W> {
        &self.console
    }

    pub fn into_console(self) -> Console<W> {
        self.console
    }

    /// Import every session directory under `archive_path`, in name order
    ///
    /// # Errors
    /// Only fatal errors are returned: missing archive directory, database
    /// constraint violations, I/O failures. Item-level problems are printed
    /// to the console and counted in the returned stats.
    pub async fn run(&mut self, archive_path: &Path) -> ImportResult<ImportStats> {
        if !archive_path.is_dir() {
            return Err(ImportError::MissingFile(archive_path.display().to_string()));
        }

        info!("Importing archive: {}", archive_path.display());

        for (dirname, session_dir) in list_entries(archive_path, EntryKind::Directory) {
            self.console.print(SEPARATOR);
            self.console.print(format!("Directory: {}", dirname));
            self.stats.directories += 1;

            match self.import_session(&session_dir, &dirname).await {
                Ok(()) => self.stats.sessions_imported += 1,
                Err(e) if e.is_skippable() => {
                    self.console.error(e.to_string());
                    self.stats.sessions_skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        info!(
            directories = self.stats.directories,
            sessions_imported = self.stats.sessions_imported,
            sessions_skipped = self.stats.sessions_skipped,
            files_added = self.stats.files_added,
            files_skipped = self.stats.files_skipped,
            "Import finished"
        );

        Ok(self.stats.clone())
    }

    async fn import_session(&mut self, session_dir: &Path, dirname: &str) -> ImportResult<()> {
        let info = SessionInfo::load(session_dir)?;

        let copyright = match info.copyright {
            Some(flag) => flag,
            None => {
                self.console.warning("missing copyright flag. Assuming False.");
                false
            }
        };
        let date = info.date()?;
        let challenge_name = info.challenge_name()?;

        let (mut challenge, created) =
            challenges::get_or_create(&self.pool, challenge_name, copyright).await?;
        if created {
            self.console.success(format!("created challenge: {}", challenge));
            self.stats.challenges_created += 1;
        } else {
            self.console.print(format!("Challenge: {}", challenge));
        }

        let (mut session, created) =
            sessions::get_or_create(&self.pool, challenge.guid, date, dirname).await?;
        if created {
            self.console.success(format!("created session: {}", session.slug));
            self.stats.sessions_created += 1;
        } else {
            self.console.notice("session already exists");
        }

        match &info.challenge_blurb {
            Some(blurb) => challenge.blurb = blurb.clone(),
            None => self.console.warning("missing challenge.blurb"),
        }

        match std::fs::read_to_string(session_dir.join(CHALLENGE_MARKDOWN_FILENAME)) {
            Ok(description) => challenge.description = description,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                self.console.notice(format!("missing {}", CHALLENGE_MARKDOWN_FILENAME));
            }
            Err(e) => return Err(e.into()),
        }

        challenges::save(&self.pool, &mut challenge).await?;
        sessions::save(&self.pool, &mut session).await?;

        for file_dir in info.file_dirs()? {
            self.import_file_dir(session_dir, &session, &file_dir).await?;
        }

        Ok(())
    }

    async fn import_file_dir(
        &mut self,
        session_dir: &Path,
        session: &Session,
        file_dir: &FileDir,
    ) -> ImportResult<()> {
        let dir_path = session_dir.join(&file_dir.dir);
        if !dir_path.is_dir() {
            self.console
                .error(format!("directory does not exist: {}", dir_path.display()));
            self.stats.missing_file_dirs += 1;
            return Ok(());
        }

        let tracks = list_entries(&dir_path, EntryKind::File);
        self.console
            .print(format!("Reading directory: {}", dir_path.display()));

        for (filename, file_path) in tracks {
            match self.import_track(session, file_dir, &filename, &file_path).await {
                Ok(()) => self.stats.files_added += 1,
                Err(e @ ImportError::UnsupportedFile(_)) => {
                    self.console.notice(e.to_string());
                    self.stats.files_skipped += 1;
                }
                Err(e) if e.is_skippable() => {
                    self.console.error(e.to_string());
                    self.stats.files_skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        Ok(())
    }

    async fn import_track(
        &mut self,
        session: &Session,
        file_dir: &FileDir,
        filename: &str,
        file_path: &Path,
    ) -> ImportResult<()> {
        if !filename.ends_with(AUDIO_SUFFIX) {
            return Err(ImportError::UnsupportedFile(filename.to_string()));
        }

        let mp3 = match audio::probe_mp3(file_path) {
            Ok(info) => info,
            Err(sarch_common::Error::Audio(reason)) => {
                debug!("{}", reason);
                return Err(ImportError::InvalidAudio(format!(
                    "encountered HeaderNotFound error: {}",
                    filename
                )));
            }
            Err(e) => return Err(e.into()),
        };
        if mp3.sketchy {
            return Err(ImportError::InvalidAudio(format!("invalid mp3 file: {}", filename)));
        }

        let tags = match audio::read_tags(file_path) {
            Ok(tags) => tags,
            Err(e @ sarch_common::Error::Tag(_)) => {
                debug!("{}", e);
                return Err(ImportError::InvalidAudio(format!(
                    "unreadable ID3 tag: {}",
                    filename
                )));
            }
            Err(e) => return Err(e.into()),
        };

        let track_name = match &tags.title {
            Some(title) => title.clone(),
            None => file_stem(filename),
        };

        let mut track = AudioFile::new(session.guid, track_name, &file_dir.subsection);
        {
            let mut source = File::open(file_path)?;
            let storage_name = format!("{}/{}", file_dir.dir, filename);
            audio_files::save_with_payload(
                &self.pool,
                &self.storage,
                &mut track,
                Some(session),
                &storage_name,
                &mut source,
            )
            .await?;
        }
        self.console.success(format!("added {}", track.name));

        if let Some(artist_name) = &tags.artist {
            let (artist, created) = artists::get_or_create(&self.pool, artist_name).await?;
            track.artist_id = Some(artist.guid);
            if created {
                self.console.success(format!("created artist: {}", artist));
                self.stats.artists_created += 1;
            }
        }

        audio_files::save(&self.pool, &self.storage, &mut track).await?;
        Ok(())
    }
}

/// Filename without its final extension
fn file_stem(filename: &str) -> String {
    Path::new(filename)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| filename.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    Directory,
    File,
}

/// Immediate children of `dir` of the given kind, sorted by name
///
/// Symlinks are followed. Unreadable entries are logged and skipped.
fn list_entries(dir: &Path, kind: EntryKind) -> Vec<(String, PathBuf)> {
    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name();

    let mut entries = Vec::new();
    for entry in walker {
        match entry {
            Ok(entry) => {
                let matches = match kind {
                    EntryKind::Directory => entry.file_type().is_dir(),
                    EntryKind::File => !entry.file_type().is_dir(),
                };
                if matches {
                    let name = entry.file_name().to_string_lossy().into_owned();
                    entries.push((name, entry.into_path()));
                }
            }
            Err(e) => {
                warn!("Error accessing entry: {}", e);
            }
        }
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("notitle.mp3"), "notitle");
        assert_eq!(file_stem("two.dots.mp3"), "two.dots");
        assert_eq!(file_stem(".mp3"), ".mp3");
    }

    #[test]
    fn test_list_entries_sorted_and_filtered() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("b")).unwrap();
        std::fs::create_dir(dir.path().join("a")).unwrap();
        std::fs::write(dir.path().join("c.txt"), "x").unwrap();
        std::fs::create_dir(dir.path().join("a").join("nested")).unwrap();

        let dirs: Vec<String> = list_entries(dir.path(), EntryKind::Directory)
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(dirs, vec!["a", "b"]);

        let files: Vec<String> = list_entries(dir.path(), EntryKind::File)
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(files, vec!["c.txt"]);
    }
}
