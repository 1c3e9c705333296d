//! Managed media storage
//!
//! Audio payloads are copied under a media root and referenced from the
//! database by their storage-relative name (always `/`-separated).

use std::fs::{self, OpenOptions};
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};

use rand::distributions::Alphanumeric;
use rand::Rng;
use tracing::{debug, warn};

use crate::config::ArchiveConfig;
use crate::{Error, Result};

/// Top-level directory for archived recordings
pub const ARCHIVE_DIR: &str = "archive";
/// Directory used for files whose session is unknown
pub const UNKNOWN_SESSION_DIR: &str = "unknown_session";

const RANDOM_SUFFIX_LEN: usize = 7;

/// File storage rooted at the media root
#[derive(Debug, Clone)]
pub struct MediaStorage {
    root: PathBuf,
    base_url: String,
}

impl MediaStorage {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into(),
        }
    }

    pub fn from_config(config: &ArchiveConfig) -> Self {
        Self::new(&config.media_root, &config.media_url)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Storage name for an audio file of the given session
    ///
    /// `archive/<session-slug>/<name>`, or `archive/unknown_session/<name>`
    /// when the session is not known.
    pub fn upload_path(session_slug: Option<&str>, name: &str) -> String {
        let session_dir = match session_slug {
            Some(slug) if !slug.is_empty() => slug,
            _ => UNKNOWN_SESSION_DIR,
        };
        format!("{}/{}/{}", ARCHIVE_DIR, session_dir, name)
    }

    /// Absolute path of a stored name
    pub fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    pub fn exists(&self, name: &str) -> bool {
        self.path(name).exists()
    }

    /// Size in bytes of a stored file
    pub fn size(&self, name: &str) -> Result<u64> {
        Ok(fs::metadata(self.path(name))?.len())
    }

    /// Public URL of a stored file
    pub fn url(&self, name: &str) -> String {
        format!("{}{}", self.base_url, name.trim_start_matches('/'))
    }

    pub fn delete(&self, name: &str) -> Result<()> {
        match fs::remove_file(self.path(name)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Copy `content` into storage under `name`
    ///
    /// Never overwrites: if `name` is taken, `_` plus seven random
    /// alphanumerics is inserted before the extension until a free name is
    /// found. Returns the name actually used.
    pub fn save<R: Read>(&self, name: &str, content: &mut R) -> Result<String> {
        validate_name(name)?;

        let target = self.path(name);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut candidate = name.to_string();
        loop {
            let open = OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(self.path(&candidate));

            match open {
                Ok(mut file) => {
                    let copied = io::copy(content, &mut file);
                    drop(file);
                    return match copied {
                        Ok(written) => {
                            debug!(name = %candidate, bytes = written, "Stored file");
                            Ok(candidate)
                        }
                        Err(e) => {
                            // Partial payloads never stay behind
                            if let Err(cleanup) = fs::remove_file(self.path(&candidate)) {
                                warn!(name = %candidate, "Failed to remove partial file: {}", cleanup);
                            }
                            Err(e.into())
                        }
                    };
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    candidate = alternative_name(name);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

/// Reject names that would escape the media root
fn validate_name(name: &str) -> Result<()> {
    let path = Path::new(name);
    let escapes = path.components().any(|c| {
        matches!(
            c,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    });

    if name.is_empty() || escapes || path.file_name().is_none() {
        return Err(Error::InvalidInput(format!(
            "Storage name not allowed: '{}'",
            name
        )));
    }
    Ok(())
}

/// `dir/stem.ext` → `dir/stem_XXXXXXX.ext`
fn alternative_name(name: &str) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(RANDOM_SUFFIX_LEN)
        .map(char::from)
        .collect();

    let (dir, file) = match name.rsplit_once('/') {
        Some((dir, file)) => (Some(dir), file),
        None => (None, name),
    };
    let renamed = match file.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{}_{}.{}", stem, suffix, ext),
        _ => format!("{}_{}", file, suffix),
    };

    match dir {
        Some(dir) => format!("{}/{}", dir, renamed),
        None => renamed,
    }
}
