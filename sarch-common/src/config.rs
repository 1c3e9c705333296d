//! Configuration loading and root folder resolution
//!
//! Every setting is resolved in the same priority order:
//! 1. Explicit value supplied by the caller (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Default derived from the root folder / OS data directory (fallback)

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const ROOT_FOLDER_ENV: &str = "SARCH_ROOT_FOLDER";
pub const DATABASE_ENV: &str = "SARCH_DATABASE";
pub const MEDIA_ROOT_ENV: &str = "SARCH_MEDIA_ROOT";
pub const MEDIA_URL_ENV: &str = "SARCH_MEDIA_URL";
pub const CONFIG_FILE_ENV: &str = "SARCH_CONFIG";

pub const DATABASE_FILENAME: &str = "sarch.db";
pub const MEDIA_DIRNAME: &str = "media";
pub const DEFAULT_MEDIA_URL: &str = "/media/";

/// Contents of the optional TOML config file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    pub root_folder: Option<PathBuf>,
    pub database_path: Option<PathBuf>,
    pub media_root: Option<PathBuf>,
    pub media_url: Option<String>,
}

impl TomlConfig {
    /// Parse a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Invalid config file {}: {}", path.display(), e)))
    }

    /// Load the config file from its standard location
    ///
    /// A missing or broken file never aborts startup: it yields empty config.
    pub fn load_default() -> Self {
        let Some(path) = config_file_path() else {
            debug!("No config file found, using environment and defaults");
            return Self::default();
        };

        match Self::load(&path) {
            Ok(config) => {
                debug!("Loaded config file: {}", path.display());
                config
            }
            Err(e) => {
                warn!("Ignoring config file: {}", e);
                Self::default()
            }
        }
    }
}

/// Values given explicitly by the caller, overriding every other source
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub root_folder: Option<PathBuf>,
    pub database_path: Option<PathBuf>,
    pub media_root: Option<PathBuf>,
    pub media_url: Option<String>,
}

/// Fully resolved archive configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveConfig {
    /// Folder holding the database and media root by default
    pub root_folder: PathBuf,
    /// SQLite database file
    pub database_path: PathBuf,
    /// Root of managed media storage
    pub media_root: PathBuf,
    /// URL prefix under which the media root is served
    pub media_url: String,
}

impl ArchiveConfig {
    /// Configuration rooted at `root_folder` with every other value derived from it
    pub fn from_root(root_folder: impl Into<PathBuf>) -> Self {
        let root_folder = root_folder.into();
        Self {
            database_path: root_folder.join(DATABASE_FILENAME),
            media_root: root_folder.join(MEDIA_DIRNAME),
            media_url: DEFAULT_MEDIA_URL.to_string(),
            root_folder,
        }
    }

    /// Resolve using the standard config file location
    pub fn resolve(overrides: &ConfigOverrides) -> Self {
        Self::resolve_with(overrides, &TomlConfig::load_default())
    }

    /// Resolve against an already loaded config file
    pub fn resolve_with(overrides: &ConfigOverrides, file: &TomlConfig) -> Self {
        let root_folder = pick_path(
            overrides.root_folder.as_ref(),
            ROOT_FOLDER_ENV,
            file.root_folder.as_ref(),
        )
        .unwrap_or_else(get_default_root_folder);

        let derived = Self::from_root(root_folder);

        let database_path = pick_path(
            overrides.database_path.as_ref(),
            DATABASE_ENV,
            file.database_path.as_ref(),
        )
        .unwrap_or(derived.database_path);

        let media_root = pick_path(
            overrides.media_root.as_ref(),
            MEDIA_ROOT_ENV,
            file.media_root.as_ref(),
        )
        .unwrap_or(derived.media_root);

        let media_url = overrides
            .media_url
            .clone()
            .or_else(|| non_empty_env(MEDIA_URL_ENV))
            .or_else(|| file.media_url.clone())
            .unwrap_or(derived.media_url);

        Self {
            root_folder: derived.root_folder,
            database_path,
            media_root,
            media_url: normalize_media_url(&media_url),
        }
    }
}

fn pick_path(explicit: Option<&PathBuf>, env_var: &str, file: Option<&PathBuf>) -> Option<PathBuf> {
    explicit
        .cloned()
        .or_else(|| non_empty_env(env_var).map(PathBuf::from))
        .or_else(|| file.cloned())
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// Media URLs always end with a slash so stored names can be appended
fn normalize_media_url(url: &str) -> String {
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{}/", url)
    }
}

/// Locate the config file
///
/// `SARCH_CONFIG` wins; otherwise the per-user config directory, then `/etc/sarch` on Linux.
pub fn config_file_path() -> Option<PathBuf> {
    if let Some(path) = non_empty_env(CONFIG_FILE_ENV) {
        return Some(PathBuf::from(path));
    }

    let user_config = dirs::config_dir().map(|d| d.join("sarch").join("config.toml"));
    if let Some(path) = user_config.filter(|p| p.exists()) {
        return Some(path);
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/sarch/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Get OS-dependent default root folder path
fn get_default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/sarch (or /var/lib/sarch for system-wide)
        dirs::data_local_dir()
            .map(|d| d.join("sarch"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/sarch"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("sarch"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/sarch"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("sarch"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\sarch"))
    } else {
        PathBuf::from("./sarch_data")
    }
}
