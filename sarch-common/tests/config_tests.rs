//! Tests for configuration resolution
//!
//! Priority: explicit override > environment variable > config file > default.
//!
//! Uses serial_test because several tests set SARCH_* environment variables.

use sarch_common::config::{
    ArchiveConfig, ConfigOverrides, TomlConfig, DATABASE_ENV, MEDIA_ROOT_ENV, MEDIA_URL_ENV,
    ROOT_FOLDER_ENV,
};
use serial_test::serial;
use std::env;
use std::path::PathBuf;

fn clear_env() {
    for var in [ROOT_FOLDER_ENV, DATABASE_ENV, MEDIA_ROOT_ENV, MEDIA_URL_ENV] {
        env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_defaults_derive_from_root() {
    clear_env();

    let config = ArchiveConfig::resolve_with(&ConfigOverrides::default(), &TomlConfig::default());

    assert!(!config.root_folder.as_os_str().is_empty());
    assert_eq!(config.database_path, config.root_folder.join("sarch.db"));
    assert_eq!(config.media_root, config.root_folder.join("media"));
    assert_eq!(config.media_url, "/media/");
}

#[test]
#[serial]
fn test_env_overrides_config_file() {
    clear_env();
    env::set_var(ROOT_FOLDER_ENV, "/tmp/sarch-env-root");

    let file = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/sarch-file-root")),
        media_url: Some("/audio".to_string()),
        ..TomlConfig::default()
    };
    let config = ArchiveConfig::resolve_with(&ConfigOverrides::default(), &file);

    assert_eq!(config.root_folder, PathBuf::from("/tmp/sarch-env-root"));
    assert_eq!(config.database_path, PathBuf::from("/tmp/sarch-env-root/sarch.db"));
    assert_eq!(config.media_url, "/audio/");

    clear_env();
}

#[test]
#[serial]
fn test_explicit_override_beats_env() {
    clear_env();
    env::set_var(DATABASE_ENV, "/tmp/from-env.db");
    env::set_var(MEDIA_ROOT_ENV, "/tmp/from-env-media");

    let overrides = ConfigOverrides {
        database_path: Some(PathBuf::from("/tmp/explicit.db")),
        ..ConfigOverrides::default()
    };
    let config = ArchiveConfig::resolve_with(&overrides, &TomlConfig::default());

    assert_eq!(config.database_path, PathBuf::from("/tmp/explicit.db"));
    assert_eq!(config.media_root, PathBuf::from("/tmp/from-env-media"));

    clear_env();
}

#[test]
#[serial]
fn test_config_file_used_when_env_empty() {
    clear_env();
    env::set_var(ROOT_FOLDER_ENV, "");

    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        "root_folder = \"/srv/sarch\"\nmedia_root = \"/srv/media\"\n",
    )
    .unwrap();

    let file = TomlConfig::load(&path).unwrap();
    let config = ArchiveConfig::resolve_with(&ConfigOverrides::default(), &file);

    assert_eq!(config.root_folder, PathBuf::from("/srv/sarch"));
    assert_eq!(config.database_path, PathBuf::from("/srv/sarch/sarch.db"));
    assert_eq!(config.media_root, PathBuf::from("/srv/media"));

    clear_env();
}

#[test]
fn test_invalid_config_file_is_an_error() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "root_folder = [not toml").unwrap();

    assert!(TomlConfig::load(&path).is_err());
}
