//! `sessioninfo.json` parsing
//!
//! Recognized keys:
//! - `session.date` (required, `YYYYMMDD`)
//! - `challenge.name` (required)
//! - `challenge.blurb` (optional)
//! - `challenge.copyright` (optional boolean)
//! - `filedirs` (optional object: subdirectory name → subsection label)

use std::io;
use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{ImportError, ImportResult};

pub const SESSION_INFO_FILENAME: &str = "sessioninfo.json";
pub const CHALLENGE_MARKDOWN_FILENAME: &str = "challenge.md";

/// Subdirectory scanned when `filedirs` is absent
pub const DEFAULT_FILE_DIR: &str = "files";

const SESSION_DATE_FORMAT: &str = "%Y%m%d";

/// Raw contents of `sessioninfo.json`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionInfo {
    #[serde(rename = "session.date")]
    pub session_date: Option<String>,

    #[serde(rename = "challenge.name")]
    pub challenge_name: Option<String>,

    #[serde(rename = "challenge.blurb")]
    pub challenge_blurb: Option<String>,

    #[serde(rename = "challenge.copyright")]
    pub copyright: Option<bool>,

    /// Kept in document order
    pub filedirs: Option<Map<String, Value>>,
}

/// One subdirectory of a session to scan for audio files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDir {
    /// Directory name relative to the session directory
    pub dir: String,
    /// Subsection label given to every file found there
    pub subsection: String,
}

impl SessionInfo {
    /// Load `sessioninfo.json` from a session directory
    pub fn load(session_dir: &Path) -> ImportResult<Self> {
        let path = session_dir.join(SESSION_INFO_FILENAME);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ImportError::MissingFile(SESSION_INFO_FILENAME.to_string()));
            }
            Err(e) => {
                tracing::debug!(path = %path.display(), "Cannot read session info: {}", e);
                return Err(malformed());
            }
        };

        Self::parse(&content)
    }

    /// Parse the JSON text of `sessioninfo.json`
    pub fn parse(content: &str) -> ImportResult<Self> {
        serde_json::from_str(content).map_err(|e| {
            tracing::debug!("Invalid session info: {}", e);
            malformed()
        })
    }

    /// Session date; `YYYYMMDD` is required
    pub fn date(&self) -> ImportResult<NaiveDate> {
        let raw = self
            .session_date
            .as_deref()
            .ok_or(ImportError::MissingField("date"))?;

        if raw.len() != 8 || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(bad_date());
        }
        NaiveDate::parse_from_str(raw, SESSION_DATE_FORMAT).map_err(|_| bad_date())
    }

    /// Challenge name (required)
    pub fn challenge_name(&self) -> ImportResult<&str> {
        self.challenge_name
            .as_deref()
            .ok_or(ImportError::MissingField("challenge.name"))
    }

    /// Subdirectories to scan
    ///
    /// Defaults to a single `files` directory with an empty subsection label.
    pub fn file_dirs(&self) -> ImportResult<Vec<FileDir>> {
        let Some(filedirs) = &self.filedirs else {
            return Ok(vec![FileDir {
                dir: DEFAULT_FILE_DIR.to_string(),
                subsection: String::new(),
            }]);
        };

        filedirs
            .iter()
            .map(|(dir, label)| match label {
                Value::String(subsection) => Ok(FileDir {
                    dir: dir.clone(),
                    subsection: subsection.clone(),
                }),
                _ => Err(ImportError::MalformedData(format!(
                    "subsection label for '{}' in filedirs is not a string",
                    dir
                ))),
            })
            .collect()
    }
}

fn malformed() -> ImportError {
    ImportError::MalformedData(format!("malformed or unreadable {}", SESSION_INFO_FILENAME))
}

fn bad_date() -> ImportError {
    ImportError::MalformedData(format!("date in {} not in yyyymmdd form", SESSION_INFO_FILENAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_document() {
        let info = SessionInfo::parse(
            r#"{
                "session.date": "20230601",
                "challenge.name": "TestChallenge",
                "challenge.blurb": "Short blurb",
                "challenge.copyright": true,
                "filedirs": {"files": "", "bonus": "Bonus Tracks"}
            }"#,
        )
        .unwrap();

        assert_eq!(info.date().unwrap(), NaiveDate::from_ymd_opt(2023, 6, 1).unwrap());
        assert_eq!(info.challenge_name().unwrap(), "TestChallenge");
        assert_eq!(info.challenge_blurb.as_deref(), Some("Short blurb"));
        assert_eq!(info.copyright, Some(true));
        assert_eq!(
            info.file_dirs().unwrap(),
            vec![
                FileDir { dir: "files".into(), subsection: "".into() },
                FileDir { dir: "bonus".into(), subsection: "Bonus Tracks".into() },
            ]
        );
    }

    #[test]
    fn test_defaults_when_optional_keys_absent() {
        let info =
            SessionInfo::parse(r#"{"session.date": "20230601", "challenge.name": "X"}"#).unwrap();

        assert_eq!(info.copyright, None);
        assert_eq!(info.challenge_blurb, None);
        assert_eq!(
            info.file_dirs().unwrap(),
            vec![FileDir { dir: "files".into(), subsection: String::new() }]
        );
    }

    #[test]
    fn test_missing_required_fields() {
        let info = SessionInfo::parse("{}").unwrap();

        assert!(matches!(info.date(), Err(ImportError::MissingField("date"))));
        assert!(matches!(
            info.challenge_name(),
            Err(ImportError::MissingField("challenge.name"))
        ));
    }

    #[test]
    fn test_bad_dates() {
        for raw in ["2023-06-01", "20231301", "2023061", "202306011", "June 1st"] {
            let info = SessionInfo {
                session_date: Some(raw.to_string()),
                ..SessionInfo::default()
            };
            let err = info.date().unwrap_err();
            assert_eq!(
                err.to_string(),
                "date in sessioninfo.json not in yyyymmdd form",
                "for {}",
                raw
            );
        }
    }

    #[test]
    fn test_malformed_json() {
        let err = SessionInfo::parse("{ not json").unwrap_err();
        assert_eq!(err.to_string(), "malformed or unreadable sessioninfo.json");

        // Wrong value types count as malformed too
        let err = SessionInfo::parse(r#"{"challenge.copyright": "yes"}"#).unwrap_err();
        assert!(matches!(err, ImportError::MalformedData(_)));
    }

    #[test]
    fn test_non_string_subsection_label() {
        let info = SessionInfo::parse(r#"{"filedirs": {"bonus": 3}}"#).unwrap();
        assert!(matches!(info.file_dirs(), Err(ImportError::MalformedData(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = SessionInfo::load(dir.path()).unwrap_err();
        assert_eq!(err.to_string(), "missing sessioninfo.json");
    }
}
