//! # SArch Common Library
//!
//! Shared code for the session archive:
//! - Database schema and entity queries (challenges, sessions, artists, audio files)
//! - Unique slug generation
//! - Managed media storage
//! - MP3 probing and ID3 tag access
//! - Configuration loading

pub mod audio;
pub mod config;
pub mod db;
pub mod error;
pub mod slug;
pub mod storage;

pub use error::{Error, Result};
pub use storage::MediaStorage;
