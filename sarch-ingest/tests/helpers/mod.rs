//! Test Helper Utilities
//!
//! Shared utilities for testing sarch-ingest

#![allow(dead_code)]

pub mod archive_builder;
pub mod audio_generator;
pub mod db_utils;

// Re-export commonly used items
pub use archive_builder::ArchiveBuilder;
pub use audio_generator::{generate_test_mp3, Mp3Config};
pub use db_utils::{create_test_archive_db, TestArchive};
