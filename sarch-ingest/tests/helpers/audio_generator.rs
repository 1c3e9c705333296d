//! Audio Test Fixture Generator
//!
//! Writes small MP3 files made of silent MPEG-1 Layer III frames, optionally
//! tagged with an ID3v2.4 title and artist.

use std::path::{Path, PathBuf};

use id3::{Tag, TagLike, Version};

/// MPEG-1 Layer III, 128 kbps, 44.1 kHz, no padding
const FRAME_HEADER: [u8; 4] = [0xFF, 0xFB, 0x90, 0x00];
const FRAME_LEN: usize = 417;

/// Configuration for generated audio
#[derive(Debug, Clone)]
pub struct Mp3Config {
    /// Number of MPEG frames (~26 ms each)
    pub frames: usize,
    pub title: Option<String>,
    pub artist: Option<String>,
}

impl Default for Mp3Config {
    fn default() -> Self {
        Self {
            frames: 100,
            title: None,
            artist: None,
        }
    }
}

impl Mp3Config {
    pub fn titled(title: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            ..Self::default()
        }
    }

    pub fn with_artist(mut self, artist: &str) -> Self {
        self.artist = Some(artist.to_string());
        self
    }
}

/// Generate a test MP3 file with the given configuration
///
/// # Returns
/// Generated file path
pub fn generate_test_mp3(path: &Path, config: &Mp3Config) -> anyhow::Result<PathBuf> {
    let mut data = Vec::with_capacity(config.frames * FRAME_LEN);
    for _ in 0..config.frames {
        data.extend_from_slice(&FRAME_HEADER);
        data.resize(data.len() + FRAME_LEN - FRAME_HEADER.len(), 0);
    }
    std::fs::write(path, data)?;

    if config.title.is_some() || config.artist.is_some() {
        let mut tag = Tag::new();
        if let Some(title) = &config.title {
            tag.set_title(title.as_str());
        }
        if let Some(artist) = &config.artist {
            tag.set_artist(artist.as_str());
        }
        tag.write_to_path(path, Version::Id3v24)?;
    }

    Ok(path.to_path_buf())
}
