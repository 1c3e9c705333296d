//! MP3 probing and ID3 tag access
//!
//! Stream properties come from `lofty`'s MPEG reader; title/artist tags are
//! read and written with the `id3` crate (ID3v2.4 on write).

use std::fs::File;
use std::path::Path;
use std::time::Duration;

use id3::{ErrorKind, Tag, TagLike, Version};
use lofty::config::ParseOptions;
use lofty::file::AudioFile;
use lofty::mpeg::MpegFile;
use tracing::debug;

use crate::{Error, Result};

/// Stream properties of an MP3 file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mp3Info {
    pub duration: Duration,
    /// Audio bitrate in kbps
    pub bitrate: u32,
    pub sample_rate: u32,
    pub channels: u8,
    /// Stream was located but its properties are implausible
    pub sketchy: bool,
}

/// Parse the MPEG stream of `path`
///
/// # Errors
/// `Error::Audio` when no MPEG frame header can be found, `Error::Io` when
/// the file cannot be opened.
pub fn probe_mp3(path: &Path) -> Result<Mp3Info> {
    let mut file = File::open(path)?;
    let mpeg = MpegFile::read_from(&mut file, ParseOptions::new())
        .map_err(|e| Error::Audio(format!("header not found in {}: {}", path.display(), e)))?;

    let properties = mpeg.properties();
    let duration = properties.duration();
    let bitrate = properties.audio_bitrate();
    let sample_rate = properties.sample_rate();

    let sketchy = bitrate == 0 || sample_rate == 0 || duration.is_zero();
    if sketchy {
        debug!(
            path = %path.display(),
            bitrate,
            sample_rate,
            "MPEG stream has implausible properties"
        );
    }

    Ok(Mp3Info {
        duration,
        bitrate,
        sample_rate,
        channels: properties.channels(),
        sketchy,
    })
}

/// Title and artist as stored in ID3
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackTags {
    pub title: Option<String>,
    pub artist: Option<String>,
}

/// Read title and artist tags; a file without a tag yields empty tags
///
/// Only the first value of a multi-valued frame is used. Empty values count
/// as absent.
pub fn read_tags(path: &Path) -> Result<TrackTags> {
    let Some(tag) = read_id3(path)? else {
        return Ok(TrackTags::default());
    };

    Ok(TrackTags {
        title: first_value(tag.title()),
        artist: first_value(tag.artist()),
    })
}

/// ID3v2.4 text frames separate multiple values with NUL
fn first_value(raw: Option<&str>) -> Option<String> {
    raw.and_then(|v| v.split('\0').next())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Overwrite title and/or artist, keeping every other frame
///
/// Fields set to `None` are left as they are.
pub fn write_tags(path: &Path, tags: &TrackTags) -> Result<()> {
    let mut tag = read_id3(path)?.unwrap_or_else(Tag::new);

    if let Some(title) = &tags.title {
        tag.set_title(title.as_str());
    }
    if let Some(artist) = &tags.artist {
        tag.set_artist(artist.as_str());
    }

    tag.write_to_path(path, Version::Id3v24)?;
    debug!(path = %path.display(), ?tags, "Wrote ID3 tags");
    Ok(())
}

fn read_id3(path: &Path) -> Result<Option<Tag>> {
    match Tag::read_from_path(path) {
        Ok(tag) => Ok(Some(tag)),
        Err(e) if matches!(e.kind, ErrorKind::NoTag) => Ok(None),
        Err(e) => Err(e.into()),
    }
}
