//! Slug generation
//!
//! Every archive entity carries a URL-safe slug that is unique per entity type.
//! The slug is derived once, when the row is first inserted, from a
//! type-specific base name (see [`SlugSource`]) and never regenerated.

use std::future::Future;

use unicode_normalization::UnicodeNormalization;

use crate::Result;

/// Maximum length of the slugified base name before a collision suffix is added
pub const MAX_BASENAME_LENGTH: usize = 40;

/// Entities that derive their slug from a base name
pub trait SlugSource {
    /// Base name used to auto-generate the slug
    fn slug_basename(&self) -> String;
}

/// Convert arbitrary text to a slug
///
/// Decomposes to NFKD and drops anything non-ASCII, removes characters that are
/// not alphanumerics, underscores, hyphens or whitespace, lowercases, collapses
/// runs of hyphens/whitespace into a single hyphen and strips leading/trailing
/// hyphens and underscores.
pub fn slugify(value: &str) -> String {
    let ascii: String = value.nfkd().filter(char::is_ascii).collect();

    let mut out = String::with_capacity(ascii.len());
    let mut pending_dash = false;
    for c in ascii.chars().map(|c| c.to_ascii_lowercase()) {
        if c == '-' || c.is_ascii_whitespace() {
            pending_dash = true;
        } else if c.is_ascii_alphanumeric() || c == '_' {
            if pending_dash {
                out.push('-');
                pending_dash = false;
            }
            out.push(c);
        }
        // Any other punctuation is dropped without breaking a run
    }
    if pending_dash {
        out.push('-');
    }

    out.trim_matches(|c| c == '-' || c == '_').to_string()
}

/// Generate a slug for `basename` that is not yet taken
///
/// The slugified base name is truncated to [`MAX_BASENAME_LENGTH`] characters.
/// If that slug is already taken, `-2`, `-3`, ... is appended until `exists`
/// reports a free one.
///
/// # Arguments
/// * `basename` - Human-readable base name
/// * `exists` - Uniqueness check, called with each candidate slug
pub async fn generate_unique_slug<F, Fut>(basename: &str, mut exists: F) -> Result<String>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    let base: String = slugify(basename).chars().take(MAX_BASENAME_LENGTH).collect();

    let mut slug = base.clone();
    let mut num = 1;
    while exists(slug.clone()).await? {
        num += 1;
        slug = format!("{}-{}", base, num);
    }

    Ok(slug)
}
