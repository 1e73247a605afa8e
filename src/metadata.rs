//! Track metadata lookups (title, artist, embedded cover art).
//!
//! Tags are read on demand when a track starts; nothing is cached.

use std::path::Path;

use lofty::picture::PictureType;
use lofty::prelude::*;
use tracing::debug;

/// Title and artist shown for the playing track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackTags {
    pub title: String,
    pub artist: String,
}

/// Source of display metadata for audio files.
pub trait MetadataProvider {
    /// Best-effort tags; falls back to the file name and a placeholder artist.
    fn read_tags(&self, path: &Path) -> TrackTags;
    /// Raw bytes of the embedded cover image, if any.
    fn read_embedded_art(&self, path: &Path) -> Option<Vec<u8>>;
}

/// Title derived from the file name, used when tags are missing.
pub fn fallback_title(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.trim().is_empty())
        .unwrap_or("UNKNOWN")
        .to_string()
}

/// Metadata provider backed by `lofty`.
pub struct LoftyMetadata {
    unknown_artist: String,
}

impl LoftyMetadata {
    pub fn new(unknown_artist: impl Into<String>) -> Self {
        Self {
            unknown_artist: unknown_artist.into(),
        }
    }
}

impl MetadataProvider for LoftyMetadata {
    fn read_tags(&self, path: &Path) -> TrackTags {
        let mut tags = TrackTags {
            title: fallback_title(path),
            artist: self.unknown_artist.clone(),
        };

        let tagged = match lofty::read_from_path(path) {
            Ok(tagged) => tagged,
            Err(err) => {
                debug!(path = %path.display(), error = %err, "no readable tags");
                return tags;
            }
        };

        if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
            if let Some(v) = tag.title() {
                if !v.trim().is_empty() {
                    tags.title = v.trim().to_string();
                }
            }
            if let Some(v) = tag.artist() {
                if !v.trim().is_empty() {
                    tags.artist = v.trim().to_string();
                }
            }
        }

        tags
    }

    fn read_embedded_art(&self, path: &Path) -> Option<Vec<u8>> {
        let tagged = lofty::read_from_path(path).ok()?;
        let tag = tagged.primary_tag().or_else(|| tagged.first_tag())?;
        let pictures = tag.pictures();

        pictures
            .iter()
            .find(|p| p.pic_type() == PictureType::CoverFront)
            .or_else(|| pictures.first())
            .map(|p| p.data().to_vec())
    }
}
