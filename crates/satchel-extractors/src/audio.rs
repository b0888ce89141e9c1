//! Audio container extraction using symphonia.
//!
//! Audio carries no body text, so the extracted text is made of the
//! container's descriptive tags (title, artist, album and so on). A
//! readable container without tags yields empty text.

use std::io::Cursor;

use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::{MetadataOptions, StandardTagKey, Tag};
use symphonia::core::probe::Hint;

use crate::date::parse_date;
use crate::detect::sniff_magic;
use crate::error::{ExtractError, ExtractResult};
use crate::types::{non_empty, ExtractedContent, Modality};
use crate::Extractor;

/// Audio tag extractor.
#[derive(Debug, Clone, Default)]
pub struct AudioExtractor;

/// Tags collected from the probe and the format reader.
#[derive(Debug, Default, PartialEq)]
struct AudioTags {
    title: Option<String>,
    artist: Option<String>,
    album: Option<String>,
    date: Option<String>,
    genre: Option<String>,
    comment: Option<String>,
}

impl AudioTags {
    /// Fold tags in; the first value seen for a key wins.
    fn absorb(&mut self, tags: &[Tag]) {
        for tag in tags {
            let Some(key) = &tag.std_key else { continue };
            let slot = match key {
                StandardTagKey::TrackTitle => &mut self.title,
                StandardTagKey::Artist | StandardTagKey::AlbumArtist => &mut self.artist,
                StandardTagKey::Album => &mut self.album,
                StandardTagKey::Date | StandardTagKey::ReleaseDate => &mut self.date,
                StandardTagKey::Genre => &mut self.genre,
                StandardTagKey::Comment => &mut self.comment,
                _ => continue,
            };
            if slot.is_none() {
                *slot = non_empty(tag.value.to_string());
            }
        }
    }

    fn text(&self) -> String {
        [
            &self.title,
            &self.artist,
            &self.album,
            &self.date,
            &self.genre,
            &self.comment,
        ]
        .into_iter()
        .flatten()
        .cloned()
        .collect::<Vec<_>>()
        .join("\n")
    }
}

impl AudioExtractor {
    /// Create a new audio extractor.
    pub fn new() -> Self {
        Self
    }

    fn container_format(content: &[u8]) -> &'static str {
        match sniff_magic(content) {
            Some("audio/mpeg") => "mp3",
            Some("audio/wav") => "wav",
            Some("audio/flac") => "flac",
            Some("audio/ogg") => "ogg",
            _ => "unknown",
        }
    }

    fn read_tags(content: &[u8]) -> ExtractResult<AudioTags> {
        let cursor = Cursor::new(content.to_vec());
        let mss = MediaSourceStream::new(Box::new(cursor), Default::default());

        let mut probed = symphonia::default::get_probe()
            .format(
                &Hint::new(),
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| ExtractError::Audio(format!("probe: {}", e)))?;

        if probed.format.default_track().is_none() {
            return Err(ExtractError::Audio("no audio track found".to_string()));
        }

        let mut tags = AudioTags::default();
        if let Some(metadata) = probed.metadata.get() {
            if let Some(revision) = metadata.current() {
                tags.absorb(revision.tags());
            }
        }
        if let Some(revision) = probed.format.metadata().current() {
            tags.absorb(revision.tags());
        }

        Ok(tags)
    }
}

impl Extractor for AudioExtractor {
    fn extract(&self, content: &[u8]) -> ExtractResult<ExtractedContent> {
        let tags = Self::read_tags(content)?;
        let format = Self::container_format(content).to_string();

        Ok(ExtractedContent::new(tags.text(), Modality::Audio { format })
            .with_title(tags.title.clone())
            .with_author(tags.artist.clone())
            .with_keywords(tags.genre.clone())
            .with_date(tags.date.as_deref().and_then(parse_date)))
    }

    fn supported_types(&self) -> &[&str] {
        &[
            "audio/mpeg",
            "audio/mp3",
            "audio/wav",
            "audio/x-wav",
            "audio/flac",
            "audio/ogg",
        ]
    }

    fn name(&self) -> &str {
        "symphonia"
    }
}
