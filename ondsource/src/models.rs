//! Data models for catalog API responses
//!
//! The catalog's JSON is loosely typed: identifiers arrive as strings or
//! numbers, durations as numbers or numeric strings, and cover art under two
//! different field names. All of that tolerance lives here, at the mapping
//! boundary; the rest of the engine only ever sees [`Track`].

use serde::{Deserialize, Deserializer, Serialize};

/// Tags applied when a query carries none.
pub const DEFAULT_TAGS: &[&str] = &["electro", "dance", "pop"];

/// Default result limit for catalog queries.
pub const DEFAULT_LIMIT: u32 = 50;

/// Deserialize a string or number into a String
fn deserialize_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Int(i64),
        Float(f64),
    }

    match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::String(s) => Ok(s),
        StringOrNumber::Int(i) => Ok(i.to_string()),
        StringOrNumber::Float(f) => Ok(f.to_string()),
    }
}

/// Deserialize an optional string or number into Option<f64>
fn deserialize_optional_seconds<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum SecondsRepr {
        String(String),
        Float(f64),
        Int(i64),
    }

    let opt = Option::<SecondsRepr>::deserialize(deserializer)?;
    match opt {
        None => Ok(None),
        Some(SecondsRepr::String(s)) => {
            if s.is_empty() {
                Ok(None)
            } else {
                s.parse::<f64>().map(Some).map_err(D::Error::custom)
            }
        }
        Some(SecondsRepr::Float(f)) => Ok(Some(f)),
        Some(SecondsRepr::Int(i)) => Ok(Some(i as f64)),
    }
}

/// Audio encoding requested from the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioEncoding {
    /// MP3, ~96 kbps
    Mp31,
    /// MP3, ~192 kbps (default)
    Mp32,
    /// Ogg Vorbis
    Ogg,
    /// FLAC lossless
    Flac,
}

impl AudioEncoding {
    /// Query-parameter value for this encoding
    pub fn as_str(&self) -> &'static str {
        match self {
            AudioEncoding::Mp31 => "mp31",
            AudioEncoding::Mp32 => "mp32",
            AudioEncoding::Ogg => "ogg",
            AudioEncoding::Flac => "flac",
        }
    }
}

impl Default for AudioEncoding {
    fn default() -> Self {
        Self::Mp32
    }
}

/// Parameters of a catalog query
///
/// An empty `tags` set means "use [`DEFAULT_TAGS`]"; a blank or
/// whitespace-only `search` is treated as absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackQuery {
    /// Free-text search, optional
    pub search: Option<String>,
    /// Fuzzy tag set; defaults applied when empty
    pub tags: Vec<String>,
    /// Maximum number of results
    pub limit: u32,
    /// Preferred audio encoding
    pub encoding: AudioEncoding,
}

impl Default for TrackQuery {
    fn default() -> Self {
        Self {
            search: None,
            tags: Vec::new(),
            limit: DEFAULT_LIMIT,
            encoding: AudioEncoding::default(),
        }
    }
}

impl TrackQuery {
    /// Query with a free-text search term
    pub fn search(text: impl Into<String>) -> Self {
        Self {
            search: Some(text.into()),
            ..Self::default()
        }
    }

    /// Query restricted to a tag set
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Override the result limit
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// Effective tags: the query's own, or the defaults when empty
    pub fn effective_tags(&self) -> Vec<&str> {
        if self.tags.is_empty() {
            DEFAULT_TAGS.to_vec()
        } else {
            self.tags.iter().map(String::as_str).collect()
        }
    }

    /// Trimmed search text, `None` when blank
    pub fn effective_search(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// A playable catalog track, immutable once fetched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Catalog identifier (always a string, whatever the API sent)
    pub id: String,
    /// Display name
    pub name: String,
    /// Artist or source label
    pub artist: String,
    /// Audio resource URL
    pub audio_url: String,
    /// Cover art URL, if any
    pub artwork_url: Option<String>,
    /// Duration in seconds; 0.0 means unknown
    pub duration_secs: f64,
}

impl Track {
    /// True when the duration is known and usable for seeking
    pub fn has_known_duration(&self) -> bool {
        self.duration_secs.is_finite() && self.duration_secs > 0.0
    }
}

// ============================================================================
// Raw API shapes
// ============================================================================

/// Response envelope of the catalog's track listing endpoint
#[derive(Debug, Deserialize)]
pub(crate) struct CatalogResponse {
    #[serde(default)]
    pub results: Vec<RawTrack>,
}

/// One raw catalog entry, tolerant of the API's shape drift.
///
/// Accepted field aliases, in order of preference:
/// - identifier: `id` (string or number)
/// - cover art: `album_image`, then `image`
/// - duration: `duration` (number or numeric string), may be absent
#[derive(Debug, Deserialize)]
pub(crate) struct RawTrack {
    #[serde(deserialize_with = "deserialize_string_or_number")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub artist_name: String,
    pub audio: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub album_image: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_seconds")]
    pub duration: Option<f64>,
}

impl From<RawTrack> for Track {
    fn from(raw: RawTrack) -> Self {
        let artwork_url = raw
            .album_image
            .filter(|s| !s.is_empty())
            .or(raw.image.filter(|s| !s.is_empty()));
        Track {
            id: raw.id,
            name: raw.name,
            artist: raw.artist_name,
            audio_url: raw.audio,
            artwork_url,
            duration_secs: raw.duration.unwrap_or(0.0),
        }
    }
}
