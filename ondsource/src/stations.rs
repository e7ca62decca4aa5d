//! Live station configuration
//!
//! Stations are static, code-defined configuration: each one carries an
//! ordered, non-empty list of stream variants (quality/bitrate options).
//! Nothing here is persisted or mutated at runtime.

use serde::{Deserialize, Serialize};

/// A named quality option for a live station
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamVariant {
    /// Display label, e.g. "MP3 128k"
    pub label: String,
    /// Stream URL
    pub url: String,
}

impl StreamVariant {
    /// Creates a variant from its parts.
    pub fn new(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            url: url.into(),
        }
    }
}

/// A live station with its quality variants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Station {
    /// Display name
    pub name: String,
    /// Ordered, non-empty list of stream variants
    pub streams: Vec<StreamVariant>,
}

impl Station {
    /// Creates a station; `streams` must not be empty.
    pub fn new(name: impl Into<String>, streams: Vec<StreamVariant>) -> Self {
        debug_assert!(!streams.is_empty(), "a station needs at least one stream");
        Self {
            name: name.into(),
            streams,
        }
    }

    /// Variant at `index`, if any.
    pub fn variant(&self, index: usize) -> Option<&StreamVariant> {
        self.streams.get(index)
    }

    /// The preferred variant: first of the list.
    pub fn default_variant(&self) -> &StreamVariant {
        &self.streams[0]
    }
}

/// Built-in station table: `(name, [(label, url), …])`
const BUILTIN_STATIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "France Inter",
        &[
            (
                "MP3 128k",
                "https://direct.franceinter.fr/live/franceinter-midfi.mp3",
            ),
            (
                "MP3 64k",
                "https://direct.franceinter.fr/live/franceinter-lofi.mp3",
            ),
        ],
    ),
    (
        "FIP",
        &[("AAC 192k", "https://icecast.radiofrance.fr/fip-hifi.aac")],
    ),
];

/// Returns the built-in station table.
pub fn default_stations() -> Vec<Station> {
    BUILTIN_STATIONS
        .iter()
        .map(|(name, streams)| {
            Station::new(
                *name,
                streams
                    .iter()
                    .map(|(label, url)| StreamVariant::new(*label, *url))
                    .collect(),
            )
        })
        .collect()
}

/// Finds a station by (case-insensitive) name.
pub fn find_station<'a>(stations: &'a [Station], name: &str) -> Option<&'a Station> {
    stations
        .iter()
        .find(|s| s.name.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_stations_are_well_formed() {
        let stations = default_stations();
        assert!(!stations.is_empty());
        for station in &stations {
            assert!(!station.streams.is_empty());
            for variant in &station.streams {
                assert!(variant.url.starts_with("https://"));
                assert!(!variant.label.is_empty());
            }
        }
    }

    #[test]
    fn test_default_variant_is_first() {
        let stations = default_stations();
        let inter = find_station(&stations, "france inter").unwrap();
        assert_eq!(inter.default_variant().label, "MP3 128k");
        assert_eq!(inter.variant(1).unwrap().label, "MP3 64k");
        assert!(inter.variant(7).is_none());
    }

    #[test]
    fn test_find_station_unknown() {
        let stations = default_stations();
        assert!(find_station(&stations, "Radio Nowhere").is_none());
    }
}
