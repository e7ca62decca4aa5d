//! UI-facing playback state
//!
//! [`PlaybackSession`] is the single snapshot the rendering layer consumes.
//! It is owned and mutated exclusively by the controller; everyone else sees
//! clones published through a `tokio::sync::watch` channel.

use serde::Serialize;

/// Volume restored when no preference has been persisted yet.
pub const DEFAULT_VOLUME: f32 = 0.8;

/// Discrete playback phase
///
/// `Error` is recoverable: a new select or play request transitions back to
/// `Loading`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackPhase {
    /// No source selected
    Idle,
    /// Source assigned, device instructed to load, no data yet
    Loading,
    /// Device reports it is waiting for data (may recur after Playing)
    Buffering,
    /// Audio is audible
    Playing,
    /// Playback suspended by the user
    Paused,
    /// Device or network failure; last source/position retained for retry
    Error,
}

impl PlaybackPhase {
    /// Human-readable label
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaybackPhase::Idle => "idle",
            PlaybackPhase::Loading => "loading",
            PlaybackPhase::Buffering => "buffering",
            PlaybackPhase::Playing => "playing",
            PlaybackPhase::Paused => "paused",
            PlaybackPhase::Error => "error",
        }
    }

    /// True while the user intent is "audio should be coming out"
    pub fn is_active(&self) -> bool {
        matches!(self, PlaybackPhase::Playing | PlaybackPhase::Buffering)
    }
}

/// Display data of the source currently bound to the device.
///
/// Holds identifiers and labels only — never the playback resources
/// themselves.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceInfo {
    /// Track id, or stream URL for live variants
    pub id: String,
    /// Track name or station name
    pub title: String,
    /// Artist label, or variant label for live streams
    pub subtitle: String,
    /// Cover art, if any
    pub artwork_url: Option<String>,
}

/// The mutable runtime state of one playback widget.
#[derive(Debug, Clone, Serialize)]
pub struct PlaybackSession {
    /// Current phase
    pub phase: PlaybackPhase,
    /// Source currently bound to the device
    pub current: Option<SourceInfo>,
    /// Playback position in seconds
    pub position: f64,
    /// Known duration in seconds; 0.0 means unknown (live streams)
    pub duration: f64,
    /// Stored volume, always in `[0, 1]`; unaffected by mute
    pub volume: f32,
    /// Mute flag
    pub muted: bool,
    /// Last error message, if any
    pub error: Option<String>,
}

impl PlaybackSession {
    /// Fresh idle session with the given stored volume.
    pub fn new(volume: f32) -> Self {
        Self {
            phase: PlaybackPhase::Idle,
            current: None,
            position: 0.0,
            duration: 0.0,
            volume: volume.clamp(0.0, 1.0),
            muted: false,
            error: None,
        }
    }

    /// Volume actually applied to the device: 0 when muted, the stored
    /// volume otherwise. Derived, never stored.
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.volume
        }
    }

    /// True when seeking is meaningful.
    pub fn has_known_duration(&self) -> bool {
        self.duration.is_finite() && self.duration > 0.0
    }
}

impl Default for PlaybackSession {
    fn default() -> Self {
        Self::new(DEFAULT_VOLUME)
    }
}
