//! Error types for the playback engine

/// Result type alias for playback operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while driving playback
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The device refused to start playback (autoplay policy, missing
    /// output…). Recoverable: a new play request retries.
    #[error("playback blocked, retry")]
    PlaybackRejected,

    /// Runtime decode/network failure reported by the device mid-playback
    #[error("audio device error: {0}")]
    Device(String),

    /// The track catalog could not be queried
    #[error(transparent)]
    Source(#[from] ondsource::Error),

    /// The engine task is no longer running
    #[error("engine is shut down")]
    EngineClosed,
}

impl Error {
    /// Create a device error from a message
    pub fn device(msg: impl Into<String>) -> Self {
        Self::Device(msg.into())
    }
}
