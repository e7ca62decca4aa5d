//! The audio device seam
//!
//! Exactly one [`AudioDevice`] handle exists per engine; only the
//! controller writes to it. Native device callbacks are re-architected as
//! [`DeviceEvent`] values tagged with the **generation** of the load that
//! spawned them, so the controller can discard callbacks from superseded
//! loads instead of letting them mutate current state.
//!
//! Generation 0 is reserved for device-level failures that precede any load
//! (e.g. no audio output available).

use tokio::sync::mpsc;

/// Failure reported synchronously by a device operation
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct DeviceError {
    message: String,
}

impl DeviceError {
    /// Creates an error from a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The human-readable cause.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// What the device reported
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceEventKind {
    /// Enough data to start or resume; clears buffering, does not start
    /// playback by itself
    CanPlay,
    /// The device is stalled waiting for data
    Waiting,
    /// Audio is audible
    Playing,
    /// Progress report; `duration` is 0.0 when unknown (live streams)
    Position { position: f64, duration: f64 },
    /// Natural end of the current source
    Ended,
    /// Runtime decode/network failure, with a human-readable cause
    Failed(String),
}

/// A device callback, tagged with the load generation that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceEvent {
    /// Generation of the `load` call this event belongs to
    pub generation: u64,
    /// What happened
    pub kind: DeviceEventKind,
}

impl DeviceEvent {
    /// Creates an event for the given generation.
    pub fn new(generation: u64, kind: DeviceEventKind) -> Self {
        Self { generation, kind }
    }
}

/// Creates the channel a device uses to report events to the engine.
pub fn device_channel() -> (
    mpsc::UnboundedSender<DeviceEvent>,
    mpsc::UnboundedReceiver<DeviceEvent>,
) {
    mpsc::unbounded_channel()
}

/// One physical audio output.
///
/// Implementations are free to run their own threads; all methods are
/// fire-and-forget except [`AudioDevice::play`], whose rejection models a
/// device refusing to start (autoplay policy, missing output device). Every
/// asynchronous outcome is reported through the event channel the device
/// was constructed with, tagged with the generation passed to `load`.
pub trait AudioDevice: Send {
    /// Binds a new source URL. Fully supersedes any previous load: events
    /// from earlier generations may still arrive but carry their own tag.
    fn load(&mut self, url: &str, generation: u64);

    /// Requests playback to start or resume.
    fn play(&mut self) -> Result<(), DeviceError>;

    /// Suspends playback, keeping the source bound.
    fn pause(&mut self);

    /// Jumps to `position` seconds. Callers clamp beforehand; devices may
    /// ignore unsupported seeks.
    fn seek(&mut self, position: f64);

    /// Applies the effective output volume in `[0, 1]`.
    fn set_volume(&mut self, volume: f32);

    /// Puts the device in a safe state and releases the output handle.
    /// Called exactly once, at teardown.
    fn release(&mut self);
}
