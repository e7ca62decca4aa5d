//! Streaming playback engine for Ondes
//!
//! This crate owns the one piece of the system with real state-machine and
//! concurrency concerns: a single audio output driven through the
//! `Idle → Loading → Buffering → Playing → Paused → Error` lifecycle,
//! reconciling asynchronous device events with UI-visible state.
//!
//! # Architecture
//!
//! - [`AudioDevice`] is the seam to the physical output. Only the
//!   controller touches it; implementations report back through a channel
//!   of generation-tagged [`DeviceEvent`]s.
//! - The controller is a reducer running on a single engine task: commands,
//!   device events and finished catalog fetches are applied one at a time.
//!   Events from superseded loads are discarded by generation, so two rapid
//!   source selections can never interleave into inconsistent state.
//! - [`QueueCursor`] keeps the circular position in the current source
//!   list (catalog tracks, or the quality variants of a live station).
//! - Every reduction publishes a [`PlaybackSession`] snapshot on a
//!   `tokio::sync::watch` channel for the rendering layer.
//!
//! # Example
//!
//! ```no_run
//! use ondplayer::{device_channel, Engine, EngineOptions, RodioDevice};
//! use ondsource::default_stations;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (events_tx, events_rx) = device_channel();
//!     let device = RodioDevice::spawn(events_tx)?;
//!     let engine = Engine::new(Box::new(device), events_rx, EngineOptions::default());
//!
//!     let station = default_stations().remove(0);
//!     engine.set_station(station)?;
//!     engine.play()?;
//!
//!     let mut snapshots = engine.subscribe();
//!     snapshots.changed().await?;
//!     println!("phase: {:?}", snapshots.borrow().phase);
//!
//!     engine.shutdown().await;
//!     Ok(())
//! }
//! ```
//!
//! # Failure semantics
//!
//! Errors are reported, never retried automatically beyond "the user presses
//! play again" or "auto-advance picks the next track". Before any
//! transition into the error phase the device is paused, so it can never
//! keep playing stale audio under an error banner.

pub mod config_ext;
pub mod controller;
pub mod device;
pub mod engine;
pub mod error;
pub mod queue;
pub mod session;

#[cfg(feature = "rodio")]
pub mod rodio_device;

// Re-exports
pub use config_ext::PlayerConfigExt;
pub use controller::{PlayerSource, PLAYBACK_BLOCKED};
pub use device::{device_channel, AudioDevice, DeviceError, DeviceEvent, DeviceEventKind};
pub use engine::{Engine, EngineOptions, PlayerCommand};
pub use error::{Error, Result};
pub use queue::QueueCursor;
pub use session::{PlaybackPhase, PlaybackSession, SourceInfo, DEFAULT_VOLUME};

#[cfg(feature = "rodio")]
pub use rodio_device::RodioDevice;
