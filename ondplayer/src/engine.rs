//! The engine task and its handle
//!
//! One [`Engine`] per mounted widget. It spawns a single task that owns the
//! controller and processes, one at a time: user commands, device events and
//! finished catalog fetches. Catalog fetches run in their own task, tagged
//! with a fetch generation; issuing a new fetch aborts the previous task and
//! stale results are discarded, so a later query always wins over an
//! earlier one's in-flight side effects.

use std::fmt;
use std::sync::Arc;

use ondsource::{Station, Track, TrackQuery, TrackSource};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace};

use crate::config_ext::PlayerConfigExt;
use crate::controller::Controller;
use crate::device::{AudioDevice, DeviceEvent};
use crate::error::{Error, Result};
use crate::session::PlaybackSession;

/// A user-facing operation on the playback engine
pub enum PlayerCommand {
    /// Start or resume playback (retries from `Error`)
    Play,
    /// Suspend playback
    Pause,
    /// Toggle between the two above
    TogglePlay,
    /// Skip to the next source, wrapping
    Next,
    /// Skip to the previous source, wrapping
    Prev,
    /// Bind the track at this queue index and play it
    SelectTrack(usize),
    /// Bind the stream variant at this index, preserving playback intent
    SelectVariant(usize),
    /// Jump to a position in seconds (requires a known duration)
    Seek(f64),
    /// Store a new volume, clamped to `[0, 1]`
    SetVolume(f32),
    /// Flip the mute flag without touching the stored volume
    ToggleMute,
    /// Re-bind the current source (reload the stream)
    Reload,
    /// Adopt a track list directly (bypasses the provider)
    SetTracks(Vec<Track>),
    /// Bind a live station; its variants become the source list
    SetStation(Station),
    /// Query the provider; supersedes any fetch still in flight
    Fetch {
        /// Where tracks come from
        provider: Arc<dyn TrackSource>,
        /// What to ask for
        query: TrackQuery,
    },
    /// Tear the engine down
    Shutdown,
}

impl fmt::Debug for PlayerCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerCommand::Play => write!(f, "Play"),
            PlayerCommand::Pause => write!(f, "Pause"),
            PlayerCommand::TogglePlay => write!(f, "TogglePlay"),
            PlayerCommand::Next => write!(f, "Next"),
            PlayerCommand::Prev => write!(f, "Prev"),
            PlayerCommand::SelectTrack(i) => write!(f, "SelectTrack({i})"),
            PlayerCommand::SelectVariant(i) => write!(f, "SelectVariant({i})"),
            PlayerCommand::Seek(p) => write!(f, "Seek({p})"),
            PlayerCommand::SetVolume(v) => write!(f, "SetVolume({v})"),
            PlayerCommand::ToggleMute => write!(f, "ToggleMute"),
            PlayerCommand::Reload => write!(f, "Reload"),
            PlayerCommand::SetTracks(tracks) => write!(f, "SetTracks({} tracks)", tracks.len()),
            PlayerCommand::SetStation(station) => write!(f, "SetStation({})", station.name),
            PlayerCommand::Fetch { provider, query } => {
                write!(f, "Fetch({}, {:?})", provider.name(), query)
            }
            PlayerCommand::Shutdown => write!(f, "Shutdown"),
        }
    }
}

/// Construction options for [`Engine`]
#[derive(Default)]
pub struct EngineOptions {
    /// Volume restored at startup; read from the configuration when absent
    pub initial_volume: Option<f32>,
    /// Configuration used to persist the volume preference
    pub config: Option<Arc<ondconfig::Config>>,
}

/// Handle to a running playback engine.
///
/// Dropping the handle tears the engine down: the device is released and
/// any in-flight fetch is aborted.
pub struct Engine {
    cmd_tx: mpsc::UnboundedSender<PlayerCommand>,
    snapshot_rx: watch::Receiver<PlaybackSession>,
    task: Option<JoinHandle<()>>,
}

impl Engine {
    /// Spawns the engine task around an audio device.
    ///
    /// `device_events` must be the receiving half of the channel the device
    /// reports into (see [`crate::device::device_channel`]).
    pub fn new(
        device: Box<dyn AudioDevice>,
        device_events: mpsc::UnboundedReceiver<DeviceEvent>,
        options: EngineOptions,
    ) -> Self {
        let initial_volume = options.initial_volume.unwrap_or_else(|| {
            options
                .config
                .as_deref()
                .map(|c| c.get_playback_volume())
                .unwrap_or(crate::session::DEFAULT_VOLUME)
        });

        let (snapshot_tx, snapshot_rx) =
            watch::channel(PlaybackSession::new(initial_volume));
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();

        let controller = Controller::new(device, initial_volume, options.config, snapshot_tx);
        let task = tokio::spawn(engine_loop(controller, cmd_rx, device_events));

        info!("Playback engine started");
        Self {
            cmd_tx,
            snapshot_rx,
            task: Some(task),
        }
    }

    /// Sends a command to the engine task.
    pub fn command(&self, command: PlayerCommand) -> Result<()> {
        self.cmd_tx
            .send(command)
            .map_err(|_| Error::EngineClosed)
    }

    /// Start or resume playback.
    pub fn play(&self) -> Result<()> {
        self.command(PlayerCommand::Play)
    }

    /// Suspend playback.
    pub fn pause(&self) -> Result<()> {
        self.command(PlayerCommand::Pause)
    }

    /// Toggle play/pause.
    pub fn toggle_play(&self) -> Result<()> {
        self.command(PlayerCommand::TogglePlay)
    }

    /// Skip forward.
    pub fn next(&self) -> Result<()> {
        self.command(PlayerCommand::Next)
    }

    /// Skip backward.
    pub fn prev(&self) -> Result<()> {
        self.command(PlayerCommand::Prev)
    }

    /// Select a track by queue index and play it.
    pub fn select_track(&self, index: usize) -> Result<()> {
        self.command(PlayerCommand::SelectTrack(index))
    }

    /// Select a stream variant by index, preserving playback intent.
    pub fn select_variant(&self, index: usize) -> Result<()> {
        self.command(PlayerCommand::SelectVariant(index))
    }

    /// Jump to a position in seconds.
    pub fn seek(&self, position: f64) -> Result<()> {
        self.command(PlayerCommand::Seek(position))
    }

    /// Store a new volume.
    pub fn set_volume(&self, volume: f32) -> Result<()> {
        self.command(PlayerCommand::SetVolume(volume))
    }

    /// Flip mute.
    pub fn toggle_mute(&self) -> Result<()> {
        self.command(PlayerCommand::ToggleMute)
    }

    /// Re-bind the current source.
    pub fn reload(&self) -> Result<()> {
        self.command(PlayerCommand::Reload)
    }

    /// Adopt a track list directly.
    pub fn set_tracks(&self, tracks: Vec<Track>) -> Result<()> {
        self.command(PlayerCommand::SetTracks(tracks))
    }

    /// Bind a live station.
    pub fn set_station(&self, station: Station) -> Result<()> {
        self.command(PlayerCommand::SetStation(station))
    }

    /// Query a provider for tracks; supersedes any fetch in flight.
    pub fn fetch(&self, provider: Arc<dyn TrackSource>, query: TrackQuery) -> Result<()> {
        self.command(PlayerCommand::Fetch { provider, query })
    }

    /// Watch the session snapshots.
    pub fn subscribe(&self) -> watch::Receiver<PlaybackSession> {
        self.snapshot_rx.clone()
    }

    /// The latest session snapshot.
    pub fn snapshot(&self) -> PlaybackSession {
        self.snapshot_rx.borrow().clone()
    }

    /// Graceful teardown: releases the device, aborts any in-flight fetch
    /// and waits for the engine task to finish.
    pub async fn shutdown(mut self) {
        let _ = self.cmd_tx.send(PlayerCommand::Shutdown);
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            // Best effort: ask the task to release the device; if the
            // runtime is already gone the abort below still stops it.
            let _ = self.cmd_tx.send(PlayerCommand::Shutdown);
            task.abort();
        }
    }
}

/// One finished fetch, tagged with its generation
type FetchOutcome = (u64, ondsource::Result<Vec<Track>>);

async fn engine_loop(
    mut controller: Controller,
    mut cmd_rx: mpsc::UnboundedReceiver<PlayerCommand>,
    mut device_rx: mpsc::UnboundedReceiver<DeviceEvent>,
) {
    let (fetch_tx, mut fetch_rx) = mpsc::unbounded_channel::<FetchOutcome>();
    let mut fetch_generation: u64 = 0;
    let mut fetch_task: Option<JoinHandle<()>> = None;

    loop {
        tokio::select! {
            Some(command) = cmd_rx.recv() => {
                match command {
                    PlayerCommand::Fetch { provider, query } => {
                        fetch_generation += 1;
                        let generation = fetch_generation;
                        if let Some(task) = fetch_task.take() {
                            // The newer query supersedes the old one.
                            task.abort();
                        }
                        let tx = fetch_tx.clone();
                        debug!(provider = provider.name(), generation, "Starting catalog fetch");
                        fetch_task = Some(tokio::spawn(async move {
                            let result = provider.fetch_tracks(&query).await;
                            let _ = tx.send((generation, result));
                        }));
                    }
                    PlayerCommand::Shutdown => {
                        if let Some(task) = fetch_task.take() {
                            task.abort();
                        }
                        controller.shutdown();
                        break;
                    }
                    other => apply_command(&mut controller, other),
                }
            }
            Some(event) = device_rx.recv() => {
                controller.handle_device_event(event);
            }
            Some((generation, result)) = fetch_rx.recv() => {
                if generation != fetch_generation {
                    trace!(generation, current = fetch_generation, "Discarding superseded fetch result");
                    continue;
                }
                fetch_task = None;
                match result {
                    Ok(tracks) => {
                        debug!(count = tracks.len(), "Adopting catalog result");
                        controller.adopt_tracks(tracks);
                    }
                    Err(error) => controller.fetch_failed(&error),
                }
            }
            else => {
                // Every input channel closed: tear down.
                if let Some(task) = fetch_task.take() {
                    task.abort();
                }
                controller.shutdown();
                break;
            }
        }
    }
}

fn apply_command(controller: &mut Controller, command: PlayerCommand) {
    trace!(?command, "Applying command");
    match command {
        PlayerCommand::Play => controller.play(),
        PlayerCommand::Pause => controller.pause(),
        PlayerCommand::TogglePlay => controller.toggle_play(),
        PlayerCommand::Next => controller.skip(1),
        PlayerCommand::Prev => controller.skip(-1),
        PlayerCommand::SelectTrack(index) => controller.select_track(index),
        PlayerCommand::SelectVariant(index) => controller.select_variant(index),
        PlayerCommand::Seek(position) => controller.seek(position),
        PlayerCommand::SetVolume(volume) => controller.set_volume(volume),
        PlayerCommand::ToggleMute => controller.toggle_mute(),
        PlayerCommand::Reload => controller.reload(),
        PlayerCommand::SetTracks(tracks) => controller.adopt_tracks(tracks),
        PlayerCommand::SetStation(station) => controller.set_station(station),
        // Handled by the loop itself.
        PlayerCommand::Fetch { .. } | PlayerCommand::Shutdown => unreachable!(),
    }
}
