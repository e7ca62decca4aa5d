//! Playback controller state machine
//!
//! A single reducer owns the audio device, the source cursor and the
//! session snapshot. Commands and device events are applied one at a time
//! on the engine task; there is no shared mutable state. Every reduction
//! that changes the session publishes a fresh snapshot on the watch
//! channel.
//!
//! Staleness rule: each `load` bumps a generation counter, and every device
//! event carries the generation of the load that produced it. Events from a
//! superseded generation are discarded before they can touch the session.

use std::sync::Arc;

use ondsource::{Station, StreamVariant, Track};
use tokio::sync::watch;
use tracing::{debug, trace, warn};

use crate::config_ext::PlayerConfigExt;
use crate::device::{AudioDevice, DeviceEvent, DeviceEventKind};
use crate::queue::QueueCursor;
use crate::session::{PlaybackPhase, PlaybackSession, SourceInfo};

/// Error message shown when the device rejects a play request.
pub const PLAYBACK_BLOCKED: &str = "playback blocked, retry";

/// Something the controller can bind to the device
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerSource {
    /// A catalog track
    Track(Track),
    /// A quality variant of a live station
    Variant {
        /// Station display name
        station: String,
        /// The selected stream
        variant: StreamVariant,
    },
}

impl PlayerSource {
    /// Audio resource URL
    pub fn url(&self) -> &str {
        match self {
            PlayerSource::Track(track) => &track.audio_url,
            PlayerSource::Variant { variant, .. } => &variant.url,
        }
    }

    /// Display data for the session snapshot
    pub fn info(&self) -> SourceInfo {
        match self {
            PlayerSource::Track(track) => SourceInfo {
                id: track.id.clone(),
                title: track.name.clone(),
                subtitle: track.artist.clone(),
                artwork_url: track.artwork_url.clone(),
            },
            PlayerSource::Variant { station, variant } => SourceInfo {
                id: variant.url.clone(),
                title: station.clone(),
                subtitle: variant.label.clone(),
                artwork_url: None,
            },
        }
    }

    /// Duration known before the device reports one (0.0 = unknown)
    fn duration_hint(&self) -> f64 {
        match self {
            PlayerSource::Track(track) => track.duration_secs,
            PlayerSource::Variant { .. } => 0.0,
        }
    }
}

/// The reducer. Owned by the engine task; never shared.
pub(crate) struct Controller {
    device: Box<dyn AudioDevice>,
    sources: QueueCursor<PlayerSource>,
    generation: u64,
    /// User intent: should audio be coming out once data is ready
    intent_playing: bool,
    session: PlaybackSession,
    snapshot_tx: watch::Sender<PlaybackSession>,
    config: Option<Arc<ondconfig::Config>>,
}

impl Controller {
    pub(crate) fn new(
        device: Box<dyn AudioDevice>,
        initial_volume: f32,
        config: Option<Arc<ondconfig::Config>>,
        snapshot_tx: watch::Sender<PlaybackSession>,
    ) -> Self {
        let session = PlaybackSession::new(initial_volume);
        let mut controller = Self {
            device,
            sources: QueueCursor::new(),
            generation: 0,
            intent_playing: false,
            session,
            snapshot_tx,
            config,
        };
        controller
            .device
            .set_volume(controller.session.effective_volume());
        controller.publish();
        controller
    }

    #[cfg(test)]
    pub(crate) fn session(&self) -> &PlaybackSession {
        &self.session
    }

    #[cfg(test)]
    pub(crate) fn current_generation(&self) -> u64 {
        self.generation
    }

    #[cfg(test)]
    pub(crate) fn queue_index(&self) -> usize {
        self.sources.index()
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(self.session.clone());
    }

    // ========================================================================
    // Source selection
    // ========================================================================

    /// Adopts a fresh catalog result. Resets the cursor to the first track
    /// and binds it; an empty result clears the player back to idle.
    pub(crate) fn adopt_tracks(&mut self, tracks: Vec<Track>) {
        self.sources
            .set_items(tracks.into_iter().map(PlayerSource::Track).collect());
        if self.sources.is_empty() {
            self.device.pause();
            self.session.phase = PlaybackPhase::Idle;
            self.session.current = None;
            self.session.position = 0.0;
            self.session.duration = 0.0;
            self.publish();
        } else {
            self.load_current();
        }
    }

    /// Binds a live station: its variants become the source list, the
    /// preferred (first) variant is loaded. Playback intent is preserved,
    /// so switching stations mid-listen keeps the audio rolling.
    pub(crate) fn set_station(&mut self, station: Station) {
        let name = station.name.clone();
        self.sources.set_items(
            station
                .streams
                .into_iter()
                .map(|variant| PlayerSource::Variant {
                    station: name.clone(),
                    variant,
                })
                .collect(),
        );
        if self.sources.is_empty() {
            warn!(station = %name, "Station has no stream variants");
            return;
        }
        self.load_current();
    }

    /// A catalog fetch failed: surface it as an error state, leaving the
    /// last-known source and position intact for retry.
    pub(crate) fn fetch_failed(&mut self, error: &ondsource::Error) {
        debug!(%error, "Catalog fetch failed");
        self.device.pause();
        self.intent_playing = false;
        self.session.phase = PlaybackPhase::Error;
        self.session.error = Some(error.to_string());
        self.publish();
    }

    fn select_index(&mut self, index: usize, force_play: bool) {
        if self.sources.select(index).is_none() {
            trace!(index, "Ignoring out-of-range selection");
            return;
        }
        if force_play {
            self.intent_playing = true;
        }
        self.load_current();
    }

    /// Binds the source under the cursor to the device.
    ///
    /// This is the one place the generation advances: every event from a
    /// previous load becomes stale the moment we return.
    fn load_current(&mut self) {
        let Some(source) = self.sources.current() else {
            return;
        };
        self.generation += 1;
        self.session.current = Some(source.info());
        self.session.position = 0.0;
        self.session.duration = source.duration_hint();
        self.session.error = None;
        self.session.phase = PlaybackPhase::Loading;

        let url = source.url().to_string();
        self.device.set_volume(self.session.effective_volume());
        self.device.load(&url, self.generation);
        if self.intent_playing {
            // Autoplay-continue: the session was playing, keep it playing on
            // the new source; a rejection is an error, not a crash.
            self.request_play(false);
        }
        self.publish();
    }

    // ========================================================================
    // Commands
    // ========================================================================

    pub(crate) fn play(&mut self) {
        match self.session.phase {
            PlaybackPhase::Playing | PlaybackPhase::Buffering => {
                self.intent_playing = true;
            }
            PlaybackPhase::Loading => {
                self.intent_playing = true;
                self.request_play(false);
                self.publish();
            }
            PlaybackPhase::Paused => {
                self.intent_playing = true;
                self.request_play(true);
                self.publish();
            }
            PlaybackPhase::Idle | PlaybackPhase::Error => {
                // Retry resumes the last context: reload the current source.
                if self.sources.current().is_some() {
                    self.intent_playing = true;
                    self.load_current();
                }
            }
        }
    }

    pub(crate) fn pause(&mut self) {
        if matches!(
            self.session.phase,
            PlaybackPhase::Playing | PlaybackPhase::Buffering | PlaybackPhase::Loading
        ) {
            self.device.pause();
            self.intent_playing = false;
            self.session.phase = PlaybackPhase::Paused;
            self.publish();
        }
    }

    pub(crate) fn toggle_play(&mut self) {
        if self.session.phase.is_active() {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Skips to the neighboring source. Catalog tracks always start playing
    /// on a skip; live variants keep the current intent.
    pub(crate) fn skip(&mut self, direction: i32) {
        if self.sources.advance(direction).is_none() {
            return;
        }
        if matches!(self.sources.current(), Some(PlayerSource::Track(_))) {
            self.intent_playing = true;
        }
        self.load_current();
    }

    pub(crate) fn select_track(&mut self, index: usize) {
        self.select_index(index, true);
    }

    pub(crate) fn select_variant(&mut self, index: usize) {
        self.select_index(index, false);
    }

    /// Re-binds the current source ("reload the stream").
    pub(crate) fn reload(&mut self) {
        self.load_current();
    }

    pub(crate) fn seek(&mut self, position: f64) {
        if !self.session.has_known_duration() {
            trace!("Ignoring seek: duration unknown");
            return;
        }
        let clamped = position.clamp(0.0, self.session.duration);
        self.device.seek(clamped);
        self.session.position = clamped;
        self.publish();
    }

    pub(crate) fn set_volume(&mut self, volume: f32) {
        let clamped = volume.clamp(0.0, 1.0);
        self.session.volume = clamped;
        if !self.session.muted {
            self.device.set_volume(clamped);
        }
        self.persist_volume(clamped);
        self.publish();
    }

    pub(crate) fn toggle_mute(&mut self) {
        self.session.muted = !self.session.muted;
        self.device.set_volume(self.session.effective_volume());
        self.publish();
    }

    pub(crate) fn shutdown(&mut self) {
        self.device.release();
        self.intent_playing = false;
        self.session.phase = PlaybackPhase::Idle;
        self.publish();
    }

    fn request_play(&mut self, immediate: bool) {
        match self.device.play() {
            Ok(()) => {
                if immediate {
                    // Resuming from pause: audio restarts right away.
                    self.session.phase = PlaybackPhase::Playing;
                }
                // Otherwise stay in Loading; the device's "playing" event
                // confirms audible output.
            }
            Err(err) => {
                debug!(%err, "Device rejected play request");
                self.fail(PLAYBACK_BLOCKED.to_string());
            }
        }
    }

    /// Moves to the error phase, forcing the device into a safe state first
    /// so it never keeps playing stale audio under an error banner.
    fn fail(&mut self, message: String) {
        self.device.pause();
        self.intent_playing = false;
        self.session.phase = PlaybackPhase::Error;
        self.session.error = Some(message);
    }

    fn persist_volume(&self, volume: f32) {
        if let Some(config) = &self.config {
            if let Err(err) = config.set_playback_volume(volume) {
                // Preference persistence is best-effort.
                debug!(%err, "Could not persist volume");
            }
        }
    }

    // ========================================================================
    // Device events
    // ========================================================================

    pub(crate) fn handle_device_event(&mut self, event: DeviceEvent) {
        if event.generation != self.generation {
            trace!(
                event_generation = event.generation,
                current_generation = self.generation,
                "Discarding stale device event"
            );
            return;
        }

        match event.kind {
            DeviceEventKind::CanPlay => {
                // Data is ready. This never starts playback by itself: with
                // intent, the pending play request's "playing" event will
                // flip the phase; without it, the source sits ready, paused.
                match self.session.phase {
                    PlaybackPhase::Loading | PlaybackPhase::Buffering if !self.intent_playing => {
                        self.session.phase = PlaybackPhase::Paused;
                        self.publish();
                    }
                    PlaybackPhase::Buffering => {
                        self.session.phase = PlaybackPhase::Playing;
                        self.publish();
                    }
                    _ => {}
                }
            }
            DeviceEventKind::Waiting => {
                if self.session.phase == PlaybackPhase::Playing {
                    self.session.phase = PlaybackPhase::Buffering;
                    self.publish();
                }
            }
            DeviceEventKind::Playing => {
                self.intent_playing = true;
                self.session.phase = PlaybackPhase::Playing;
                self.publish();
            }
            DeviceEventKind::Position { position, duration } => {
                self.session.position = position;
                if duration > 0.0 && duration.is_finite() {
                    self.session.duration = duration;
                }
                self.publish();
            }
            DeviceEventKind::Ended => {
                // Natural completion: the cursor advances circularly and the
                // next source keeps playing without user action.
                if self.sources.advance(1).is_some() {
                    self.intent_playing = true;
                    self.load_current();
                } else {
                    self.intent_playing = false;
                    self.session.phase = PlaybackPhase::Idle;
                    self.publish();
                }
            }
            DeviceEventKind::Failed(message) => {
                self.fail(message);
                self.publish();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::DeviceError;
    use std::sync::{Arc, Mutex};

    /// Scripted device: records every call, optionally rejects play.
    #[derive(Clone, Default)]
    struct MockDevice {
        calls: Arc<Mutex<Vec<String>>>,
        reject_play: Arc<Mutex<bool>>,
    }

    impl MockDevice {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn reject_next_play(&self, reject: bool) {
            *self.reject_play.lock().unwrap() = reject;
        }

        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }
    }

    impl AudioDevice for MockDevice {
        fn load(&mut self, url: &str, generation: u64) {
            self.record(format!("load:{url}:{generation}"));
        }

        fn play(&mut self) -> Result<(), DeviceError> {
            self.record("play".into());
            if *self.reject_play.lock().unwrap() {
                Err(DeviceError::new("autoplay blocked"))
            } else {
                Ok(())
            }
        }

        fn pause(&mut self) {
            self.record("pause".into());
        }

        fn seek(&mut self, position: f64) {
            self.record(format!("seek:{position}"));
        }

        fn set_volume(&mut self, volume: f32) {
            self.record(format!("volume:{volume:.2}"));
        }

        fn release(&mut self) {
            self.record("release".into());
        }
    }

    fn track(id: &str, duration: f64) -> Track {
        Track {
            id: id.to_string(),
            name: format!("Track {id}"),
            artist: "Artist".to_string(),
            audio_url: format!("https://cdn.example.org/{id}.mp3"),
            artwork_url: None,
            duration_secs: duration,
        }
    }

    fn controller_with_mock() -> (Controller, MockDevice) {
        let mock = MockDevice::default();
        let (tx, _rx) = watch::channel(PlaybackSession::default());
        let controller = Controller::new(Box::new(mock.clone()), 0.8, None, tx);
        (controller, mock)
    }

    fn event(generation: u64, kind: DeviceEventKind) -> DeviceEvent {
        DeviceEvent::new(generation, kind)
    }

    #[test]
    fn test_adopt_tracks_loads_first_in_loading_phase() {
        let (mut controller, mock) = controller_with_mock();
        controller.adopt_tracks(vec![track("1", 100.0), track("2", 100.0)]);
        assert_eq!(controller.session().phase, PlaybackPhase::Loading);
        assert_eq!(controller.session().current.as_ref().unwrap().id, "1");
        assert!(mock
            .calls()
            .iter()
            .any(|c| c == "load:https://cdn.example.org/1.mp3:1"));
    }

    #[test]
    fn test_volume_clamped_and_mute_leaves_it_untouched() {
        let (mut controller, mock) = controller_with_mock();
        controller.set_volume(1.8);
        assert_eq!(controller.session().volume, 1.0);
        controller.set_volume(-0.4);
        assert_eq!(controller.session().volume, 0.0);
        controller.set_volume(0.5);

        controller.toggle_mute();
        assert!(controller.session().muted);
        assert_eq!(controller.session().volume, 0.5);
        assert_eq!(controller.session().effective_volume(), 0.0);
        assert!(mock.calls().contains(&"volume:0.00".to_string()));

        controller.toggle_mute();
        assert_eq!(controller.session().effective_volume(), 0.5);

        // Changing volume while muted updates the stored value only.
        controller.toggle_mute();
        let calls_before = mock.calls().len();
        controller.set_volume(0.9);
        assert_eq!(controller.session().volume, 0.9);
        let new_calls: Vec<String> = mock.calls()[calls_before..].to_vec();
        assert!(!new_calls.iter().any(|c| c.starts_with("volume")));
    }

    #[test]
    fn test_seek_clamps_and_requires_known_duration() {
        let (mut controller, mock) = controller_with_mock();
        // Unknown duration: seek must not reach the device.
        controller.adopt_tracks(vec![track("live", 0.0)]);
        controller.seek(30.0);
        assert!(!mock.calls().iter().any(|c| c.starts_with("seek")));

        controller.adopt_tracks(vec![track("song", 200.0)]);
        controller.seek(500.0);
        assert!(mock.calls().contains(&"seek:200".to_string()));
        assert_eq!(controller.session().position, 200.0);
        controller.seek(-20.0);
        assert!(mock.calls().contains(&"seek:0".to_string()));
        assert_eq!(controller.session().position, 0.0);
    }

    #[test]
    fn test_stale_generation_events_are_discarded() {
        let (mut controller, _mock) = controller_with_mock();
        controller.adopt_tracks(vec![track("a", 100.0), track("b", 100.0)]);
        let first_generation = controller.current_generation();

        // Select B before A's load settles.
        controller.select_track(1);
        let second_generation = controller.current_generation();
        assert!(second_generation > first_generation);

        // A's late callbacks arrive after B superseded it.
        controller.handle_device_event(event(first_generation, DeviceEventKind::Playing));
        assert_eq!(controller.session().phase, PlaybackPhase::Loading);
        controller.handle_device_event(event(
            first_generation,
            DeviceEventKind::Failed("old stream died".into()),
        ));
        assert_eq!(controller.session().phase, PlaybackPhase::Loading);
        assert!(controller.session().error.is_none());

        // B's own callback wins.
        controller.handle_device_event(event(second_generation, DeviceEventKind::Playing));
        assert_eq!(controller.session().phase, PlaybackPhase::Playing);
        assert_eq!(controller.session().current.as_ref().unwrap().id, "b");
    }

    #[test]
    fn test_natural_completion_auto_advances() {
        let (mut controller, mock) = controller_with_mock();
        controller.adopt_tracks(vec![track("1", 60.0), track("2", 60.0), track("3", 60.0)]);
        assert_eq!(controller.queue_index(), 0);
        assert_eq!(controller.session().phase, PlaybackPhase::Loading);

        let generation = controller.current_generation();
        controller.handle_device_event(event(generation, DeviceEventKind::Playing));
        assert_eq!(controller.session().phase, PlaybackPhase::Playing);

        controller.handle_device_event(event(generation, DeviceEventKind::Ended));
        assert_eq!(controller.queue_index(), 1);
        assert_eq!(controller.session().phase, PlaybackPhase::Loading);
        assert_eq!(controller.session().current.as_ref().unwrap().id, "2");
        // Auto-advance keeps playing without user action.
        assert!(mock.calls().iter().filter(|c| *c == "play").count() >= 1);

        let generation = controller.current_generation();
        controller.handle_device_event(event(generation, DeviceEventKind::Playing));
        assert_eq!(controller.session().phase, PlaybackPhase::Playing);
    }

    #[test]
    fn test_completion_wraps_around_the_queue() {
        let (mut controller, _mock) = controller_with_mock();
        controller.adopt_tracks(vec![track("1", 60.0), track("2", 60.0)]);
        let generation = controller.current_generation();
        controller.handle_device_event(event(generation, DeviceEventKind::Playing));
        controller.handle_device_event(event(generation, DeviceEventKind::Ended));
        assert_eq!(controller.queue_index(), 1);
        let generation = controller.current_generation();
        controller.handle_device_event(event(generation, DeviceEventKind::Playing));
        controller.handle_device_event(event(generation, DeviceEventKind::Ended));
        // Back to the first track.
        assert_eq!(controller.queue_index(), 0);
    }

    #[test]
    fn test_device_failure_then_play_recovers() {
        let (mut controller, mock) = controller_with_mock();
        controller.adopt_tracks(vec![track("1", 60.0)]);
        let generation = controller.current_generation();
        controller.handle_device_event(event(generation, DeviceEventKind::Playing));

        controller.handle_device_event(event(
            generation,
            DeviceEventKind::Failed("stream read error".into()),
        ));
        assert_eq!(controller.session().phase, PlaybackPhase::Error);
        assert_eq!(
            controller.session().error.as_deref(),
            Some("stream read error")
        );
        // The device was parked before the error was reported.
        assert!(mock.calls().contains(&"pause".to_string()));
        // Context retained for retry.
        assert_eq!(controller.session().current.as_ref().unwrap().id, "1");

        controller.play();
        assert_eq!(controller.session().phase, PlaybackPhase::Loading);
        assert!(controller.session().error.is_none());
        let generation = controller.current_generation();
        controller.handle_device_event(event(generation, DeviceEventKind::Playing));
        assert_eq!(controller.session().phase, PlaybackPhase::Playing);
    }

    #[test]
    fn test_play_rejection_reports_error() {
        let (mut controller, mock) = controller_with_mock();
        controller.adopt_tracks(vec![track("1", 60.0)]);
        let generation = controller.current_generation();
        controller.handle_device_event(event(generation, DeviceEventKind::CanPlay));
        assert_eq!(controller.session().phase, PlaybackPhase::Paused);

        mock.reject_next_play(true);
        controller.play();
        assert_eq!(controller.session().phase, PlaybackPhase::Error);
        assert_eq!(controller.session().error.as_deref(), Some(PLAYBACK_BLOCKED));

        // User presses play again once the device cooperates.
        mock.reject_next_play(false);
        controller.play();
        assert_eq!(controller.session().phase, PlaybackPhase::Loading);
        let generation = controller.current_generation();
        controller.handle_device_event(event(generation, DeviceEventKind::Playing));
        assert_eq!(controller.session().phase, PlaybackPhase::Playing);
    }

    #[test]
    fn test_waiting_makes_playing_buffer_and_canplay_restores() {
        let (mut controller, _mock) = controller_with_mock();
        controller.adopt_tracks(vec![track("1", 60.0)]);
        let generation = controller.current_generation();
        controller.handle_device_event(event(generation, DeviceEventKind::Playing));

        controller.handle_device_event(event(generation, DeviceEventKind::Waiting));
        assert_eq!(controller.session().phase, PlaybackPhase::Buffering);

        controller.handle_device_event(event(generation, DeviceEventKind::CanPlay));
        assert_eq!(controller.session().phase, PlaybackPhase::Playing);
    }

    #[test]
    fn test_pause_and_resume() {
        let (mut controller, _mock) = controller_with_mock();
        controller.adopt_tracks(vec![track("1", 60.0)]);
        let generation = controller.current_generation();
        controller.handle_device_event(event(generation, DeviceEventKind::Playing));

        controller.pause();
        assert_eq!(controller.session().phase, PlaybackPhase::Paused);
        controller.play();
        assert_eq!(controller.session().phase, PlaybackPhase::Playing);
    }

    #[test]
    fn test_variant_switch_keeps_playback_intent() {
        let (mut controller, mock) = controller_with_mock();
        let station = Station::new(
            "France Inter",
            vec![
                StreamVariant::new("MP3 128k", "https://example.org/midfi.mp3"),
                StreamVariant::new("MP3 64k", "https://example.org/lofi.mp3"),
            ],
        );
        controller.set_station(station);
        assert_eq!(controller.session().phase, PlaybackPhase::Loading);
        // No playback intent yet: loading a station must not auto-play.
        assert!(!mock.calls().contains(&"play".to_string()));

        let generation = controller.current_generation();
        controller.handle_device_event(event(generation, DeviceEventKind::CanPlay));
        assert_eq!(controller.session().phase, PlaybackPhase::Paused);

        controller.play();
        controller.handle_device_event(event(
            controller.current_generation(),
            DeviceEventKind::Playing,
        ));

        // Quality switch continues playing on the new stream.
        controller.select_variant(1);
        assert_eq!(controller.session().phase, PlaybackPhase::Loading);
        assert_eq!(
            controller.session().current.as_ref().unwrap().subtitle,
            "MP3 64k"
        );
        let plays = mock.calls().iter().filter(|c| *c == "play").count();
        assert!(plays >= 2, "autoplay-continue must re-invoke play");
    }

    #[test]
    fn test_position_updates_do_not_regress_duration() {
        let (mut controller, _mock) = controller_with_mock();
        controller.adopt_tracks(vec![track("1", 180.0)]);
        let generation = controller.current_generation();
        controller.handle_device_event(event(
            generation,
            DeviceEventKind::Position {
                position: 12.0,
                duration: 0.0,
            },
        ));
        assert_eq!(controller.session().position, 12.0);
        assert_eq!(controller.session().duration, 180.0);
    }

    #[test]
    fn test_fetch_failure_surfaces_error_state() {
        let (mut controller, _mock) = controller_with_mock();
        controller.fetch_failed(&ondsource::Error::Status(503));
        assert_eq!(controller.session().phase, PlaybackPhase::Error);
        assert!(controller
            .session()
            .error
            .as_deref()
            .unwrap()
            .contains("503"));
    }

    #[test]
    fn test_empty_catalog_result_goes_idle() {
        let (mut controller, _mock) = controller_with_mock();
        controller.adopt_tracks(vec![track("1", 60.0)]);
        controller.adopt_tracks(Vec::new());
        assert_eq!(controller.session().phase, PlaybackPhase::Idle);
        assert!(controller.session().current.is_none());
    }

    #[test]
    fn test_skip_wraps_and_forces_playback() {
        let (mut controller, _mock) = controller_with_mock();
        controller.adopt_tracks(vec![track("1", 60.0), track("2", 60.0)]);
        controller.skip(-1);
        assert_eq!(controller.queue_index(), 1);
        controller.skip(1);
        assert_eq!(controller.queue_index(), 0);
        // Skipping a catalog track always requests playback.
        controller.handle_device_event(event(
            controller.current_generation(),
            DeviceEventKind::Playing,
        ));
        assert_eq!(controller.session().phase, PlaybackPhase::Playing);
    }

    #[test]
    fn test_shutdown_releases_device() {
        let (mut controller, mock) = controller_with_mock();
        controller.adopt_tracks(vec![track("1", 60.0)]);
        controller.shutdown();
        assert!(mock.calls().contains(&"release".to_string()));
        assert_eq!(controller.session().phase, PlaybackPhase::Idle);
    }
}
