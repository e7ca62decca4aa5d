//! Extension trait persisting playback preferences through `ondconfig`
//!
//! The volume is the only state that outlives a session. Reads fall back to
//! the default on any failure; writes are best-effort and the caller
//! swallows errors.

use ondconfig::Config;
use serde_yaml::Value;

use crate::session::DEFAULT_VOLUME;

/// Playback-specific accessors over [`ondconfig::Config`].
pub trait PlayerConfigExt {
    /// Persisted volume in `[0, 1]`; [`DEFAULT_VOLUME`] when absent or
    /// unreadable.
    fn get_playback_volume(&self) -> f32;

    /// Stores the volume preference.
    fn set_playback_volume(&self, volume: f32) -> anyhow::Result<()>;
}

impl PlayerConfigExt for Config {
    fn get_playback_volume(&self) -> f32 {
        match self.get_value(&["playback", "volume"]) {
            Ok(value) => value
                .as_f64()
                .map(|v| (v as f32).clamp(0.0, 1.0))
                .unwrap_or(DEFAULT_VOLUME),
            Err(_) => DEFAULT_VOLUME,
        }
    }

    fn set_playback_volume(&self, volume: f32) -> anyhow::Result<()> {
        self.set_value(
            &["playback", "volume"],
            Value::Number(serde_yaml::Number::from(f64::from(volume))),
        )
    }
}
