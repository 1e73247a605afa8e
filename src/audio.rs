//! Audio output.
//!
//! [`AudioEngine`] is the narrow set of primitives the playback controller
//! drives. [`AudioPlayer`] implements it with `rodio` on a dedicated thread.

use std::path::Path;
use std::time::Duration;

use crate::error::EngineError;

mod player;
mod sink;
mod thread;
mod types;

pub use player::AudioPlayer;

/// Primitive operations of an audio renderer with a single "current track".
pub trait AudioEngine {
    /// Prepare `path` for playback, replacing any loaded track.
    fn load(&mut self, path: &Path) -> Result<(), EngineError>;
    fn play(&mut self);
    fn pause(&mut self);
    fn resume(&mut self);
    fn stop(&mut self);
    /// True while the loaded track still has audio to render.
    fn is_busy(&self) -> bool;
    /// Volume in `0.0..=1.0`.
    fn set_volume(&mut self, volume: f32);

    /// Shut the engine down, fading out over `fade_out` when supported.
    fn quit(&mut self, _fade_out: Duration) {
        self.stop();
    }
}

#[cfg(test)]
mod tests;
