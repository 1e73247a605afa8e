//! Audio-related small types.
//!
//! Commands sent from the [`AudioPlayer`](super::AudioPlayer) handle to the
//! audio thread. Queries carry a reply channel.

use std::path::PathBuf;
use std::sync::mpsc::Sender;

use crate::error::EngineError;

#[derive(Debug)]
pub enum AudioCmd {
    /// Replace the current track with `path`, paused at the start.
    Load {
        path: PathBuf,
        reply: Sender<Result<(), EngineError>>,
    },
    /// Start or continue playback of the loaded track.
    Play,
    /// Pause the loaded track.
    Pause,
    /// Continue a paused track where it stopped.
    Resume,
    /// Drop the loaded track.
    Stop,
    /// Set the output volume, 0.0..=1.0.
    SetVolume(f32),
    /// Report whether the loaded track still has audio queued.
    IsBusy(Sender<bool>),
    /// Quit the audio thread, optionally fading out over `fade_out_ms` milliseconds.
    Quit { fade_out_ms: u64 },
}
