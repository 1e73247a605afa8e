use std::path::Path;
use std::sync::mpsc::{self, Sender};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::config::AudioSettings;
use crate::error::EngineError;

use super::AudioEngine;
use super::thread::spawn_audio_thread;
use super::types::AudioCmd;

/// Handle to the `rodio` audio thread.
pub struct AudioPlayer {
    tx: Sender<AudioCmd>,
    join: Option<JoinHandle<()>>,
}

impl AudioPlayer {
    pub fn new(audio_settings: &AudioSettings) -> Self {
        let (tx, rx) = mpsc::channel::<AudioCmd>();
        let initial_volume = f32::from(audio_settings.initial_volume.min(100)) / 100.0;
        let audio_handle = spawn_audio_thread(rx, initial_volume);

        Self {
            tx,
            join: Some(audio_handle),
        }
    }

    fn send(&self, cmd: AudioCmd) -> Result<(), mpsc::SendError<AudioCmd>> {
        self.tx.send(cmd)
    }
}

impl AudioEngine for AudioPlayer {
    fn load(&mut self, path: &Path) -> Result<(), EngineError> {
        let (reply, result) = mpsc::channel();
        self.send(AudioCmd::Load {
            path: path.to_path_buf(),
            reply,
        })
        .map_err(|_| EngineError::Unavailable)?;
        result.recv().unwrap_or(Err(EngineError::Unavailable))
    }

    fn play(&mut self) {
        let _ = self.send(AudioCmd::Play);
    }

    fn pause(&mut self) {
        let _ = self.send(AudioCmd::Pause);
    }

    fn resume(&mut self) {
        let _ = self.send(AudioCmd::Resume);
    }

    fn stop(&mut self) {
        let _ = self.send(AudioCmd::Stop);
    }

    fn is_busy(&self) -> bool {
        let (reply, result) = mpsc::channel();
        if self.send(AudioCmd::IsBusy(reply)).is_err() {
            return false;
        }
        result.recv().unwrap_or(false)
    }

    fn set_volume(&mut self, volume: f32) {
        let _ = self.send(AudioCmd::SetVolume(volume.clamp(0.0, 1.0)));
    }

    fn quit(&mut self, fade_out: Duration) {
        let _ = self.send(AudioCmd::Quit {
            fade_out_ms: fade_out.as_millis() as u64,
        });

        if let Some(h) = self.join.take() {
            let _ = h.join();
        }
    }
}
