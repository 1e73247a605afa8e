use std::sync::mpsc::Receiver;
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;

use rodio::{OutputStreamBuilder, Sink};
use tracing::{debug, error};

use crate::error::EngineError;

use super::sink::create_sink;
use super::types::AudioCmd;

/// Spawn the thread that owns the output stream and the current sink.
///
/// All engine calls go through `rx`, so they are applied one at a time.
pub(super) fn spawn_audio_thread(rx: Receiver<AudioCmd>, initial_volume: f32) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut stream = match OutputStreamBuilder::open_default_stream() {
            Ok(stream) => stream,
            Err(err) => {
                error!(error = %err, "no audio output device");
                serve_without_output(rx);
                return;
            }
        };
        // rodio logs to stderr when OutputStream is dropped. That's useful in debugging,
        // but noisy for a TUI app.
        stream.log_on_drop(false);

        let mut sink: Option<Sink> = None;
        let mut volume = initial_volume;

        while let Ok(cmd) = rx.recv() {
            match cmd {
                AudioCmd::Load { path, reply } => {
                    if let Some(old) = sink.take() {
                        old.stop();
                    }
                    let result = match create_sink(&stream, &path, volume) {
                        Ok(new_sink) => {
                            debug!(path = %path.display(), "loaded track");
                            sink = Some(new_sink);
                            Ok(())
                        }
                        Err(err) => Err(err),
                    };
                    let _ = reply.send(result);
                }
                AudioCmd::Play | AudioCmd::Resume => {
                    if let Some(ref s) = sink {
                        s.play();
                    }
                }
                AudioCmd::Pause => {
                    if let Some(ref s) = sink {
                        s.pause();
                    }
                }
                AudioCmd::Stop => {
                    if let Some(s) = sink.take() {
                        s.stop();
                    }
                }
                AudioCmd::SetVolume(v) => {
                    volume = v;
                    if let Some(ref s) = sink {
                        s.set_volume(v);
                    }
                }
                AudioCmd::IsBusy(reply) => {
                    let busy = sink.as_ref().is_some_and(|s| !s.empty());
                    let _ = reply.send(busy);
                }
                AudioCmd::Quit { fade_out_ms } => {
                    if let Some(ref s) = sink {
                        // Fade out gently before stopping.
                        fade_out_sink(s, volume, fade_out_ms);
                        s.stop();
                    }
                    break;
                }
            }
        }
    })
}

/// Answer commands when no output device could be opened.
fn serve_without_output(rx: Receiver<AudioCmd>) {
    while let Ok(cmd) = rx.recv() {
        match cmd {
            AudioCmd::Load { reply, .. } => {
                let _ = reply.send(Err(EngineError::Unavailable));
            }
            AudioCmd::IsBusy(reply) => {
                let _ = reply.send(false);
            }
            AudioCmd::Quit { .. } => break,
            _ => {}
        }
    }
}

/// Volume levels for a linear fade from `from` to silence.
pub(super) fn fade_steps(from: f32, fade_out_ms: u64) -> (Vec<f32>, Duration) {
    if fade_out_ms == 0 {
        return (vec![0.0], Duration::ZERO);
    }
    let steps: u64 = 20;
    let step_ms = (fade_out_ms / steps).max(1);
    let levels = (1..=steps)
        .map(|step| from * (1.0 - step as f32 / steps as f32))
        .collect();
    (levels, Duration::from_millis(step_ms))
}

fn fade_out_sink(sink: &Sink, from: f32, fade_out_ms: u64) {
    let (levels, pause) = fade_steps(from, fade_out_ms);
    for level in levels {
        sink.set_volume(level);
        if !pause.is_zero() {
            thread::sleep(pause);
        }
    }
}
