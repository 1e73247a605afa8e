//! End-of-track watchdog.
//!
//! The audio engine has no completion callback, so a background thread polls
//! its busy flag and advances the playlist when a track ran out.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, warn};

use crate::app::{Controller, PlaybackState, SharedController};

/// What a single watchdog tick did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// The track ended and the controller moved on to this index.
    Advanced(usize),
    /// The engine is still rendering.
    Busy,
    /// Nothing to do: idle or paused.
    Skipped,
    /// Advancing failed; carries the error text.
    Failed(String),
}

/// Poll the engine once and advance if the playing track has finished.
pub fn tick(controller: &Mutex<Controller>) -> TickOutcome {
    let mut ctl = controller.lock().unwrap_or_else(PoisonError::into_inner);

    if ctl.state() != PlaybackState::Playing {
        return TickOutcome::Skipped;
    }
    if ctl.engine_busy() {
        return TickOutcome::Busy;
    }

    match ctl.advance() {
        Ok(Some(index)) => {
            debug!(index, "track finished, advanced");
            TickOutcome::Advanced(index)
        }
        Ok(None) => TickOutcome::Skipped,
        Err(err) => {
            warn!(error = %err, "auto-advance failed");
            TickOutcome::Failed(err.to_string())
        }
    }
}

/// Background thread running [`tick`] at a fixed period.
pub struct Watchdog {
    stop: Option<Sender<()>>,
    join: Option<JoinHandle<()>>,
}

impl Watchdog {
    pub fn spawn(controller: SharedController, period: Duration) -> Self {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        let join = thread::spawn(move || {
            loop {
                match stop_rx.recv_timeout(period) {
                    Err(RecvTimeoutError::Timeout) => {
                        tick(&controller);
                    }
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
        });

        Self {
            stop: Some(stop_tx),
            join: Some(join),
        }
    }

    /// Stop ticking and wait for the thread to exit.
    pub fn stop(&mut self) {
        if let Some(tx) = self.stop.take() {
            let _ = tx.send(());
        }
        if let Some(h) = self.join.take() {
            let _ = h.join();
        }
    }
}

impl Drop for Watchdog {
    fn drop(&mut self) {
        self.stop();
    }
}
