//! Display updates pushed by the controller to the presentation layer.

use std::sync::{Arc, Mutex, PoisonError};

/// What the presentation layer shows about the current track.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayUpdate {
    pub title: String,
    pub artist: String,
    pub status: String,
    /// Embedded cover image bytes.
    pub art: Option<Vec<u8>>,
}

/// Receiver of display updates, called after every controller state change.
pub trait DisplaySink {
    fn show(&mut self, update: &DisplayUpdate);
}

/// Display sink that keeps the latest update for the UI and MPRIS to read.
#[derive(Debug, Clone, Default)]
pub struct SharedDisplay {
    inner: Arc<Mutex<DisplayUpdate>>,
}

impl SharedDisplay {
    pub fn snapshot(&self) -> DisplayUpdate {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl DisplaySink for SharedDisplay {
    fn show(&mut self, update: &DisplayUpdate) {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner) = update.clone();
    }
}
