//! The playback controller: library selection and the play/pause/advance
//! state machine driving the audio engine.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{info, warn};

use crate::audio::AudioEngine;
use crate::error::PlayerError;
use crate::library::{Folder, Library};
use crate::metadata::MetadataProvider;

use super::display::{DisplaySink, DisplayUpdate};
use super::state::PlaybackState;

/// Controller shared between the UI thread and the watchdog.
pub type SharedController = Arc<Mutex<Controller>>;

/// Owns the playback state and is the only caller of the audio engine.
///
/// Every operation takes `&mut self`, so wrapping the controller in a
/// [`Mutex`] makes each one atomic with respect to the others.
pub struct Controller {
    library: Arc<Library>,
    selected: Option<PathBuf>,
    current: usize,
    paused: bool,
    shuffle: bool,
    /// Track currently loaded in the engine.
    loaded: Option<PathBuf>,
    shuffle_overrides_selection: bool,

    engine: Box<dyn AudioEngine + Send>,
    metadata: Box<dyn MetadataProvider + Send>,
    display: Box<dyn DisplaySink + Send>,
    now: DisplayUpdate,
    rng: StdRng,
}

impl Controller {
    pub fn new(
        engine: Box<dyn AudioEngine + Send>,
        metadata: Box<dyn MetadataProvider + Send>,
        display: Box<dyn DisplaySink + Send>,
    ) -> Self {
        Self {
            library: Arc::new(Library::default()),
            selected: None,
            current: 0,
            paused: false,
            shuffle: false,
            loaded: None,
            shuffle_overrides_selection: true,
            engine,
            metadata,
            display,
            now: DisplayUpdate::default(),
            rng: StdRng::from_os_rng(),
        }
    }

    /// Use `rng` for shuffle picks.
    #[cfg(test)]
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    /// Whether shuffle also replaces an explicitly chosen track.
    pub fn with_shuffle_overrides_selection(mut self, overrides: bool) -> Self {
        self.shuffle_overrides_selection = overrides;
        self
    }

    pub fn into_shared(self) -> SharedController {
        Arc::new(Mutex::new(self))
    }

    /// Install a new library, stopping playback and clearing the selection.
    pub fn load_snapshot(&mut self, library: Arc<Library>) {
        if self.loaded.is_some() {
            self.engine.stop();
        }
        self.library = library;
        self.selected = None;
        self.current = 0;
        self.paused = false;
        self.loaded = None;
        self.now = DisplayUpdate::default();
        self.publish();
    }

    /// Select a folder of the active library; playback is not started.
    pub fn select_folder(&mut self, folder: &Path) -> Result<(), PlayerError> {
        if self.library.folder(folder).is_none() {
            return Err(PlayerError::NotFound(folder.to_path_buf()));
        }
        self.selected = Some(folder.to_path_buf());
        self.current = 0;
        Ok(())
    }

    /// Play track `index` of the selected folder and return the index played.
    ///
    /// With shuffle on, a random track of the folder is played instead. On an
    /// engine error the controller is left idle.
    pub fn play_track_at(&mut self, index: usize) -> Result<usize, PlayerError> {
        let library = Arc::clone(&self.library);
        let Some(folder) = self.selected_in(&library) else {
            return Err(PlayerError::OutOfRange { index, len: 0 });
        };
        let len = folder.tracks.len();
        if index >= len {
            return Err(PlayerError::OutOfRange { index, len });
        }

        let chosen = if self.shuffle && self.shuffle_overrides_selection {
            self.rng.random_range(0..len)
        } else {
            index
        };
        self.current = chosen;
        let track = &folder.tracks[chosen];

        if let Err(err) = self.engine.load(&track.path) {
            warn!(path = %track.path.display(), error = %err, "engine rejected track");
            self.loaded = None;
            self.paused = false;
            self.now = DisplayUpdate {
                status: format!("Error: {err}"),
                ..DisplayUpdate::default()
            };
            self.publish();
            return Err(err.into());
        }
        self.engine.play();
        self.paused = false;
        self.loaded = Some(track.path.clone());

        let tags = self.metadata.read_tags(&track.path);
        self.now = DisplayUpdate {
            title: tags.title,
            artist: tags.artist,
            status: format!("Playing: {}", track.name),
            art: self.metadata.read_embedded_art(&track.path),
        };
        self.publish();
        info!(path = %track.path.display(), index = chosen, "playing");
        Ok(chosen)
    }

    /// Pause or resume the loaded track. Without one, only the flag flips.
    pub fn toggle_pause(&mut self) {
        if self.loaded.is_none() {
            self.paused = !self.paused;
            return;
        }

        if self.paused {
            self.engine.resume();
            self.paused = false;
            self.now.status = "Resumed".to_string();
        } else {
            self.engine.pause();
            self.paused = true;
            self.now.status = "Paused".to_string();
        }
        self.publish();
    }

    /// Play the next track of the selected folder, wrapping at the end.
    ///
    /// Returns `Ok(None)` when there is nothing to advance to.
    pub fn advance(&mut self) -> Result<Option<usize>, PlayerError> {
        let len = self.selected_len();
        if len == 0 {
            return Ok(None);
        }
        let next = (self.current + 1) % len;
        self.play_track_at(next).map(Some)
    }

    pub fn set_shuffle_enabled(&mut self, enabled: bool) {
        self.shuffle = enabled;
    }

    /// Clamp `level` to 0..=100 and forward it to the engine.
    pub fn set_volume(&mut self, level: i32) -> u8 {
        let level = level.clamp(0, 100) as u8;
        self.engine.set_volume(f32::from(level) / 100.0);
        level
    }

    /// Replace the status line, keeping the rest of the display.
    pub fn report_status(&mut self, status: impl Into<String>) {
        self.now.status = status.into();
        self.publish();
    }

    /// Stop the engine for good.
    pub fn shutdown(&mut self, fade_out: Duration) {
        self.engine.quit(fade_out);
        self.loaded = None;
    }

    pub fn state(&self) -> PlaybackState {
        match (self.loaded.is_some(), self.paused) {
            (false, _) => PlaybackState::Idle,
            (true, true) => PlaybackState::Paused,
            (true, false) => PlaybackState::Playing,
        }
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    pub fn selected_folder(&self) -> Option<&Folder> {
        self.selected_in(&self.library)
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    #[cfg(test)]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn shuffle_enabled(&self) -> bool {
        self.shuffle
    }

    pub fn engine_busy(&self) -> bool {
        self.engine.is_busy()
    }

    /// Path of the track loaded in the engine, if any.
    pub fn now_playing(&self) -> Option<&Path> {
        self.loaded.as_deref()
    }

    fn selected_in<'a>(&self, library: &'a Library) -> Option<&'a Folder> {
        self.selected.as_deref().and_then(|p| library.folder(p))
    }

    fn selected_len(&self) -> usize {
        self.selected_folder().map_or(0, |f| f.tracks.len())
    }

    fn publish(&mut self) {
        self.display.show(&self.now);
    }
}
