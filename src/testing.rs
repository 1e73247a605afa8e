//! In-memory collaborators for controller, watchdog and worker tests.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::app::{Controller, DisplaySink, DisplayUpdate};
use crate::audio::AudioEngine;
use crate::error::EngineError;
use crate::library::{Folder, Library, Track};
use crate::metadata::{MetadataProvider, TrackTags, fallback_title};

#[derive(Debug, Default)]
pub struct EngineLog {
    pub calls: Vec<String>,
    pub busy: bool,
    pub reject: Vec<PathBuf>,
    pub volume: Option<f32>,
}

/// Engine that records every call instead of producing sound.
#[derive(Debug, Clone, Default)]
pub struct FakeEngine {
    pub log: Arc<Mutex<EngineLog>>,
}

impl FakeEngine {
    pub fn calls(&self) -> Vec<String> {
        self.log.lock().unwrap().calls.clone()
    }

    pub fn clear(&self) {
        self.log.lock().unwrap().calls.clear();
    }

    pub fn set_busy(&self, busy: bool) {
        self.log.lock().unwrap().busy = busy;
    }

    pub fn reject(&self, path: &str) {
        self.log.lock().unwrap().reject.push(PathBuf::from(path));
    }

    pub fn volume(&self) -> Option<f32> {
        self.log.lock().unwrap().volume
    }

    fn record(&self, call: impl Into<String>) {
        self.log.lock().unwrap().calls.push(call.into());
    }
}

impl AudioEngine for FakeEngine {
    fn load(&mut self, path: &Path) -> Result<(), EngineError> {
        self.record(format!("load {}", path.display()));
        let mut log = self.log.lock().unwrap();
        if log.reject.iter().any(|p| p == path) {
            return Err(EngineError::Decode {
                path: path.to_path_buf(),
                reason: "corrupt".into(),
            });
        }
        // A freshly loaded track reports busy right away.
        log.busy = true;
        Ok(())
    }

    fn play(&mut self) {
        self.record("play");
    }

    fn pause(&mut self) {
        self.record("pause");
    }

    fn resume(&mut self) {
        self.record("resume");
    }

    fn stop(&mut self) {
        self.record("stop");
        self.log.lock().unwrap().busy = false;
    }

    fn is_busy(&self) -> bool {
        self.log.lock().unwrap().busy
    }

    fn set_volume(&mut self, volume: f32) {
        self.record(format!("volume {volume:.2}"));
        self.log.lock().unwrap().volume = Some(volume);
    }
}

/// Tags derived from the file name; files named `*cover*` carry art.
pub struct FakeMetadata;

impl MetadataProvider for FakeMetadata {
    fn read_tags(&self, path: &Path) -> TrackTags {
        TrackTags {
            title: fallback_title(path),
            artist: "Tester".to_string(),
        }
    }

    fn read_embedded_art(&self, path: &Path) -> Option<Vec<u8>> {
        path.to_string_lossy()
            .contains("cover")
            .then(|| vec![0xFF, 0xD8, 0xFF])
    }
}

/// Display sink that keeps every update.
#[derive(Debug, Clone, Default)]
pub struct RecordingDisplay {
    pub updates: Arc<Mutex<Vec<DisplayUpdate>>>,
}

impl RecordingDisplay {
    pub fn last(&self) -> DisplayUpdate {
        self.updates.lock().unwrap().last().cloned().unwrap_or_default()
    }

    pub fn count(&self) -> usize {
        self.updates.lock().unwrap().len()
    }
}

impl DisplaySink for RecordingDisplay {
    fn show(&mut self, update: &DisplayUpdate) {
        self.updates.lock().unwrap().push(update.clone());
    }
}

/// Build a library from `(folder, [file names])` pairs.
pub fn library(folders: &[(&str, &[&str])]) -> Arc<Library> {
    let folders = folders
        .iter()
        .map(|(dir, files)| Folder {
            path: PathBuf::from(dir),
            tracks: files
                .iter()
                .map(|f| Track::new(Path::new(dir).join(f)))
                .collect(),
        })
        .collect();
    Arc::new(Library::new(folders))
}

/// Controller wired to fakes with a fixed shuffle seed.
pub fn controller() -> (Controller, FakeEngine, RecordingDisplay) {
    let engine = FakeEngine::default();
    let display = RecordingDisplay::default();
    let controller = Controller::new(
        Box::new(engine.clone()),
        Box::new(FakeMetadata),
        Box::new(display.clone()),
    )
    .with_rng(StdRng::seed_from_u64(7));
    (controller, engine, display)
}
