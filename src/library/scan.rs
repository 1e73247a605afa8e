use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::config::LibrarySettings;

use super::model::{Folder, Library, Track};

/// Outcome of scanning a list of volumes for music.
#[derive(Debug)]
pub enum ScanOutcome {
    /// The first volume that held any music, with its library.
    Found { volume: PathBuf, library: Library },
    /// No volume to scan.
    NoVolumes,
    /// Volumes were scanned but none held supported audio files.
    NoMusic,
}

impl ScanOutcome {
    /// Status line shown to the user for this outcome.
    pub fn status_text(&self) -> String {
        match self {
            ScanOutcome::Found { library, .. } => {
                format!("{} tracks found.", library.track_count())
            }
            ScanOutcome::NoVolumes => "No removable drive found.".to_string(),
            ScanOutcome::NoMusic => "No music found on removable drive.".to_string(),
        }
    }
}

fn normalized_extensions(settings: &LibrarySettings) -> Vec<String> {
    settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

fn is_audio_file(path: &Path, exts: &[String]) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

fn folder_slot(
    folders: &mut Vec<Folder>,
    positions: &mut HashMap<PathBuf, usize>,
    dir: &Path,
) -> usize {
    if let Some(&i) = positions.get(dir) {
        return i;
    }
    folders.push(Folder {
        path: dir.to_path_buf(),
        tracks: Vec::new(),
    });
    positions.insert(dir.to_path_buf(), folders.len() - 1);
    folders.len() - 1
}

/// Walk `root` and group its audio files by containing directory.
///
/// Folders come out in the order the walk visits them, tracks in directory
/// listing order (or by name with `sort_by_name`). Directories without audio
/// files are left out. Unreadable entries and symlink loops are skipped.
pub fn index_volume(root: &Path, settings: &LibrarySettings) -> Library {
    let root = std::path::absolute(root).unwrap_or_else(|_| root.to_path_buf());
    let exts = normalized_extensions(settings);

    let mut walker = WalkDir::new(&root).follow_links(settings.follow_links);
    if let Some(d) = settings.max_depth {
        walker = walker.max_depth(d);
    }

    let mut folders: Vec<Folder> = Vec::new();
    let mut positions: HashMap<PathBuf, usize> = HashMap::new();

    for entry in walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                debug!(error = %err, "skipping unreadable entry");
                continue;
            }
        };

        let path = entry.path();
        if entry.file_type().is_dir() {
            folder_slot(&mut folders, &mut positions, path);
            continue;
        }
        if !entry.file_type().is_file() || !is_audio_file(path, &exts) {
            continue;
        }
        let Some(parent) = path.parent() else {
            continue;
        };
        let slot = folder_slot(&mut folders, &mut positions, parent);
        folders[slot].tracks.push(Track::new(path.to_path_buf()));
    }

    if settings.sort_by_name {
        for folder in &mut folders {
            folder.tracks.sort_by_key(|t| t.name.to_lowercase());
        }
    }

    let library = Library::new(folders);
    info!(
        root = %root.display(),
        folders = library.folders().len(),
        tracks = library.track_count(),
        "indexed volume"
    );
    library
}

/// Index `volumes` in order and adopt the first one that holds any music.
pub fn scan_volumes(volumes: &[PathBuf], settings: &LibrarySettings) -> ScanOutcome {
    if volumes.is_empty() {
        return ScanOutcome::NoVolumes;
    }

    for volume in volumes {
        let library = index_volume(volume, settings);
        if !library.is_empty() {
            return ScanOutcome::Found {
                volume: volume.clone(),
                library,
            };
        }
    }

    ScanOutcome::NoMusic
}
