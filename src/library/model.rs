use std::path::{Path, PathBuf};

/// One audio file. Only the path is kept; tags are read on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub path: PathBuf,
    pub name: String,
}

impl Track {
    pub fn new(path: PathBuf) -> Self {
        let name = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { path, name }
    }
}

/// A directory holding at least one audio file, with its tracks in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Folder {
    pub path: PathBuf,
    pub tracks: Vec<Track>,
}

impl Folder {
    /// Last path component, used as the folder's label.
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Result of one indexing pass: folders in the order they were visited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Library {
    folders: Vec<Folder>,
}

impl Library {
    /// Build a library, dropping folders without tracks.
    pub fn new(folders: Vec<Folder>) -> Self {
        Self {
            folders: folders.into_iter().filter(|f| !f.tracks.is_empty()).collect(),
        }
    }

    pub fn folders(&self) -> &[Folder] {
        &self.folders
    }

    pub fn folder(&self, path: &Path) -> Option<&Folder> {
        self.folders.iter().find(|f| f.path == path)
    }

    pub fn is_empty(&self) -> bool {
        self.folders.is_empty()
    }

    pub fn track_count(&self) -> usize {
        self.folders.iter().map(|f| f.tracks.len()).sum()
    }
}
