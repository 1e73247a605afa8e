//! UI-side navigation state: which list is shown and where the cursor is.

use std::path::PathBuf;

use crate::library::Library;
use crate::pairing::Device;

/// The list currently shown in the main pane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Folders,
    Tracks(PathBuf),
    Devices,
}

/// Navigation state of the terminal UI. Playback state lives in the controller.
#[derive(Debug, Clone)]
pub struct Browser {
    pub view: View,
    pub cursor: usize,
    pub devices: Vec<Device>,
    /// Last volume level applied, 0..=100.
    pub volume: u8,
    folder_cursor: usize,
}

impl Browser {
    pub fn new(volume: u8) -> Self {
        Self {
            view: View::Folders,
            cursor: 0,
            devices: Vec::new(),
            volume,
            folder_cursor: 0,
        }
    }

    /// Number of rows in the current view.
    pub fn len(&self, library: &Library) -> usize {
        match &self.view {
            View::Folders => library.folders().len(),
            View::Tracks(path) => library.folder(path).map_or(0, |f| f.tracks.len()),
            View::Devices => self.devices.len(),
        }
    }

    /// Move the cursor down, wrapping to the top.
    pub fn next(&mut self, len: usize) {
        if len == 0 {
            self.cursor = 0;
            return;
        }
        self.cursor = (self.cursor + 1) % len;
    }

    /// Move the cursor up, wrapping to the bottom.
    pub fn prev(&mut self, len: usize) {
        if len == 0 {
            self.cursor = 0;
            return;
        }
        self.cursor = if self.cursor == 0 { len - 1 } else { self.cursor - 1 };
    }

    pub fn open_folder(&mut self, path: PathBuf) {
        if self.view == View::Folders {
            self.folder_cursor = self.cursor;
        }
        self.view = View::Tracks(path);
        self.cursor = 0;
    }

    /// Return to the folder list, restoring its cursor.
    pub fn back(&mut self) {
        if self.view != View::Folders {
            self.view = View::Folders;
            self.cursor = self.folder_cursor;
        }
    }

    pub fn show_devices(&mut self, devices: Vec<Device>) {
        if self.view == View::Folders {
            self.folder_cursor = self.cursor;
        }
        self.devices = devices;
        self.view = View::Devices;
        self.cursor = 0;
    }

    /// Back to an empty folder list, e.g. after a new library was installed.
    pub fn reset(&mut self) {
        self.view = View::Folders;
        self.cursor = 0;
        self.folder_cursor = 0;
    }

    /// Keep the cursor inside a list of `len` rows.
    pub fn clamp_cursor(&mut self, len: usize) {
        if self.cursor >= len {
            self.cursor = len.saturating_sub(1);
        }
    }
}
