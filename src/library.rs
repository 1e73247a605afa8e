//! Music library: folders of audio files found on a volume.
//!
//! `scan` walks a volume and builds an immutable [`Library`] snapshot;
//! `model` holds the snapshot types handed to the playback controller.

mod model;
mod scan;

pub use model::{Folder, Library, Track};
pub use scan::{ScanOutcome, scan_volumes};
