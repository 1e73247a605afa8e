//! Application module: the playback controller and the UI navigation model.
//!
//! `Controller` owns the library snapshot and playback state and drives the
//! audio engine; `Browser` holds what the terminal UI is currently showing.

mod browser;
mod controller;
mod display;
mod state;

pub use browser::{Browser, View};
pub use controller::{Controller, SharedController};
pub use display::{DisplaySink, DisplayUpdate, SharedDisplay};
pub use state::PlaybackState;
