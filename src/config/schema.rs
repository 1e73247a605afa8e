use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/stickplay/config.toml` or `~/.config/stickplay/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `STICKPLAY__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub audio: AudioSettings,
    pub playback: PlaybackSettings,
    pub library: LibrarySettings,
    pub devices: DeviceSettings,
    pub pairing: PairingSettings,
    pub ui: UiSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Volume applied at startup, 0..=100.
    pub initial_volume: u8,
    /// Fade-out duration when quitting (milliseconds).
    /// Set to 0 to stop immediately.
    pub quit_fade_out_ms: u64,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            initial_volume: 70,
            quit_fade_out_ms: 300,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Whether shuffle starts enabled.
    pub shuffle: bool,
    /// With shuffle on, playing a chosen track jumps to a random one instead.
    pub shuffle_overrides_selection: bool,
    /// How often the end-of-track watchdog polls the audio engine.
    pub watchdog_interval_ms: u64,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            shuffle: false,
            shuffle_overrides_selection: true,
            watchdog_interval_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// File extensions to treat as audio (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Whether to follow symlinks during scanning.
    pub follow_links: bool,
    /// Whether to include hidden files/directories (dotfiles).
    pub include_hidden: bool,
    /// Optional cap on directory recursion depth.
    pub max_depth: Option<usize>,
    /// Sort each folder's tracks by file name instead of keeping directory order.
    pub sort_by_name: bool,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            extensions: vec!["mp3".into(), "wav".into(), "ogg".into()],
            follow_links: true,
            include_hidden: true,
            max_depth: None,
            sort_by_name: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DeviceSettings {
    /// Program used to list block devices.
    pub lsblk_program: String,
    /// Mount roots scanned after the removable drives reported by `lsblk`.
    pub extra_volumes: Vec<PathBuf>,
    /// Scan for removable drives as soon as the player starts.
    pub scan_on_startup: bool,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            lsblk_program: "lsblk".to_string(),
            extra_volumes: Vec::new(),
            scan_on_startup: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PairingSettings {
    /// Bluetooth device manager executable.
    pub program: String,
    /// How long discovery runs before devices are listed.
    pub scan_seconds: u64,
}

impl Default for PairingSettings {
    fn default() -> Self {
        Self {
            program: "bluetoothctl".to_string(),
            scan_seconds: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UiSettings {
    /// The text rendered inside the top header box.
    pub header_text: String,
    /// Artist shown when a track has no artist tag.
    pub unknown_artist: String,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: " ~ plug it in, play it loud ~ ".to_string(),
            unknown_artist: "Unknown Artist".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LogSettings {
    /// Log file; defaults to `$XDG_STATE_HOME/stickplay/stickplay.log`.
    pub file: Option<PathBuf>,
    /// `tracing` filter directive, overridden by `RUST_LOG`.
    pub filter: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            file: None,
            filter: "info".to_string(),
        }
    }
}
