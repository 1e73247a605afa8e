use super::load::{default_config_path, default_log_path, resolve_config_path};
use super::schema::*;
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

struct EnvGuard {
    key: &'static str,
    old: Option<std::ffi::OsString>,
}

impl EnvGuard {
    fn set(key: &'static str, val: &str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::set_var(key, val);
        }
        Self { key, old }
    }

    fn remove(key: &'static str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::remove_var(key);
        }
        Self { key, old }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.old.take() {
            Some(v) => unsafe {
                std::env::set_var(self.key, v);
            },
            None => unsafe {
                std::env::remove_var(self.key);
            },
        }
    }
}

#[test]
fn resolve_config_path_prefers_stickplay_config_path() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("STICKPLAY_CONFIG_PATH", "/tmp/stickplay-test-config.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/stickplay-test-config.toml")
    );
}

#[test]
fn default_config_path_prefers_xdg_config_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_CONFIG_HOME", "/tmp/xdg-config-home");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-should-not-win");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/xdg-config-home")
            .join("stickplay")
            .join("config.toml")
    );
}

#[test]
fn default_config_path_falls_back_to_home_dot_config() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("XDG_CONFIG_HOME");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/home-dir")
            .join(".config")
            .join("stickplay")
            .join("config.toml")
    );
}

#[test]
fn default_log_path_uses_local_state_without_xdg_state_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("XDG_STATE_HOME");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");

    assert_eq!(
        default_log_path().unwrap(),
        std::path::PathBuf::from("/tmp/home-dir/.local/state/stickplay/stickplay.log")
    );
}

#[test]
fn defaults_match_the_usb_player_behaviour() {
    let s = Settings::default();
    assert_eq!(s.audio.initial_volume, 70);
    assert_eq!(s.library.extensions, vec!["mp3", "wav", "ogg"]);
    assert!(s.library.follow_links);
    assert!(!s.library.sort_by_name);
    assert!(!s.playback.shuffle);
    assert!(s.playback.shuffle_overrides_selection);
    assert_eq!(s.playback.watchdog_interval_ms, 1000);
    assert_eq!(s.pairing.program, "bluetoothctl");
    assert!(s.validate().is_ok());
}

#[test]
fn validate_rejects_out_of_range_values() {
    let mut s = Settings::default();
    s.audio.initial_volume = 101;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.playback.watchdog_interval_ms = 0;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.library.extensions = vec![" . ".into()];
    assert!(s.validate().is_err());
}

#[test]
fn settings_load_from_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[audio]
initial_volume = 35
quit_fade_out_ms = 0

[playback]
shuffle = true
shuffle_overrides_selection = false
watchdog_interval_ms = 250

[library]
extensions = ["mp3", "flac"]
include_hidden = false
follow_links = false
max_depth = 3
sort_by_name = true

[devices]
lsblk_program = "/usr/bin/lsblk"
extra_volumes = ["/mnt/card"]
scan_on_startup = false

[pairing]
program = "btctl"
scan_seconds = 2

[ui]
unknown_artist = "Anon"

[log]
file = "/tmp/stickplay.log"
filter = "debug"
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("STICKPLAY_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::remove("STICKPLAY__AUDIO__INITIAL_VOLUME");

    let s = Settings::load().unwrap();
    assert_eq!(s.audio.initial_volume, 35);
    assert_eq!(s.audio.quit_fade_out_ms, 0);
    assert!(s.playback.shuffle);
    assert!(!s.playback.shuffle_overrides_selection);
    assert_eq!(s.playback.watchdog_interval_ms, 250);
    assert_eq!(s.library.extensions, vec!["mp3".to_string(), "flac".to_string()]);
    assert!(!s.library.include_hidden);
    assert!(!s.library.follow_links);
    assert_eq!(s.library.max_depth, Some(3));
    assert!(s.library.sort_by_name);
    assert_eq!(s.devices.lsblk_program, "/usr/bin/lsblk");
    assert_eq!(
        s.devices.extra_volumes,
        vec![std::path::PathBuf::from("/mnt/card")]
    );
    assert!(!s.devices.scan_on_startup);
    assert_eq!(s.pairing.program, "btctl");
    assert_eq!(s.pairing.scan_seconds, 2);
    assert_eq!(s.ui.unknown_artist, "Anon");
    assert_eq!(s.log.file, Some(std::path::PathBuf::from("/tmp/stickplay.log")));
    assert_eq!(s.log.filter, "debug");
}

#[test]
fn settings_env_overrides_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[audio]
initial_volume = 90
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("STICKPLAY_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::set("STICKPLAY__AUDIO__INITIAL_VOLUME", "40");

    let s = Settings::load().unwrap();
    assert_eq!(s.audio.initial_volume, 40);
}

#[test]
fn printed_config_parses_back() {
    let text = Settings::default().to_toml().unwrap();
    assert!(text.contains("[playback]"));

    let parsed: Settings = toml::from_str(&text).unwrap();
    assert_eq!(parsed.audio.initial_volume, 70);
    assert_eq!(parsed.library.max_depth, None);
}
