//! Removable volume discovery.
//!
//! Volumes are read from `lsblk -P` on every call; nothing is cached.

use std::path::PathBuf;
use std::process::Command;

use tracing::{debug, warn};

use crate::config::DeviceSettings;
use crate::error::ScanError;

/// Mount paths of removable devices that are currently mounted.
///
/// Inventory failures are logged and reported as "no volumes".
pub fn list_removable_volumes(settings: &DeviceSettings) -> Vec<PathBuf> {
    let mut volumes = match query_lsblk(&settings.lsblk_program) {
        Ok(output) => parse_lsblk_pairs(&output),
        Err(err) => {
            warn!(error = %err, "listing block devices failed");
            Vec::new()
        }
    };

    for extra in &settings.extra_volumes {
        if extra.is_dir() && !volumes.contains(extra) {
            volumes.push(extra.clone());
        }
    }

    debug!(count = volumes.len(), "removable volumes");
    volumes
}

fn query_lsblk(program: &str) -> Result<String, ScanError> {
    let output = Command::new(program)
        .args(["-P", "-o", "NAME,RM,MOUNTPOINT"])
        .output()
        .map_err(|source| ScanError::Spawn {
            program: program.to_string(),
            source,
        })?;

    if !output.status.success() {
        return Err(ScanError::Status {
            program: program.to_string(),
            status: output.status.to_string(),
        });
    }

    String::from_utf8(output.stdout).map_err(|_| ScanError::Output {
        program: program.to_string(),
    })
}

/// Extract removable, mounted devices from `lsblk -P` output.
fn parse_lsblk_pairs(output: &str) -> Vec<PathBuf> {
    let mut volumes: Vec<PathBuf> = Vec::new();

    for line in output.lines() {
        let mut removable = false;
        let mut mountpoint = String::new();
        for (key, value) in pairs(line) {
            match key {
                "RM" => removable = value == "1",
                "MOUNTPOINT" => mountpoint = unescape(value),
                _ => {}
            }
        }

        if removable && !mountpoint.is_empty() {
            let path = PathBuf::from(mountpoint);
            if !volumes.contains(&path) {
                volumes.push(path);
            }
        }
    }

    volumes
}

/// Split one `KEY="value" KEY="value"` line into pairs.
fn pairs(line: &str) -> Vec<(&str, &str)> {
    let mut out = Vec::new();
    let mut rest = line.trim_start();

    while let Some(eq) = rest.find("=\"") {
        let key = rest[..eq].trim();
        let after = &rest[eq + 2..];
        let Some(end) = after.find('"') else {
            break;
        };
        out.push((key, &after[..end]));
        rest = after[end + 1..].trim_start();
    }

    out
}

/// Decode the `\xHH` escapes lsblk uses for spaces and other special bytes.
fn unescape(value: &str) -> String {
    let bytes = value.as_bytes();
    let mut out: Vec<u8> = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 3 < bytes.len() && bytes[i + 1] == b'x' {
            let hex = std::str::from_utf8(&bytes[i + 2..i + 4]).ok();
            if let Some(b) = hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                out.push(b);
                i += 4;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }

    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"NAME="sda" RM="0" MOUNTPOINT=""
NAME="sda1" RM="0" MOUNTPOINT="/"
NAME="sdb" RM="1" MOUNTPOINT=""
NAME="sdb1" RM="1" MOUNTPOINT="/media/usb1"
NAME="sdc1" RM="1" MOUNTPOINT="/media/My\x20Stick"
NAME="sr0" RM="1" MOUNTPOINT=""
"#;

    #[test]
    fn parse_keeps_removable_mounted_devices_in_order() {
        assert_eq!(
            parse_lsblk_pairs(SAMPLE),
            vec![
                PathBuf::from("/media/usb1"),
                PathBuf::from("/media/My Stick")
            ]
        );
    }

    #[test]
    fn parse_ignores_garbage_and_duplicates() {
        let out = "not lsblk output\nRM=\"1\" MOUNTPOINT=\"/mnt/a\"\nRM=\"1\" MOUNTPOINT=\"/mnt/a\"\nRM=\"1\" MOUNTPOINT=\"/mnt/b";
        assert_eq!(parse_lsblk_pairs(out), vec![PathBuf::from("/mnt/a")]);
    }

    #[test]
    fn unescape_decodes_hex_and_keeps_stray_backslashes() {
        assert_eq!(unescape("a\\x20b"), "a b");
        assert_eq!(unescape("a\\xZZ"), "a\\xZZ");
        assert_eq!(unescape("tail\\x2"), "tail\\x2");
    }

    #[test]
    fn missing_program_degrades_to_no_volumes() {
        let settings = DeviceSettings {
            lsblk_program: "/nonexistent/stickplay-lsblk".to_string(),
            ..DeviceSettings::default()
        };
        assert!(list_removable_volumes(&settings).is_empty());
    }

    #[test]
    fn extra_volumes_are_appended_when_present() {
        let dir = tempfile::tempdir().unwrap();
        let settings = DeviceSettings {
            lsblk_program: "/nonexistent/stickplay-lsblk".to_string(),
            extra_volumes: vec![dir.path().to_path_buf(), dir.path().join("missing")],
            ..DeviceSettings::default()
        };
        assert_eq!(
            list_removable_volumes(&settings),
            vec![dir.path().to_path_buf()]
        );
    }

    #[cfg(unix)]
    #[test]
    fn runs_the_configured_program() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-lsblk");
        std::fs::write(
            &script,
            "#!/bin/sh\necho 'NAME=\"sdb1\" RM=\"1\" MOUNTPOINT=\"/media/usb1\"'\n",
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let settings = DeviceSettings {
            lsblk_program: script.to_string_lossy().into_owned(),
            ..DeviceSettings::default()
        };
        assert_eq!(
            list_removable_volumes(&settings),
            vec![PathBuf::from("/media/usb1")]
        );
    }

    #[cfg(unix)]
    #[test]
    fn failing_program_degrades_to_no_volumes() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("broken-lsblk");
        std::fs::write(&script, "#!/bin/sh\nexit 3\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let err = query_lsblk(script.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, ScanError::Status { .. }));
    }
}
