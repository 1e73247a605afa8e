//! Bluetooth pairing through the system device manager (`bluetoothctl`).
//!
//! Both operations block for seconds and are meant to run on worker threads.

use std::process::{Command, Output};

use tracing::info;

use crate::config::PairingSettings;
use crate::error::PairingError;

/// A device seen during discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    pub name: String,
    pub address: String,
}

/// Discovery and connection of audio output devices.
pub trait Pairing {
    fn scan_devices(&self) -> Result<Vec<Device>, PairingError>;
    /// Connect to `address`; the `Ok` value is a status line.
    fn connect(&self, address: &str) -> Result<String, PairingError>;
}

/// [`Pairing`] implemented by shelling out to `bluetoothctl`.
pub struct Bluetoothctl {
    program: String,
    scan_seconds: u64,
}

impl Bluetoothctl {
    pub fn new(settings: &PairingSettings) -> Self {
        Self {
            program: settings.program.clone(),
            scan_seconds: settings.scan_seconds.max(1),
        }
    }

    fn run(&self, args: &[&str]) -> Result<Output, PairingError> {
        Command::new(&self.program)
            .args(args)
            .output()
            .map_err(|source| PairingError::Spawn {
                program: self.program.clone(),
                source,
            })
    }
}

impl Pairing for Bluetoothctl {
    fn scan_devices(&self) -> Result<Vec<Device>, PairingError> {
        let secs = self.scan_seconds.to_string();
        // Discovery results are cached by bluez; the exit status does not matter.
        self.run(&["--timeout", &secs, "scan", "on"])?;

        let output = self.run(&["devices"])?;
        if !output.status.success() {
            return Err(PairingError::Process(combined_output(&output)));
        }

        let devices = parse_devices(&String::from_utf8_lossy(&output.stdout));
        info!(count = devices.len(), "bluetooth scan finished");
        Ok(devices)
    }

    fn connect(&self, address: &str) -> Result<String, PairingError> {
        let output = self.run(&["connect", address])?;
        let text = combined_output(&output);

        if text.contains("Connection successful") {
            info!(address, "bluetooth device connected");
            Ok(format!("Connected to {address}"))
        } else if !output.status.success() {
            Err(PairingError::Process(text))
        } else {
            Err(PairingError::Rejected {
                address: address.to_string(),
            })
        }
    }
}

fn combined_output(output: &Output) -> String {
    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));
    text.trim().to_string()
}

/// Parse `Device <address> <name>` lines from `bluetoothctl devices`.
fn parse_devices(output: &str) -> Vec<Device> {
    output
        .lines()
        .filter_map(|line| {
            let mut parts = line.trim().splitn(3, ' ');
            if parts.next()? != "Device" {
                return None;
            }
            let address = parts.next()?.to_string();
            let name = parts.next()?.trim().to_string();
            Some(Device { name, address })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_devices_reads_address_and_full_name() {
        let out = "Device AA:BB:CC:DD:EE:FF Living Room Speaker\n\
                   [CHG] Controller 11:22:33:44:55:66 Discovering: yes\n\
                   Device 01:23:45:67:89:AB Headset\n\
                   Device 01:23:45:67:89:AC\n";
        assert_eq!(
            parse_devices(out),
            vec![
                Device {
                    name: "Living Room Speaker".into(),
                    address: "AA:BB:CC:DD:EE:FF".into(),
                },
                Device {
                    name: "Headset".into(),
                    address: "01:23:45:67:89:AB".into(),
                },
            ]
        );
    }

    #[test]
    fn missing_program_is_a_spawn_error() {
        let bt = Bluetoothctl::new(&PairingSettings {
            program: "/nonexistent/stickplay-bluetoothctl".into(),
            scan_seconds: 1,
        });
        assert!(matches!(bt.scan_devices(), Err(PairingError::Spawn { .. })));
        assert!(matches!(
            bt.connect("AA:BB:CC:DD:EE:FF"),
            Err(PairingError::Spawn { .. })
        ));
    }

    #[cfg(unix)]
    fn fake_bluetoothctl(dir: &std::path::Path) -> Bluetoothctl {
        use std::os::unix::fs::PermissionsExt;

        let script = dir.join("fake-bluetoothctl");
        std::fs::write(
            &script,
            r#"#!/bin/sh
case "$1" in
  devices) echo "Device AA:BB:CC:DD:EE:FF Speaker One" ;;
  connect)
    case "$2" in
      AA:BB:CC:DD:EE:FF) echo "Attempting to connect"; echo "Connection successful" ;;
      11:11:11:11:11:11) echo "Attempting to connect" ;;
      *) echo "Failed to connect: org.bluez.Error.Failed" >&2; exit 1 ;;
    esac ;;
  *) exit 0 ;;
esac
"#,
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        Bluetoothctl::new(&PairingSettings {
            program: script.to_string_lossy().into_owned(),
            scan_seconds: 1,
        })
    }

    #[cfg(unix)]
    #[test]
    fn scan_and_connect_through_the_device_manager() {
        let dir = tempfile::tempdir().unwrap();
        let bt = fake_bluetoothctl(dir.path());

        let devices = bt.scan_devices().unwrap();
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].name, "Speaker One");

        assert_eq!(
            bt.connect("AA:BB:CC:DD:EE:FF").unwrap(),
            "Connected to AA:BB:CC:DD:EE:FF"
        );
        assert!(matches!(
            bt.connect("11:11:11:11:11:11"),
            Err(PairingError::Rejected { .. })
        ));
        match bt.connect("22:22:22:22:22:22") {
            Err(PairingError::Process(msg)) => assert!(msg.contains("org.bluez.Error.Failed")),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
