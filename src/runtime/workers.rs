//! Background jobs: volume rescans and Bluetooth pairing.
//!
//! Each job runs on its own thread and reports back over a channel, so the
//! event loop never blocks on `lsblk`, a directory walk or `bluetoothctl`.

use std::path::PathBuf;
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

use tracing::{info, warn};

use crate::app::{Browser, Controller};
use crate::config::{DeviceSettings, LibrarySettings};
use crate::error::PairingError;
use crate::library::{ScanOutcome, scan_volumes};
use crate::pairing::{Device, Pairing};
use crate::volumes::list_removable_volumes;

/// Result of a background job.
#[derive(Debug)]
pub enum WorkerEvent {
    ScanFinished(ScanOutcome),
    DevicesFound(Result<Vec<Device>, PairingError>),
    Connected(Result<String, PairingError>),
}

/// Where a rescan looks for music.
#[derive(Debug, Clone)]
pub enum ScanSource {
    /// Removable drives reported by the block device listing.
    Removable(DeviceSettings),
    /// A single directory given on the command line.
    Directory(PathBuf),
}

impl ScanSource {
    fn volumes(&self) -> Vec<PathBuf> {
        match self {
            ScanSource::Removable(settings) => list_removable_volumes(settings),
            ScanSource::Directory(dir) => vec![dir.clone()],
        }
    }
}

pub fn spawn_rescan(source: ScanSource, library: LibrarySettings, tx: Sender<WorkerEvent>) {
    thread::spawn(move || {
        let volumes = source.volumes();
        info!(count = volumes.len(), "rescanning volumes");
        let outcome = scan_volumes(&volumes, &library);
        let _ = tx.send(WorkerEvent::ScanFinished(outcome));
    });
}

pub fn spawn_device_scan(pairing: Arc<dyn Pairing + Send + Sync>, tx: Sender<WorkerEvent>) {
    thread::spawn(move || {
        let _ = tx.send(WorkerEvent::DevicesFound(pairing.scan_devices()));
    });
}

pub fn spawn_connect(
    pairing: Arc<dyn Pairing + Send + Sync>,
    address: String,
    tx: Sender<WorkerEvent>,
) {
    thread::spawn(move || {
        let _ = tx.send(WorkerEvent::Connected(pairing.connect(&address)));
    });
}

/// Fold a finished job into the controller and the UI state.
///
/// Only a scan that found music replaces the library; every other outcome
/// just reports its status.
pub fn apply_worker_event(event: WorkerEvent, controller: &Mutex<Controller>, browser: &mut Browser) {
    let mut ctl = controller.lock().unwrap_or_else(PoisonError::into_inner);

    match event {
        WorkerEvent::ScanFinished(outcome) => {
            let status = outcome.status_text();
            if let ScanOutcome::Found { volume, library } = outcome {
                info!(volume = %volume.display(), tracks = library.track_count(), "library loaded");
                ctl.load_snapshot(Arc::new(library));
                browser.reset();
            }
            ctl.report_status(status);
        }
        WorkerEvent::DevicesFound(Ok(devices)) => {
            let status = format!("{} Bluetooth devices found.", devices.len());
            browser.show_devices(devices);
            ctl.report_status(status);
        }
        WorkerEvent::DevicesFound(Err(err)) => {
            warn!(error = %err, "bluetooth scan failed");
            ctl.report_status(format!("Bluetooth scan failed: {err}"));
        }
        WorkerEvent::Connected(Ok(status)) => ctl.report_status(status),
        WorkerEvent::Connected(Err(err)) => {
            warn!(error = %err, "bluetooth connect failed");
            let status = match &err {
                PairingError::Process(output) => format!("Error: {output}"),
                other => other.to_string(),
            };
            ctl.report_status(status);
        }
    }
}
