//! Error types shared by the player, the indexer and the external helpers.
//!
//! None of these are fatal: the controller and the worker threads turn them
//! into status text and the player stays usable.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by playback controller operations.
#[derive(Debug, Error)]
pub enum PlayerError {
    /// The folder is not part of the active library.
    #[error("folder not found: {}", .0.display())]
    NotFound(PathBuf),
    /// No folder is selected, or the index is past the end of its tracks.
    #[error("track index {index} out of range (folder has {len} tracks)")]
    OutOfRange { index: usize, len: usize },
    /// The audio engine rejected the track.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Errors reported by the audio engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("cannot open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot decode {}: {reason}", path.display())]
    Decode { path: PathBuf, reason: String },
    /// No output device, or the audio thread is gone.
    #[error("audio output unavailable")]
    Unavailable,
}

/// Errors while querying the block-device inventory.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("{program} exited with {status}")]
    Status { program: String, status: String },
    #[error("{program} produced unreadable output")]
    Output { program: String },
}

/// Errors from the Bluetooth pairing helper.
#[derive(Debug, Error)]
pub enum PairingError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    /// The device manager ran but did not report a successful connection.
    #[error("Connection failed: {address}")]
    Rejected { address: String },
    /// The device manager exited with an error; carries its output.
    #[error("{0}")]
    Process(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_errors_convert_into_player_errors() {
        let err: PlayerError = EngineError::Unavailable.into();
        assert!(matches!(err, PlayerError::Engine(EngineError::Unavailable)));
        assert_eq!(err.to_string(), "audio output unavailable");
    }

    #[test]
    fn out_of_range_message_mentions_index_and_len() {
        let err = PlayerError::OutOfRange { index: 4, len: 2 };
        assert_eq!(
            err.to_string(),
            "track index 4 out of range (folder has 2 tracks)"
        );
    }

    #[test]
    fn rejected_pairing_reads_like_a_status_line() {
        let err = PairingError::Rejected {
            address: "AA:BB:CC:DD:EE:FF".into(),
        };
        assert_eq!(err.to_string(), "Connection failed: AA:BB:CC:DD:EE:FF");
    }
}
