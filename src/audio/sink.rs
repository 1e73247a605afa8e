//! Utilities for creating `rodio` sinks from audio files.
//!
//! Opening and decoding happen before the sink is built, so a corrupt or
//! unreadable file is reported as an [`EngineError`] instead of a panic.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use rodio::{Decoder, OutputStream, Sink};

use crate::error::EngineError;

/// Open and probe `path` as an audio source.
pub(super) fn open_source(path: &Path) -> Result<Decoder<BufReader<File>>, EngineError> {
    let file = File::open(path).map_err(|source| EngineError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    Decoder::new(BufReader::new(file)).map_err(|err| EngineError::Decode {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })
}

/// Create a paused `Sink` for `path` at the given volume.
pub(super) fn create_sink(
    stream: &OutputStream,
    path: &Path,
    volume: f32,
) -> Result<Sink, EngineError> {
    let source = open_source(path)?;

    let sink = Sink::connect_new(stream.mixer());
    sink.set_volume(volume);
    sink.append(source);
    sink.pause();
    Ok(sink)
}
