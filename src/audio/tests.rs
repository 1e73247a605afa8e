use super::sink::open_source;
use super::thread::fade_steps;
use crate::error::EngineError;
use std::time::Duration;

#[test]
fn open_source_reports_missing_files() {
    let err = open_source(std::path::Path::new("/nonexistent/stickplay.mp3")).err().unwrap();
    assert!(matches!(err, EngineError::Open { .. }));
}

#[test]
fn open_source_rejects_files_that_are_not_audio() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.mp3");
    std::fs::write(&path, b"definitely not audio").unwrap();

    let err = open_source(&path).err().unwrap();
    assert!(matches!(err, EngineError::Decode { .. }));
    assert!(err.to_string().contains("broken.mp3"));
}

#[test]
fn fade_steps_end_in_silence() {
    let (levels, pause) = fade_steps(0.8, 400);
    assert_eq!(levels.len(), 20);
    assert_eq!(pause, Duration::from_millis(20));
    assert!(levels.windows(2).all(|w| w[0] > w[1]));
    assert!(levels.last().unwrap().abs() < f32::EPSILON);
}

#[test]
fn fade_steps_without_duration_mutes_at_once() {
    let (levels, pause) = fade_steps(1.0, 0);
    assert_eq!(levels, vec![0.0]);
    assert!(pause.is_zero());
}
