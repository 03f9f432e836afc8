//! FFmpeg-backed source tests.
//!
//! Tests require fixture files from `tests/fixtures/generate_fixtures.sh`.

mod common;

use std::fs;
use std::path::Path;
use std::time::Duration;

use clipgif::{ClipError, ErrorKind, MediaFile, VideoSource};

use common::sample_video_path;

#[test]
fn open_nonexistent_file() {
    let result = MediaFile::open("nonexistent_file.mp4");
    match result {
        Err(error @ ClipError::FileOpen { .. }) => {
            assert_eq!(error.kind(), ErrorKind::DecodeFailure);
            assert!(error.to_string().contains("nonexistent_file.mp4"));
        }
        other => panic!("Expected FileOpen, got: {other:?}"),
    }
}

#[test]
fn open_garbage_file() {
    let directory = tempfile::tempdir().unwrap();
    let path = directory.path().join("garbage.mp4");
    fs::write(&path, b"definitely not a video container").unwrap();

    assert!(matches!(
        MediaFile::open(&path),
        Err(ClipError::FileOpen { .. }) | Err(ClipError::NoVideoStream)
    ));
}

#[test]
fn fixture_metadata() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let media = MediaFile::open(path).expect("Failed to open fixture");
    let metadata = media.metadata();
    assert!(metadata.width > 0);
    assert!(metadata.height > 0);
    assert!(metadata.frames_per_second > 0.0);
    assert!(!metadata.codec.is_empty());
    assert_eq!(media.duration(), metadata.duration);
    assert!(media.duration() > Duration::ZERO);
    assert_eq!(media.path(), Path::new(path));
}

#[test]
fn fixture_frames_decode_at_native_size() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let mut media = MediaFile::open(path).expect("Failed to open fixture");
    let (width, height) = (media.metadata().width, media.metadata().height);

    for timestamp in [Duration::ZERO, Duration::from_millis(500), Duration::from_secs(1)] {
        let frame = media.frame_at(timestamp).expect("Failed to decode frame");
        assert_eq!((frame.width(), frame.height()), (width, height));
    }
}

#[test]
fn fixture_frames_decode_out_of_order() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let mut media = MediaFile::open(path).expect("Failed to open fixture");
    let late = media.frame_at(Duration::from_secs(1)).unwrap();
    let early = media.frame_at(Duration::ZERO).unwrap();
    let late_again = media.frame_at(Duration::from_secs(1)).unwrap();

    assert_eq!(late.as_bytes(), late_again.as_bytes());
    assert_eq!(early.width(), late.width());
}

#[test]
fn frame_past_end_is_decode_failure() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let mut media = MediaFile::open(path).expect("Failed to open fixture");
    let end = media.duration();
    match media.frame_at(end) {
        Err(ClipError::DecodeFailure { timestamp, .. }) => assert_eq!(timestamp, Some(end)),
        other => panic!("Expected DecodeFailure, got: {other:?}"),
    }
}
