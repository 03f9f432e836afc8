//! End-to-end conversion tests.
//!
//! The pipeline tests use an in-memory source. Tests against a real video
//! require `tests/fixtures/sample_video.mp4`.

mod common;

use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clipgif::{
    ClipError, ConversionRequest, ConversionStage, ConvertOptions, Converter, EncodeSettings,
    ErrorKind, FrameEncoder, FrameSequence, LoopFlag, Quality, Repeat,
};

use common::{RecordingProgress, SyntheticSource, sample_video_path};

fn options_in(directory: &Path) -> (ConvertOptions, Arc<RecordingProgress>) {
    let progress = Arc::new(RecordingProgress::default());
    let options = ConvertOptions::new()
        .with_output_directory(directory)
        .with_progress(progress.clone());
    (options, progress)
}

fn request(start: f64, duration: f64, sample: f64, playback: f64) -> ConversionRequest {
    ConversionRequest::from_secs(start, duration, sample, playback).unwrap()
}

type Captured = Arc<Mutex<Vec<(Vec<Duration>, EncodeSettings)>>>;

/// Records the frame timestamps it was handed, then writes a stub.
#[derive(Default)]
struct CapturingEncoder {
    seen: Captured,
}

impl FrameEncoder for CapturingEncoder {
    fn encode(
        &self,
        frames: &FrameSequence,
        settings: &EncodeSettings,
        output: &mut dyn Write,
    ) -> Result<(), ClipError> {
        self.seen
            .lock()
            .unwrap()
            .push((frames.timestamps().to_vec(), *settings));
        output.write_all(b"GIF89a;")?;
        Ok(())
    }
}

// ── Scenarios ──────────────────────────────────────────────────────

#[test]
fn full_window_produces_gif_artifact() {
    let directory = tempfile::tempdir().unwrap();
    let (options, progress) = options_in(directory.path());
    let mut source = SyntheticSource::secs(10.0);

    let artifact = Converter::new(options)
        .run(&mut source, &request(0.0, 3.0, 0.5, 0.2))
        .unwrap();

    assert_eq!(artifact.frame_count(), 6);
    assert!(artifact.path().starts_with(directory.path()));
    assert_eq!(&artifact.read().unwrap()[..6], b"GIF89a");
    assert_eq!(source.requested.len(), 6);

    let stages = progress.stages();
    assert_eq!(stages.len(), 5);
    assert_eq!(stages[0], ConversionStage::Received);
    assert_eq!(
        stages[1],
        ConversionStage::Validated {
            planned_frames: 6,
            truncated: false
        }
    );
    assert_eq!(stages[2], ConversionStage::Sampled { frame_count: 6 });
    assert_eq!(
        stages[3],
        ConversionStage::Encoded {
            bytes: artifact.size()
        }
    );
    assert_eq!(
        stages[4],
        ConversionStage::Delivered {
            path: artifact.path().to_path_buf()
        }
    );

    artifact.cleanup().unwrap();
}

#[test]
fn truncated_window_samples_only_available_frames() {
    let directory = tempfile::tempdir().unwrap();
    let (options, progress) = options_in(directory.path());
    let encoder = CapturingEncoder::default();
    let mut source = SyntheticSource::secs(2.0);

    let request = request(1.0, 5.0, 0.5, 0.2).with_repeat(Repeat::Loop);
    let artifact = Converter::with_encoder(encoder, options)
        .run(&mut source, &request)
        .unwrap();

    assert_eq!(artifact.frame_count(), 2);
    assert_eq!(
        source.requested,
        vec![Duration::from_secs(1), Duration::from_millis(1500)]
    );
    assert!(progress.stages().contains(&ConversionStage::Validated {
        planned_frames: 2,
        truncated: true
    }));
}

#[test]
fn start_at_source_end_fails_without_sampling() {
    let directory = tempfile::tempdir().unwrap();
    let (options, progress) = options_in(directory.path());
    let mut source = SyntheticSource::secs(5.0);

    let result = Converter::new(options).run(&mut source, &request(5.0, 1.0, 0.5, 0.2));

    assert!(matches!(result, Err(ClipError::InvalidWindow { .. })));
    assert!(source.requested.is_empty());

    let stages = progress.stages();
    assert_eq!(stages.len(), 2);
    assert!(matches!(
        &stages[1],
        ConversionStage::Failed {
            kind: ErrorKind::InvalidWindow,
            ..
        }
    ));
}

#[test]
fn interval_longer_than_window_is_empty_sequence() {
    let directory = tempfile::tempdir().unwrap();
    let (options, progress) = options_in(directory.path());
    let mut source = SyntheticSource::secs(10.0);

    let result = Converter::new(options).run(&mut source, &request(0.0, 3.0, 10.0, 0.2));

    assert!(matches!(result, Err(ClipError::EmptyFrameSequence)));
    assert!(
        !directory.path().exists() || fs::read_dir(directory.path()).unwrap().count() == 0,
        "no artifact may be left behind"
    );
    assert!(matches!(
        progress.stages().last(),
        Some(ConversionStage::Failed {
            kind: ErrorKind::EmptyFrameSequence,
            ..
        })
    ));
}

// ── Encoder handoff ────────────────────────────────────────────────

#[test]
fn encoder_receives_frames_and_playback_settings() {
    let directory = tempfile::tempdir().unwrap();
    let (options, _) = options_in(directory.path());
    let encoder = CapturingEncoder::default();
    let seen = encoder.seen.clone();
    let converter = Converter::with_encoder(encoder, options);
    let mut source = SyntheticSource::secs(10.0);

    let request = request(2.0, 1.0, 0.25, 0.1).with_quality(Quality::Low);
    let artifact = converter.run(&mut source, &request).unwrap();
    artifact.cleanup().unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    let (timestamps, settings) = &seen[0];
    assert_eq!(timestamps.len(), 4);
    assert_eq!(timestamps[0], Duration::from_secs(2));
    assert!((settings.frames_per_second - 10.0).abs() < 1e-9);
    assert_eq!(settings.profile, *Quality::Low.profile());
    assert_eq!(settings.loop_flag, LoopFlag::Once);
}

#[test]
fn decode_failure_discards_everything() {
    let directory = tempfile::tempdir().unwrap();
    let (options, progress) = options_in(directory.path());
    let encoder = CapturingEncoder::default();
    let seen = encoder.seen.clone();
    let mut source = SyntheticSource::secs(10.0).failing_at(Duration::from_millis(1500));

    let result = Converter::with_encoder(encoder, options).run(&mut source, &request(0.0, 3.0, 0.5, 0.2));

    assert!(matches!(
        result,
        Err(ClipError::DecodeFailure {
            timestamp: Some(t),
            ..
        }) if t == Duration::from_millis(1500)
    ));
    assert!(seen.lock().unwrap().is_empty(), "encoder must not run");
    assert!(!directory.path().exists() || fs::read_dir(directory.path()).unwrap().count() == 0);
    assert!(matches!(
        progress.stages().last(),
        Some(ConversionStage::Failed {
            kind: ErrorKind::DecodeFailure,
            ..
        })
    ));
}

// ── Repeated requests ──────────────────────────────────────────────

#[test]
fn identical_requests_do_not_collide() {
    let directory = tempfile::tempdir().unwrap();
    let (options, _) = options_in(directory.path());
    let converter = Converter::new(options);
    let request = request(1.0, 2.0, 0.5, 0.2);

    let first = converter.run(&mut SyntheticSource::secs(10.0), &request).unwrap();
    let second = converter.run(&mut SyntheticSource::secs(10.0), &request).unwrap();

    assert_ne!(first.path(), second.path());
    assert!(first.path().exists());
    assert!(second.path().exists());
    assert_eq!(fs::read_dir(directory.path()).unwrap().count(), 2);

    first.cleanup().unwrap();
    second.cleanup().unwrap();
    assert_eq!(fs::read_dir(directory.path()).unwrap().count(), 0);
}

#[test]
fn run_to_memory_returns_gif_bytes() {
    let directory = tempfile::tempdir().unwrap();
    let (options, progress) = options_in(directory.path());
    let mut source = SyntheticSource::secs(10.0);

    let bytes = Converter::new(options)
        .run_to_memory(&mut source, &request(0.0, 1.0, 0.5, 0.2))
        .unwrap();

    assert_eq!(&bytes[..6], b"GIF89a");
    assert!(!directory.path().exists() || fs::read_dir(directory.path()).unwrap().count() == 0);

    let stages = progress.stages();
    assert!(stages.contains(&ConversionStage::Encoded {
        bytes: bytes.len() as u64
    }));
    assert!(
        !stages
            .iter()
            .any(|stage| matches!(stage, ConversionStage::Delivered { .. }))
    );
}

#[test]
fn boxed_sources_convert() {
    let directory = tempfile::tempdir().unwrap();
    let (options, _) = options_in(directory.path());
    let mut source: Box<dyn clipgif::VideoSource> = Box::new(SyntheticSource::secs(4.0));

    let bytes = Converter::new(options)
        .run_to_memory(&mut source, &request(0.0, 1.0, 0.5, 0.2))
        .unwrap();
    assert!(!bytes.is_empty());
}

// ── Path-based conversion ──────────────────────────────────────────

#[test]
fn missing_file_is_rejected_before_decoding() {
    let directory = tempfile::tempdir().unwrap();
    let (options, progress) = options_in(directory.path());

    let result = clipgif::convert_with_options(
        directory.path().join("missing.mp4"),
        &ConversionRequest::default(),
        &options,
    );

    assert!(matches!(result, Err(ClipError::FileOpen { .. })));
    assert_eq!(progress.stages()[0], ConversionStage::Received);
    assert!(matches!(
        progress.stages().last(),
        Some(ConversionStage::Failed { .. })
    ));
}

#[test]
fn oversized_file_is_rejected() {
    let directory = tempfile::tempdir().unwrap();
    let source = directory.path().join("big.mp4");
    fs::write(&source, vec![0u8; 2048]).unwrap();
    let (options, _) = options_in(directory.path());

    let result = clipgif::convert_with_options(
        &source,
        &ConversionRequest::default(),
        &options.with_max_source_size(Some(1024)),
    );

    match result {
        Err(error @ ClipError::FileTooLarge { .. }) => {
            assert_eq!(error.kind(), ErrorKind::InvalidInput);
        }
        other => panic!("Expected FileTooLarge, got: {other:?}"),
    }
}

#[test]
fn convert_fixture_to_gif() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let directory = tempfile::tempdir().unwrap();
    let (options, progress) = options_in(directory.path());
    let options = options.with_width(160);

    let artifact = clipgif::convert_with_options(path, &request(0.0, 2.0, 0.5, 0.2), &options)
        .expect("Failed to convert fixture");

    assert_eq!(artifact.frame_count(), 4);
    assert!(artifact.size() > 0);
    assert!(matches!(
        progress.stages().last(),
        Some(ConversionStage::Delivered { .. })
    ));

    let bytes = artifact.read().unwrap();
    let decoder = gif::DecodeOptions::new().read_info(bytes.as_slice()).unwrap();
    assert_eq!(decoder.width(), 160);

    artifact.cleanup().unwrap();
}

#[cfg(feature = "rayon")]
#[test]
fn parallel_conversion_matches_sequential_frame_count() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let directory = tempfile::tempdir().unwrap();
    let (options, _) = options_in(directory.path());
    let request = request(0.0, 2.0, 0.25, 0.2);

    let sequential = clipgif::convert_with_options(path, &request, &options).unwrap();
    let parallel =
        clipgif::convert_with_options(path, &request, &options.clone().with_parallel(true)).unwrap();

    assert_eq!(sequential.frame_count(), parallel.frame_count());
    sequential.cleanup().unwrap();
    parallel.cleanup().unwrap();
}
