//! Parallel frame sampling.
//!
//! Splits a window's timestamps into one contiguous chunk per rayon worker.
//! Each worker opens its own source through the caller's opener, so no
//! decoder state is shared, and the chunks are stitched back together in
//! capture order. The first failing worker stops the others before their
//! next fetch.

use std::sync::{
    Mutex,
    atomic::{AtomicBool, Ordering},
};
use std::time::Duration;

use ::rayon::prelude::*;
use image::DynamicImage;

use crate::configuration::ConvertOptions;
use crate::error::ClipError;
use crate::progress::{OperationType, ProgressTracker};
use crate::sampler::{self, FrameSequence, MAX_PREALLOCATED_FRAMES, SampleWindow};
use crate::source::VideoSource;

/// Sample every timestamp of `window` across the rayon thread pool.
///
/// `open` is called once per worker and must return an independent source
/// for the same video; [`MediaFile::open`](crate::MediaFile::open) on a
/// fixed path is the usual choice. Progress is reported as
/// [`OperationType::Sampling`] while workers run.
///
/// # Errors
///
/// Fails as a whole if any worker fails; no partial sequence is returned.
///
/// - Any error from `open`.
/// - [`ClipError::DecodeFailure`] if a frame cannot be decoded.
/// - [`ClipError::Cancelled`] if the options' token is cancelled.
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
///
/// use clipgif::{ClipError, ConvertOptions, MediaFile, SampleWindow, VideoSource};
///
/// let duration = MediaFile::open("input.mp4")?.duration();
/// let window = SampleWindow::new(
///     duration,
///     Duration::ZERO,
///     Duration::from_secs(3),
///     Duration::from_millis(500),
/// )?;
/// let frames = clipgif::sample_parallel(&window, &ConvertOptions::default(), || {
///     MediaFile::open("input.mp4")
/// })?;
/// # Ok::<(), ClipError>(())
/// ```
pub fn sample_parallel<S, F>(
    window: &SampleWindow,
    options: &ConvertOptions,
    open: F,
) -> Result<FrameSequence, ClipError>
where
    S: VideoSource,
    F: Fn() -> Result<S, ClipError> + Sync,
{
    let total = window.len();
    if total == 0 {
        return Ok(FrameSequence::new());
    }

    let chunk_size = total.div_ceil(::rayon::current_num_threads()).max(1);
    let chunk_count = total.div_ceil(chunk_size);
    log::debug!("Sampling {total} frames in parallel, {chunk_count} chunks of up to {chunk_size}");

    let tracker = Mutex::new(ProgressTracker::new(
        options.progress.clone(),
        OperationType::Sampling,
        Some(total as u64),
        options.batch_size,
    ));
    let failed = AtomicBool::new(false);

    let chunks: Result<Vec<Vec<(Duration, DynamicImage)>>, ClipError> = (0..chunk_count)
        .into_par_iter()
        .map(|index| {
            let timestamps = window
                .timestamps()
                .skip(index * chunk_size)
                .take(chunk_size);
            let result = sample_chunk(&open, timestamps, options, &failed, &tracker);
            if result.is_err() {
                failed.store(true, Ordering::Release);
            }
            result
        })
        .collect();
    let chunks = chunks?;

    if let Ok(mut tracker) = tracker.into_inner() {
        tracker.finish();
    }

    let mut sequence = FrameSequence::with_capacity(total.min(MAX_PREALLOCATED_FRAMES));
    for (timestamp, frame) in chunks.into_iter().flatten() {
        sequence.push(timestamp, frame);
    }
    Ok(sequence)
}

/// Fetch one chunk from a fresh source. Stops early, without error, once
/// another worker has failed; that worker's error is the one reported.
fn sample_chunk<S, F>(
    open: &F,
    timestamps: impl Iterator<Item = Duration>,
    options: &ConvertOptions,
    failed: &AtomicBool,
    tracker: &Mutex<ProgressTracker>,
) -> Result<Vec<(Duration, DynamicImage)>, ClipError>
where
    S: VideoSource,
    F: Fn() -> Result<S, ClipError>,
{
    if options.is_cancelled() {
        return Err(ClipError::Cancelled);
    }
    if failed.load(Ordering::Acquire) {
        return Ok(Vec::new());
    }

    let mut source = open()?;
    let mut frames = Vec::new();

    for timestamp in timestamps {
        if failed.load(Ordering::Acquire) {
            log::debug!("Worker stopping before {timestamp:?}: another chunk failed");
            break;
        }

        let frame = sampler::fetch_frame(&mut source, timestamp, options)?;
        frames.push((timestamp, frame));

        if let Ok(mut tracker) = tracker.lock() {
            tracker.advance(Some(timestamp));
        }
    }

    Ok(frames)
}
