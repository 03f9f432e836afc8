//! Time-window planning and frame sampling.
//!
//! [`SampleWindow`] turns a requested clip (start, length, capture cadence)
//! and the source's real duration into an exact list of capture
//! timestamps. [`sample`] then fetches one frame per timestamp, in order,
//! into a [`FrameSequence`].
//!
//! Timestamps are computed as `start + interval * i` in integer
//! nanoseconds, so long clips with short intervals don't drift.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//!
//! use clipgif::{ClipError, SampleWindow};
//!
//! // A 2 s source, asking for 5 s starting at 1 s, every half second.
//! let window = SampleWindow::new(
//!     Duration::from_secs(2),
//!     Duration::from_secs(1),
//!     Duration::from_secs(5),
//!     Duration::from_millis(500),
//! )?;
//! assert!(window.is_truncated());
//! let timestamps: Vec<_> = window.timestamps().collect();
//! assert_eq!(timestamps, [Duration::from_millis(1000), Duration::from_millis(1500)]);
//! # Ok::<(), ClipError>(())
//! ```

use std::iter::FusedIterator;
use std::time::Duration;

use image::DynamicImage;

use crate::{
    configuration::ConvertOptions,
    error::ClipError,
    progress::{OperationType, ProgressTracker},
    request::ConversionRequest,
    source::VideoSource,
};

/// Upper bound on frame slots reserved ahead of sampling. The plan length is
/// caller-controlled, so larger sequences grow as frames actually arrive.
pub(crate) const MAX_PREALLOCATED_FRAMES: usize = 1024;

/// The resolved capture window for one conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleWindow {
    start: Duration,
    end: Duration,
    interval: Duration,
    truncated: bool,
}

impl SampleWindow {
    /// Resolve a window against a source of length `source_duration`.
    ///
    /// The end is `min(start + requested, source_duration)`: a window that
    /// runs past the source is silently cut short, not rejected.
    ///
    /// # Errors
    ///
    /// - [`ClipError::InvalidWindow`] if `start >= source_duration`.
    /// - [`ClipError::InvalidParameter`] if `interval` is zero.
    pub fn new(
        source_duration: Duration,
        start: Duration,
        requested: Duration,
        interval: Duration,
    ) -> Result<Self, ClipError> {
        if interval.is_zero() {
            return Err(ClipError::invalid_parameter(
                "sample_interval",
                "must be greater than zero",
            ));
        }
        if start >= source_duration {
            return Err(ClipError::InvalidWindow {
                start,
                source_duration,
            });
        }

        let requested_end = start.saturating_add(requested);
        let truncated = requested_end > source_duration;
        let end = requested_end.min(source_duration);

        if truncated {
            log::warn!(
                "Clip end {requested_end:?} is past the source end; truncating to {end:?}"
            );
        }

        Ok(Self {
            start,
            end,
            interval,
            truncated,
        })
    }

    /// Resolve the window described by `request`.
    ///
    /// # Errors
    ///
    /// Same as [`new`](SampleWindow::new).
    pub fn for_request(
        request: &ConversionRequest,
        source_duration: Duration,
    ) -> Result<Self, ClipError> {
        Self::new(
            source_duration,
            request.start_time(),
            request.duration(),
            request.sample_interval(),
        )
    }

    /// First capture timestamp.
    pub fn start(&self) -> Duration {
        self.start
    }

    /// Exclusive end of the window, never past the source end.
    pub fn effective_end(&self) -> Duration {
        self.end
    }

    /// Gap between captures.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Length of the resolved window.
    pub fn span(&self) -> Duration {
        self.end - self.start
    }

    /// Whether the requested window ran past the source and was cut short.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Number of capture timestamps.
    ///
    /// `ceil(span / interval)`, except that an interval at least as long as
    /// the whole window samples nothing.
    pub fn len(&self) -> usize {
        let span = self.span().as_nanos();
        let interval = self.interval.as_nanos();
        if interval >= span {
            return 0;
        }
        usize::try_from(span.div_ceil(interval)).unwrap_or(usize::MAX)
    }

    /// Whether the window samples no frames at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The capture timestamps, strictly increasing, all `< effective_end`.
    pub fn timestamps(&self) -> Timestamps {
        Timestamps {
            start: self.start.as_nanos(),
            interval: self.interval.as_nanos(),
            next: 0,
            count: self.len(),
        }
    }
}

/// Iterator over a [`SampleWindow`]'s capture timestamps.
#[derive(Debug, Clone)]
pub struct Timestamps {
    start: u128,
    interval: u128,
    next: usize,
    count: usize,
}

impl Iterator for Timestamps {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        if self.next >= self.count {
            return None;
        }
        let nanos = self.start + self.interval * self.next as u128;
        self.next += 1;
        Some(nanos_to_duration(nanos))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.count - self.next;
        (remaining, Some(remaining))
    }

    fn nth(&mut self, n: usize) -> Option<Duration> {
        self.next = self.next.saturating_add(n).min(self.count);
        self.next()
    }
}

impl ExactSizeIterator for Timestamps {}

impl FusedIterator for Timestamps {}

fn nanos_to_duration(nanos: u128) -> Duration {
    const NANOS_PER_SECOND: u128 = 1_000_000_000;
    let seconds = u64::try_from(nanos / NANOS_PER_SECOND).unwrap_or(u64::MAX);
    Duration::new(seconds, (nanos % NANOS_PER_SECOND) as u32)
}

/// Sampled frames in capture order, each paired with its timestamp.
///
/// Produced by [`sample`] and consumed by the encoder.
#[derive(Debug, Clone, Default)]
pub struct FrameSequence {
    timestamps: Vec<Duration>,
    frames: Vec<DynamicImage>,
}

impl FrameSequence {
    /// An empty sequence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-allocate room for `capacity` frames.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            timestamps: Vec::with_capacity(capacity),
            frames: Vec::with_capacity(capacity),
        }
    }

    /// Append a frame captured at `timestamp`.
    ///
    /// Callers are expected to push in increasing timestamp order.
    pub fn push(&mut self, timestamp: Duration, frame: DynamicImage) {
        debug_assert!(
            self.timestamps.last().is_none_or(|last| *last < timestamp),
            "frames must be pushed in increasing timestamp order"
        );
        self.timestamps.push(timestamp);
        self.frames.push(frame);
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether there are no frames.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Capture timestamps, in order.
    pub fn timestamps(&self) -> &[Duration] {
        &self.timestamps
    }

    /// Frame images, in capture order.
    pub fn frames(&self) -> &[DynamicImage] {
        &self.frames
    }

    /// `(timestamp, frame)` pairs in capture order.
    pub fn iter(&self) -> impl Iterator<Item = (Duration, &DynamicImage)> + '_ {
        self.timestamps.iter().copied().zip(self.frames.iter())
    }

    /// Release the frames, dropping the timestamps.
    pub fn into_frames(self) -> Vec<DynamicImage> {
        self.frames
    }
}

/// Fetch one frame per timestamp of `window` from `source`, in order.
///
/// Stops at the first failure and returns it; frames fetched before the
/// failure are discarded.
///
/// # Errors
///
/// - [`ClipError::DecodeFailure`] if any frame cannot be decoded.
/// - [`ClipError::Cancelled`] if the options' token is cancelled.
pub fn sample<S: VideoSource + ?Sized>(
    source: &mut S,
    window: &SampleWindow,
    options: &ConvertOptions,
) -> Result<FrameSequence, ClipError> {
    let total = window.len();
    log::debug!(
        "Sampling {total} frames from {:?} to {:?} every {:?}",
        window.start(),
        window.effective_end(),
        window.interval(),
    );

    let mut tracker = ProgressTracker::new(
        options.progress.clone(),
        OperationType::Sampling,
        Some(total as u64),
        options.batch_size,
    );
    let mut sequence = FrameSequence::with_capacity(total.min(MAX_PREALLOCATED_FRAMES));

    for timestamp in window.timestamps() {
        let frame = fetch_frame(source, timestamp, options)?;
        sequence.push(timestamp, frame);
        tracker.advance(Some(timestamp));
    }

    tracker.finish();
    Ok(sequence)
}

/// Fetch and scale a single frame, normalising any failure to a decode
/// failure at `timestamp`.
pub(crate) fn fetch_frame<S: VideoSource + ?Sized>(
    source: &mut S,
    timestamp: Duration,
    options: &ConvertOptions,
) -> Result<DynamicImage, ClipError> {
    if options.is_cancelled() {
        return Err(ClipError::Cancelled);
    }

    let frame = source.frame_at(timestamp).map_err(|error| match error {
        ClipError::DecodeFailure { .. } | ClipError::Cancelled => error,
        other => ClipError::decode_failure(Some(timestamp), other.to_string()),
    })?;

    Ok(options.scale(frame))
}
