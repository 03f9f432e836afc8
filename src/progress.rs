//! Progress reporting, stage events, and cancellation support.
//!
//! [`ProgressCallback`] is the injectable observer for a conversion: it
//! receives per-frame [`ProgressInfo`] snapshots while sampling, and one
//! [`ConversionStage`] event per state transition. [`CancellationToken`]
//! lets another thread stop a conversion between frame fetches.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use clipgif::{
//!     ClipError, ConversionRequest, ConversionStage, ConvertOptions, ProgressCallback,
//!     ProgressInfo,
//! };
//!
//! struct PrintProgress;
//!
//! impl ProgressCallback for PrintProgress {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         if let Some(pct) = info.percentage {
//!             println!("[{:?}] {pct:.1}% complete", info.operation);
//!         }
//!     }
//!
//!     fn on_stage(&self, stage: &ConversionStage) {
//!         println!("stage: {stage:?}");
//!     }
//! }
//!
//! let options = ConvertOptions::new().with_progress(Arc::new(PrintProgress));
//! let artifact = clipgif::convert_with_options("input.mp4", &ConversionRequest::default(), &options)?;
//! # Ok::<(), ClipError>(())
//! ```

use std::path::PathBuf;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::time::{Duration, Instant};

use crate::error::ErrorKind;

/// The kind of work currently in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum OperationType {
    /// Fetching frames from the source.
    Sampling,
}

/// A snapshot of conversion progress.
///
/// Delivered to [`ProgressCallback::on_progress`] at a cadence controlled
/// by [`ConvertOptions::with_batch_size`](crate::ConvertOptions::with_batch_size).
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// What kind of work is being performed.
    pub operation: OperationType,
    /// How many frames have been processed so far.
    pub current: u64,
    /// Total frames expected, if known ahead of time.
    pub total: Option<u64>,
    /// Completion percentage (0.0 – 100.0), if `total` is known.
    pub percentage: Option<f32>,
    /// Wall-clock time elapsed since the operation started.
    pub elapsed: Duration,
    /// Estimated time remaining, based on current throughput.
    pub estimated_remaining: Option<Duration>,
    /// Capture timestamp of the most recent frame.
    pub current_timestamp: Option<Duration>,
}

/// One transition of the per-request state machine.
///
/// A successful conversion reports `Received`, `Validated`, `Sampled`,
/// `Encoded` and `Delivered` in that order. Any failure reports `Failed`
/// instead of the remaining stages.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ConversionStage {
    /// The request was accepted.
    Received,
    /// The window fits the source.
    Validated {
        /// Number of timestamps the window will sample.
        planned_frames: usize,
        /// Whether the window was cut short by the end of the source.
        truncated: bool,
    },
    /// All frames were fetched.
    Sampled {
        /// Number of frames fetched.
        frame_count: usize,
    },
    /// The encoder produced output.
    Encoded {
        /// Size of the encoded GIF in bytes.
        bytes: u64,
    },
    /// The artifact is in place and owned by the caller.
    Delivered {
        /// Where the artifact was written.
        path: PathBuf,
    },
    /// The conversion stopped. No artifact remains.
    Failed {
        /// Category of the failure.
        kind: ErrorKind,
        /// Human-readable failure message.
        message: String,
    },
}

/// Observer for conversion progress and stage transitions.
///
/// Implementations must be [`Send`] and [`Sync`] because callbacks may be
/// invoked from worker threads in parallel or async contexts.
///
/// Callbacks are **infallible**: they observe but cannot halt the
/// conversion. Use [`CancellationToken`] for cooperative cancellation.
pub trait ProgressCallback: Send + Sync {
    /// Called at regular intervals while frames are processed.
    fn on_progress(&self, info: &ProgressInfo);

    /// Called once per state transition.
    fn on_stage(&self, _stage: &ConversionStage) {}
}

/// Discards all notifications. The default observer.
pub(crate) struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_progress(&self, _info: &ProgressInfo) {}
}

/// Cooperative cancellation token backed by an [`AtomicBool`].
///
/// Clone this token and share it between threads; call
/// [`cancel`](CancellationToken::cancel) from any thread to stop the
/// associated conversion before its next frame fetch.
///
/// # Example
///
/// ```
/// use clipgif::CancellationToken;
///
/// let token = CancellationToken::new();
/// assert!(!token.is_cancelled());
///
/// token.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Debug, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a new, non-cancelled token.
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request cancellation. All clones observe it.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Check whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Tracks progress timing and emits callbacks.
pub(crate) struct ProgressTracker {
    callback: Arc<dyn ProgressCallback>,
    operation: OperationType,
    total: Option<u64>,
    current: u64,
    batch_size: u64,
    start_time: Instant,
    items_since_last_report: u64,
}

impl ProgressTracker {
    pub(crate) fn new(
        callback: Arc<dyn ProgressCallback>,
        operation: OperationType,
        total: Option<u64>,
        batch_size: u64,
    ) -> Self {
        Self {
            callback,
            operation,
            total,
            current: 0,
            batch_size: batch_size.max(1),
            start_time: Instant::now(),
            items_since_last_report: 0,
        }
    }

    /// Record one completed frame and fire the callback if the batch
    /// threshold is reached.
    pub(crate) fn advance(&mut self, timestamp: Option<Duration>) {
        self.current += 1;
        self.items_since_last_report += 1;

        if self.items_since_last_report >= self.batch_size {
            self.report(timestamp);
            self.items_since_last_report = 0;
        }
    }

    /// Emit a final report unless the last advance already did.
    pub(crate) fn finish(&mut self) {
        if self.items_since_last_report > 0 || self.current == 0 {
            self.report(None);
            self.items_since_last_report = 0;
        }
    }

    fn report(&self, timestamp: Option<Duration>) {
        let elapsed = self.start_time.elapsed();

        let percentage = self
            .total
            .filter(|&total| total > 0)
            .map(|total| (self.current as f32 / total as f32) * 100.0);

        let estimated_remaining = if self.current > 0 {
            self.total.map(|total| {
                let remaining = total.saturating_sub(self.current);
                let per_item = elapsed / self.current as u32;
                per_item * remaining as u32
            })
        } else {
            None
        };

        self.callback.on_progress(&ProgressInfo {
            operation: self.operation,
            current: self.current,
            total: self.total,
            percentage,
            elapsed,
            estimated_remaining,
            current_timestamp: timestamp,
        });
    }
}
