//! Async conversion via Tokio.
//!
//! [`convert_async`] runs a path-based conversion on Tokio's blocking pool
//! and hands back a [`ConversionFuture`]. FFmpeg and the GIF encoder are
//! both synchronous, so the work itself never runs on an async worker.
//!
//! # Example
//!
//! ```no_run
//! use clipgif::{ClipError, ConversionRequest, ConvertOptions};
//!
//! # async fn example() -> Result<(), ClipError> {
//! let artifact = clipgif::convert_async(
//!     "input.mp4",
//!     ConversionRequest::default(),
//!     ConvertOptions::default(),
//! )
//! .await?;
//! println!("GIF at {}", artifact.path().display());
//! # Ok(())
//! # }
//! ```

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::task::JoinHandle;

use crate::configuration::ConvertOptions;
use crate::convert::Converter;
use crate::encode::OutputArtifact;
use crate::error::ClipError;
use crate::request::ConversionRequest;

/// A conversion running on a blocking thread.
///
/// Resolves to the artifact, or to [`ClipError::Cancelled`] if the task was
/// aborted or panicked.
pub struct ConversionFuture {
    handle: JoinHandle<Result<OutputArtifact, ClipError>>,
}

impl ConversionFuture {
    /// Abort the task if it has not started yet. A conversion already in
    /// progress only stops at its next cancellation check.
    pub fn abort(&self) {
        self.handle.abort();
    }
}

impl Future for ConversionFuture {
    type Output = Result<OutputArtifact, ClipError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.handle)
            .poll(cx)
            .map(|result| result.unwrap_or_else(|_| Err(ClipError::Cancelled)))
    }
}

/// Convert the video at `path` on Tokio's blocking pool.
///
/// Must be called from within a Tokio runtime.
pub fn convert_async<P: AsRef<Path>>(
    path: P,
    request: ConversionRequest,
    options: ConvertOptions,
) -> ConversionFuture {
    let path: PathBuf = path.as_ref().to_path_buf();
    let handle = tokio::task::spawn_blocking(move || {
        Converter::new(options).convert_path(&path, &request)
    });
    ConversionFuture { handle }
}
