//! Conversion configuration.
//!
//! [`ConvertOptions`] is a builder that threads the output location, input
//! limits, progress observer and cancellation token through a conversion
//! without widening every function signature.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use clipgif::{CancellationToken, ConvertOptions};
//!
//! let token = CancellationToken::new();
//! let options = ConvertOptions::new()
//!     .with_output_directory("/tmp/gifs")
//!     .with_width(320)
//!     .with_cancellation(token.clone());
//! ```

use std::env;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::{DynamicImage, imageops::FilterType};

use crate::progress::{CancellationToken, NoOpProgress, ProgressCallback};

/// Largest source file accepted by default (200 MiB).
pub const DEFAULT_MAX_SOURCE_SIZE: u64 = 200 * 1024 * 1024;

/// Name of the directory created under the system temp dir for artifacts.
pub const DEFAULT_OUTPUT_DIRECTORY_NAME: &str = "temp_gifs";

/// Operational settings for a conversion.
///
/// All fields have defaults; a default-constructed value writes GIFs under
/// `<temp>/temp_gifs`, accepts sources up to 200 MiB, keeps the source
/// resolution and reports nothing.
#[derive(Clone)]
pub struct ConvertOptions {
    pub(crate) output_directory: PathBuf,
    pub(crate) max_source_size: Option<u64>,
    pub(crate) width: Option<u32>,
    pub(crate) progress: Arc<dyn ProgressCallback>,
    pub(crate) cancellation: Option<CancellationToken>,
    pub(crate) batch_size: u64,
    #[cfg(feature = "rayon")]
    pub(crate) parallel: bool,
}

impl Debug for ConvertOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ConvertOptions")
            .field("output_directory", &self.output_directory)
            .field("max_source_size", &self.max_source_size)
            .field("width", &self.width)
            .field("has_cancellation", &self.cancellation.is_some())
            .field("batch_size", &self.batch_size)
            .finish_non_exhaustive()
    }
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl ConvertOptions {
    /// Create options with default settings.
    pub fn new() -> Self {
        Self {
            output_directory: env::temp_dir().join(DEFAULT_OUTPUT_DIRECTORY_NAME),
            max_source_size: Some(DEFAULT_MAX_SOURCE_SIZE),
            width: None,
            progress: Arc::new(NoOpProgress),
            cancellation: None,
            batch_size: 1,
            #[cfg(feature = "rayon")]
            parallel: false,
        }
    }

    /// Directory the GIF artifacts are written to. Created on demand.
    #[must_use]
    pub fn with_output_directory<P: AsRef<Path>>(mut self, directory: P) -> Self {
        self.output_directory = directory.as_ref().to_path_buf();
        self
    }

    /// Reject source files larger than `limit` bytes. `None` disables the
    /// check.
    #[must_use]
    pub fn with_max_source_size(mut self, limit: Option<u64>) -> Self {
        self.max_source_size = limit;
        self
    }

    /// Scale every sampled frame to `width` pixels, preserving the aspect
    /// ratio.
    #[must_use]
    pub fn with_width(mut self, width: u32) -> Self {
        self.width = Some(width.max(1));
        self
    }

    /// Attach a progress observer.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// Attach a cancellation token.
    ///
    /// When the token is cancelled, sampling stops before the next frame
    /// and the conversion fails with
    /// [`ClipError::Cancelled`](crate::ClipError::Cancelled).
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Set how often the progress callback fires (every N frames).
    /// Clamped to a minimum of 1.
    #[must_use]
    pub fn with_batch_size(mut self, size: u64) -> Self {
        self.batch_size = size.max(1);
        self
    }

    /// Fetch frames on the rayon thread pool, one decoder per worker.
    ///
    /// Only honoured by path-based conversions, since each worker has to
    /// open the file itself. See
    /// [`Converter::run_parallel`](crate::Converter::run_parallel) for other
    /// sources.
    #[cfg(feature = "rayon")]
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Where artifacts are written.
    pub fn output_directory(&self) -> &Path {
        &self.output_directory
    }

    /// Configured source size limit.
    pub fn max_source_size(&self) -> Option<u64> {
        self.max_source_size
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(|token| token.is_cancelled())
    }

    /// Apply the configured output width to a sampled frame.
    pub(crate) fn scale(&self, image: DynamicImage) -> DynamicImage {
        let Some(width) = self.width else {
            return image;
        };
        if image.width() == width {
            return image;
        }
        let (width, height) = scaled_dimensions(image.width(), image.height(), width);
        image.resize_exact(width, height, FilterType::Triangle)
    }
}

/// Dimensions of a `source_width`×`source_height` frame scaled to
/// `target_width`, keeping the aspect ratio. Never returns a zero side.
pub(crate) fn scaled_dimensions(source_width: u32, source_height: u32, target_width: u32) -> (u32, u32) {
    if source_width == 0 {
        return (target_width.max(1), source_height.max(1));
    }
    let ratio = target_width as f64 / source_width as f64;
    let height = (source_height as f64 * ratio).round() as u32;
    (target_width.max(1), height.max(1))
}
