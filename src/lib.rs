//! # clipgif
//!
//! Cut a time window out of a video, resample it at a fixed cadence, and
//! encode the frames as an animated GIF.
//!
//! `clipgif` decodes frames with FFmpeg via the
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next) crate and encodes
//! them with the [`gif`](https://crates.io/crates/gif) crate. Capture
//! cadence and playback speed are independent: a clip sampled every half
//! second and played back every fifth of a second runs 2.5× faster than
//! real time.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clipgif::{ClipError, ConversionRequest, Quality, Repeat};
//!
//! // Three seconds from 1.5 s, one frame every 0.5 s, played at 5 fps.
//! let request = ConversionRequest::from_secs(1.5, 3.0, 0.5, 0.2)?
//!     .with_quality(Quality::Good)
//!     .with_repeat(Repeat::Loop);
//!
//! let artifact = clipgif::convert("input.mp4", &request)?;
//! println!("{} frames, {} bytes", artifact.frame_count(), artifact.size());
//!
//! // The caller owns the file.
//! artifact.cleanup()?;
//! # Ok::<(), ClipError>(())
//! ```
//!
//! ### Bring Your Own Source
//!
//! Anything implementing [`VideoSource`] can be converted, which keeps the
//! pipeline testable without FFmpeg:
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use clipgif::{ClipError, ConversionRequest, Converter, VideoSource};
//! use image::{DynamicImage, RgbaImage};
//!
//! struct Blank(Duration);
//!
//! impl VideoSource for Blank {
//!     fn duration(&self) -> Duration {
//!         self.0
//!     }
//!
//!     fn frame_at(&mut self, _timestamp: Duration) -> Result<DynamicImage, ClipError> {
//!         Ok(DynamicImage::ImageRgba8(RgbaImage::new(32, 32)))
//!     }
//! }
//!
//! let gif = Converter::default()
//!     .run_to_memory(&mut Blank(Duration::from_secs(5)), &ConversionRequest::default())?;
//! # Ok::<(), ClipError>(())
//! ```
//!
//! ## Features
//!
//! - **Window planning**: start, length and cadence resolve to an exact,
//!   drift-free list of capture timestamps, truncated at the source end
//! - **Quality presets**: `Best` (most accurate palette), `Good`, `Medium` and `Low`
//! - **Loop control**: loop forever or play once
//! - **Safe artifacts**: uniquely named files that only appear once encoding
//!   succeeded
//! - **Progress & cancellation**: per-frame callbacks, per-stage events and
//!   a `CancellationToken`
//! - **Scaling**: optional output width with aspect ratio preserved
//!
//! ### Optional Features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `async` | `convert_async` runs a conversion on Tokio's blocking pool |
//! | `rayon` | `sample_parallel`, `Converter::run_parallel` and `ConvertOptions::with_parallel` spread decoding across rayon threads |
//! | `full` | Enables all of the above |
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on your system.

pub mod configuration;
pub mod convert;
pub mod encode;
pub mod error;
pub mod ffmpeg;
#[cfg(feature = "async")]
pub mod future;
pub mod media;
pub mod progress;
pub mod quality;
#[cfg(feature = "rayon")]
mod rayon;
pub mod request;
pub mod sampler;
pub mod source;
mod utilities;
pub mod validation;

pub use configuration::ConvertOptions;
pub use convert::{Converter, convert, convert_with_options};
pub use encode::{EncodeSettings, FrameEncoder, GifEncoder, LoopFlag, OutputArtifact};
pub use error::{ClipError, ErrorKind};
pub use ffmpeg::{ffmpeg_log_level, set_ffmpeg_log_level};
#[cfg(feature = "async")]
pub use future::{ConversionFuture, convert_async};
pub use media::{MediaFile, SourceMetadata};
pub use progress::{
    CancellationToken, ConversionStage, OperationType, ProgressCallback, ProgressInfo,
};
pub use quality::{Quality, QualityProfile};
#[cfg(feature = "rayon")]
pub use crate::rayon::sample_parallel;
pub use request::{ConversionRequest, Repeat};
pub use sampler::{FrameSequence, SampleWindow, Timestamps, sample};
pub use source::VideoSource;
pub use validation::validate_source_file;
