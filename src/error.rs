//! Error types for the `clipgif` crate.
//!
//! This module defines [`ClipError`], the unified error type returned by all
//! fallible operations in the crate, and [`ErrorKind`], the coarse category a
//! caller can branch on when translating a failure into user-facing messaging.

use std::{error::Error as StdError, io::Error as IoError, path::PathBuf, time::Duration};

use ffmpeg_next::Error as FfmpegError;
use gif::EncodingError;
use thiserror::Error;

/// Boxed underlying cause carried by [`ClipError::EncodeFailure`].
pub type BoxedCause = Box<dyn StdError + Send + Sync + 'static>;

/// The unified error type for all `clipgif` operations.
///
/// Every failure of a conversion is terminal: nothing is retried and no
/// partial output is kept. Variants carry enough context to diagnose the
/// problem without additional logging at the call site.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClipError {
    /// The requested start time is at or after the end of the source.
    #[error("Invalid window: start {start:?} is not before the source end {source_duration:?}")]
    InvalidWindow {
        /// Requested start of the clip.
        start: Duration,
        /// Decodable duration of the source.
        source_duration: Duration,
    },

    /// A frame could not be fetched from the source. The whole sampling
    /// operation fails; no partial frame sequence is returned.
    #[error("Failed to decode frame{}: {reason}", .timestamp.map(|t| format!(" at {t:?}")).unwrap_or_default())]
    DecodeFailure {
        /// Capture timestamp that failed, when known.
        timestamp: Option<Duration>,
        /// Underlying reason reported by the decoder.
        reason: String,
    },

    /// Sampling produced no frames, so there is nothing to encode.
    #[error("No frames were sampled: the sample interval is not shorter than the clip window")]
    EmptyFrameSequence,

    /// The encode collaborator failed.
    #[error("GIF encoding failed: {reason}")]
    EncodeFailure {
        /// What the adapter was doing when the encoder failed.
        reason: String,
        /// The encoder's own error, if one was produced.
        #[source]
        source: Option<BoxedCause>,
    },

    /// A request parameter is outside its valid domain.
    #[error("Invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Name of the offending parameter.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// The source file could not be opened by the decoder.
    #[error("Failed to open media file at {path}: {reason}")]
    FileOpen {
        /// Path that was passed to [`crate::MediaFile::open`].
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The source file exceeds the configured size limit.
    #[error("Source file {path} is {size} bytes, larger than the {limit} byte limit")]
    FileTooLarge {
        /// Path of the rejected file.
        path: PathBuf,
        /// Actual size on disk.
        size: u64,
        /// Configured limit.
        limit: u64,
    },

    /// The file does not contain a video stream.
    #[error("No video stream found in file")]
    NoVideoStream,

    /// The operation was cancelled via a [`CancellationToken`](crate::CancellationToken).
    #[error("Operation cancelled")]
    Cancelled,

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),
}

/// Coarse category of a [`ClipError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// See [`ClipError::InvalidWindow`].
    InvalidWindow,
    /// See [`ClipError::DecodeFailure`], also used for open failures.
    DecodeFailure,
    /// See [`ClipError::EmptyFrameSequence`].
    EmptyFrameSequence,
    /// See [`ClipError::EncodeFailure`].
    EncodeFailure,
    /// Rejected input: bad parameter, oversized or missing file.
    InvalidInput,
    /// Filesystem failure outside the encoder.
    Io,
    /// Cancelled by the caller.
    Cancelled,
}

impl ClipError {
    /// The category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClipError::InvalidWindow { .. } => ErrorKind::InvalidWindow,
            ClipError::DecodeFailure { .. }
            | ClipError::FileOpen { .. }
            | ClipError::NoVideoStream => ErrorKind::DecodeFailure,
            ClipError::EmptyFrameSequence => ErrorKind::EmptyFrameSequence,
            ClipError::EncodeFailure { .. } => ErrorKind::EncodeFailure,
            ClipError::InvalidParameter { .. } | ClipError::FileTooLarge { .. } => {
                ErrorKind::InvalidInput
            }
            ClipError::Cancelled => ErrorKind::Cancelled,
            ClipError::IoError(_) => ErrorKind::Io,
        }
    }

    /// Build a [`ClipError::EncodeFailure`] that keeps `cause` attached.
    pub fn encode_failure<E>(reason: impl Into<String>, cause: E) -> Self
    where
        E: Into<BoxedCause>,
    {
        ClipError::EncodeFailure {
            reason: reason.into(),
            source: Some(cause.into()),
        }
    }

    pub(crate) fn decode_failure(timestamp: Option<Duration>, reason: impl Into<String>) -> Self {
        ClipError::DecodeFailure {
            timestamp,
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_parameter(name: &'static str, reason: impl Into<String>) -> Self {
        ClipError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

impl From<FfmpegError> for ClipError {
    fn from(error: FfmpegError) -> Self {
        ClipError::decode_failure(None, error.to_string())
    }
}

impl From<EncodingError> for ClipError {
    fn from(error: EncodingError) -> Self {
        ClipError::encode_failure("encoder rejected the frame data", error)
    }
}
