//! The decode collaborator.
//!
//! The sampler only needs two things from a video: how long it is, and the
//! image shown at a given instant. [`VideoSource`] captures exactly that, so
//! the conversion engine can run against [`MediaFile`](crate::MediaFile) in
//! production and against in-memory frames in tests.

use std::time::Duration;

use image::DynamicImage;

use crate::error::ClipError;

/// A decodable video with a known duration.
///
/// Implementations must accept any timestamp in `[0, duration)`, in any
/// order. Closing happens on drop.
pub trait VideoSource {
    /// Decodable length of the video.
    fn duration(&self) -> Duration;

    /// Decode the frame displayed at `timestamp`.
    ///
    /// Takes `&mut self` because decoders carry seek state; the logical
    /// source is never changed.
    ///
    /// # Errors
    ///
    /// Returns [`ClipError::DecodeFailure`] if no frame can be produced.
    fn frame_at(&mut self, timestamp: Duration) -> Result<DynamicImage, ClipError>;
}

impl<S: VideoSource + ?Sized> VideoSource for &mut S {
    fn duration(&self) -> Duration {
        (**self).duration()
    }

    fn frame_at(&mut self, timestamp: Duration) -> Result<DynamicImage, ClipError> {
        (**self).frame_at(timestamp)
    }
}

impl<S: VideoSource + ?Sized> VideoSource for Box<S> {
    fn duration(&self) -> Duration {
        (**self).duration()
    }

    fn frame_at(&mut self, timestamp: Duration) -> Result<DynamicImage, ClipError> {
        (**self).frame_at(timestamp)
    }
}
