//! Internal utility functions.
//!
//! Helpers for pixel-data copying and timestamp conversion between
//! [`Duration`], stream time bases and FFmpeg's seek time base.

use std::time::Duration;

use ffmpeg_next::{Rational, frame::Video as VideoFrame};

/// Microseconds per second, FFmpeg's `AV_TIME_BASE`.
const SEEK_TIME_BASE: f64 = 1_000_000.0;

/// Copy pixel data from an FFmpeg video frame into a tightly-packed buffer.
///
/// FFmpeg frames frequently carry per-row padding (stride > width × bpp).
/// `bytes_per_pixel` is 4 for the RGBA frames this crate decodes.
pub(crate) fn frame_to_buffer(
    video_frame: &VideoFrame,
    width: u32,
    height: u32,
    bytes_per_pixel: usize,
) -> Vec<u8> {
    let stride = video_frame.stride(0);
    let row_length = (width as usize) * bytes_per_pixel;
    let data = video_frame.data(0);

    if stride == row_length {
        data[..row_length * (height as usize)].to_vec()
    } else {
        let mut buffer = Vec::with_capacity(row_length * (height as usize));
        for row in 0..(height as usize) {
            let row_start = row * stride;
            buffer.extend_from_slice(&data[row_start..row_start + row_length]);
        }
        buffer
    }
}

/// Rescale a PTS value from stream time base to seconds.
pub(crate) fn pts_to_seconds(pts: i64, time_base: Rational) -> f64 {
    pts as f64 * time_base.numerator() as f64 / time_base.denominator() as f64
}

/// Convert a position in seconds to a container seek timestamp.
///
/// `input_context.seek()` seeks with `stream_index = -1`, which expects
/// AV_TIME_BASE (microsecond) units.
pub(crate) fn seconds_to_seek_timestamp(seconds: f64) -> i64 {
    (seconds * SEEK_TIME_BASE) as i64
}

/// Convert a non-negative, finite number of seconds to a [`Duration`],
/// saturating to zero for anything else.
pub(crate) fn seconds_to_duration(seconds: f64) -> Duration {
    Duration::try_from_secs_f64(seconds).unwrap_or(Duration::ZERO)
}
