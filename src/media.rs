//! FFmpeg-backed [`VideoSource`].
//!
//! [`MediaFile`] opens a container, picks its best video stream, caches the
//! metadata the sampler needs, and decodes the frame displayed at any
//! requested timestamp. The demuxer is closed when the value is dropped.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    mem,
    path::{Path, PathBuf},
    time::Duration,
};

use ffmpeg_next::{
    Rational,
    codec::context::Context as CodecContext,
    format::{Pixel, context::Input},
    frame::Video as VideoFrame,
    media::Type,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};
use image::{DynamicImage, RgbaImage};

use crate::{
    error::ClipError,
    source::VideoSource,
    utilities::{frame_to_buffer, pts_to_seconds, seconds_to_duration, seconds_to_seek_timestamp},
};

/// Slack when comparing frame positions against a target, in seconds.
const POSITION_TOLERANCE: f64 = 1e-6;

/// Facts about the opened video stream.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceMetadata {
    /// Decodable duration of the container.
    pub duration: Duration,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Average frame rate, or `0.0` if the container doesn't say.
    pub frames_per_second: f64,
    /// Codec name as reported by FFmpeg.
    pub codec: String,
}

/// A video file opened for random-access frame decoding.
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
///
/// use clipgif::{ClipError, MediaFile, VideoSource};
///
/// let mut media = MediaFile::open("input.mp4")?;
/// println!("{:?} long", media.duration());
/// let frame = media.frame_at(Duration::from_millis(1500))?;
/// # Ok::<(), ClipError>(())
/// ```
pub struct MediaFile {
    input_context: Input,
    metadata: SourceMetadata,
    video_stream_index: usize,
    /// Stream start offset in seconds; decoded PTS values include it.
    start_offset: f64,
    file_path: PathBuf,
}

impl Debug for MediaFile {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("MediaFile")
            .field("metadata", &self.metadata)
            .field("video_stream_index", &self.video_stream_index)
            .field("start_offset", &self.start_offset)
            .field("file_path", &self.file_path)
            .finish_non_exhaustive()
    }
}

impl MediaFile {
    /// Open a media file for frame decoding.
    ///
    /// Initializes FFmpeg (idempotent), opens the file, selects the best
    /// video stream and caches its metadata.
    ///
    /// # Errors
    ///
    /// Returns [`ClipError::FileOpen`] if the file cannot be opened or its
    /// codec is unsupported, and [`ClipError::NoVideoStream`] if it has no
    /// video.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ClipError> {
        let file_path = path.as_ref().to_path_buf();
        let open_error = |reason: String| ClipError::FileOpen {
            path: file_path.clone(),
            reason,
        };

        log::debug!("Opening media file: {}", file_path.display());

        ffmpeg_next::init()
            .map_err(|error| open_error(format!("FFmpeg initialisation failed: {error}")))?;

        let input_context =
            ffmpeg_next::format::input(&file_path).map_err(|error| open_error(error.to_string()))?;

        let (video_stream_index, start_offset, metadata) = {
            let stream = input_context
                .streams()
                .best(Type::Video)
                .ok_or(ClipError::NoVideoStream)?;
            let time_base = stream.time_base();

            let decoder = CodecContext::from_parameters(stream.parameters())
                .and_then(|context| context.decoder().video())
                .map_err(|error| open_error(format!("Failed to create video decoder: {error}")))?;

            let frame_rate = stream.avg_frame_rate();
            let frames_per_second = if frame_rate.denominator() != 0 {
                frame_rate.numerator() as f64 / frame_rate.denominator() as f64
            } else {
                0.0
            };

            let start_offset = if stream.start_time() > 0 {
                pts_to_seconds(stream.start_time(), time_base)
            } else {
                0.0
            };

            let metadata = SourceMetadata {
                duration: container_duration(&input_context, stream.duration(), time_base),
                width: decoder.width(),
                height: decoder.height(),
                frames_per_second,
                codec: decoder
                    .codec()
                    .map(|codec| codec.name().to_string())
                    .unwrap_or_else(|| "unknown".to_string()),
            };

            (stream.index(), start_offset, metadata)
        };

        if metadata.duration.is_zero() {
            log::warn!(
                "{} reports no duration; every window will be rejected",
                file_path.display()
            );
        }

        log::info!(
            "Opened media file: {} ({}x{}, {:.2} fps, codec={}, duration={:.2}s)",
            file_path.display(),
            metadata.width,
            metadata.height,
            metadata.frames_per_second,
            metadata.codec,
            metadata.duration.as_secs_f64(),
        );

        Ok(Self {
            input_context,
            metadata,
            video_stream_index,
            start_offset,
            file_path,
        })
    }

    /// Cached stream metadata.
    pub fn metadata(&self) -> &SourceMetadata {
        &self.metadata
    }

    /// Path the file was opened from.
    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Seek to the keyframe before `timestamp` and decode forward to the
    /// frame on screen at that instant.
    fn decode_frame_at(&mut self, timestamp: Duration) -> Result<DynamicImage, ClipError> {
        // Fresh decoder per lookup: no stale reference frames after a seek.
        let (time_base, mut decoder) = {
            let stream = self
                .input_context
                .stream(self.video_stream_index)
                .ok_or(ClipError::NoVideoStream)?;
            let decoder_context = CodecContext::from_parameters(stream.parameters())?;
            (stream.time_base(), decoder_context.decoder().video()?)
        };

        let target = self.start_offset + timestamp.as_secs_f64();
        let seek_timestamp = seconds_to_seek_timestamp(target);
        self.input_context.seek(seek_timestamp, ..seek_timestamp)?;

        let mut selector = FrameSelector::new(target, time_base);
        let mut decoded_frame = VideoFrame::empty();

        for (stream, packet) in self.input_context.packets() {
            if stream.index() != self.video_stream_index {
                continue;
            }

            decoder.send_packet(&packet)?;
            while decoder.receive_frame(&mut decoded_frame).is_ok() {
                selector.offer(&mut decoded_frame);
            }

            if selector.is_done() {
                break;
            }
        }

        if !selector.is_done() {
            decoder.send_eof()?;
            while decoder.receive_frame(&mut decoded_frame).is_ok() {
                selector.offer(&mut decoded_frame);
            }
        }

        let frame = selector.into_frame().ok_or_else(|| {
            ClipError::decode_failure(None, "the decoder produced no frame near this position")
        })?;
        convert_frame_to_image(&frame)
    }
}

impl VideoSource for MediaFile {
    fn duration(&self) -> Duration {
        self.metadata.duration
    }

    fn frame_at(&mut self, timestamp: Duration) -> Result<DynamicImage, ClipError> {
        if timestamp >= self.metadata.duration {
            return Err(ClipError::decode_failure(
                Some(timestamp),
                format!("past the end of the source ({:?})", self.metadata.duration),
            ));
        }

        log::debug!("Decoding frame at {timestamp:?} from {}", self.file_path.display());

        self.decode_frame_at(timestamp).map_err(|error| match error {
            ClipError::DecodeFailure {
                timestamp: None,
                reason,
            } => ClipError::DecodeFailure {
                timestamp: Some(timestamp),
                reason,
            },
            other => other,
        })
    }
}

/// Picks the last frame whose position is at or before the target, falling
/// back to the first frame after it when the seek overshot.
struct FrameSelector {
    target: f64,
    time_base: Rational,
    candidate: Option<VideoFrame>,
    done: bool,
}

impl FrameSelector {
    fn new(target: f64, time_base: Rational) -> Self {
        Self {
            target,
            time_base,
            candidate: None,
            done: false,
        }
    }

    /// Consider a freshly decoded frame. Takes the frame's buffer when it is
    /// kept, leaving an empty frame for the decoder to reuse.
    fn offer(&mut self, decoded_frame: &mut VideoFrame) {
        if self.done {
            return;
        }

        let position = decoded_frame
            .timestamp()
            .or_else(|| decoded_frame.pts())
            .map(|pts| pts_to_seconds(pts, self.time_base));

        match position {
            Some(seconds) if seconds > self.target + POSITION_TOLERANCE => {
                if self.candidate.is_none() {
                    self.candidate = Some(mem::replace(decoded_frame, VideoFrame::empty()));
                }
                self.done = true;
            }
            _ => self.candidate = Some(mem::replace(decoded_frame, VideoFrame::empty())),
        }
    }

    fn is_done(&self) -> bool {
        self.done
    }

    fn into_frame(self) -> Option<VideoFrame> {
        self.candidate
    }
}

/// Container duration, falling back to the stream's own when the container
/// doesn't report one.
fn container_duration(input_context: &Input, stream_duration: i64, time_base: Rational) -> Duration {
    let container_microseconds = input_context.duration();
    if container_microseconds > 0 {
        return Duration::from_micros(container_microseconds as u64);
    }
    if stream_duration > 0 {
        return seconds_to_duration(pts_to_seconds(stream_duration, time_base));
    }
    Duration::ZERO
}

/// Convert a decoded frame of any pixel format to an RGBA image.
fn convert_frame_to_image(frame: &VideoFrame) -> Result<DynamicImage, ClipError> {
    let (width, height) = (frame.width(), frame.height());

    let mut scaler = ScalingContext::get(
        frame.format(),
        width,
        height,
        Pixel::RGBA,
        width,
        height,
        ScalingFlags::BILINEAR,
    )?;
    let mut rgba_frame = VideoFrame::empty();
    scaler.run(frame, &mut rgba_frame)?;

    let buffer = frame_to_buffer(&rgba_frame, width, height, 4);
    let image = RgbaImage::from_raw(width, height, buffer).ok_or_else(|| {
        ClipError::decode_failure(None, "decoded frame data does not match its dimensions")
    })?;
    Ok(DynamicImage::ImageRgba8(image))
}
