//! The encoder adapter.
//!
//! Turns a [`FrameSequence`] into GIF bytes through a [`FrameEncoder`], and
//! manages the on-disk artifact. [`GifEncoder`] is the production encoder,
//! built on the `gif` crate's NeuQuant quantiser.
//!
//! The adapter owns three policies the encoder itself does not:
//!
//! - an empty sequence is rejected before the encoder is ever invoked;
//! - the playback rate is handed over as `1 / playback_interval` fps;
//! - an artifact only appears on disk once encoding fully succeeded.
//!
//! # Example
//!
//! ```no_run
//! use clipgif::{ClipError, ConversionRequest, EncodeSettings, FrameSequence, GifEncoder};
//!
//! # fn frames() -> FrameSequence { FrameSequence::new() }
//! let settings = EncodeSettings::for_request(&ConversionRequest::default());
//! let bytes = clipgif::encode::encode_to_memory(&GifEncoder, frames(), &settings)?;
//! # Ok::<(), ClipError>(())
//! ```

use std::{
    fs::{self, File},
    io::{BufWriter, ErrorKind as IoErrorKind, Write},
    path::{Path, PathBuf},
};

use gif::{Encoder, Frame, Repeat as GifRepeat};
use image::imageops::FilterType;

use crate::{
    error::ClipError,
    quality::QualityProfile,
    request::{ConversionRequest, Repeat},
    sampler::FrameSequence,
};

/// Loop directive handed to the encoder.
///
/// Two-valued on purpose: arbitrary repeat counts are not part of the
/// conversion contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoopFlag {
    /// Loop forever (loop count 0).
    Infinite,
    /// Single playthrough (loop count 1).
    Once,
}

impl LoopFlag {
    /// Loop count in the NETSCAPE2.0 convention, where 0 means forever.
    pub fn loop_count(self) -> u16 {
        match self {
            LoopFlag::Infinite => 0,
            LoopFlag::Once => 1,
        }
    }

    pub(crate) fn to_gif_repeat(self) -> GifRepeat {
        match self.loop_count() {
            0 => GifRepeat::Infinite,
            count => GifRepeat::Finite(count),
        }
    }
}

impl From<Repeat> for LoopFlag {
    fn from(repeat: Repeat) -> Self {
        match repeat {
            Repeat::Loop => LoopFlag::Infinite,
            Repeat::PlayOnce => LoopFlag::Once,
        }
    }
}

/// Everything an encoder needs besides the frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncodeSettings {
    /// Output frame rate.
    pub frames_per_second: f64,
    /// Loop directive.
    pub loop_flag: LoopFlag,
    /// Quality options from the static table.
    pub profile: QualityProfile,
}

impl EncodeSettings {
    /// Derive encoder settings from a request.
    pub fn for_request(request: &ConversionRequest) -> Self {
        Self {
            frames_per_second: request.frames_per_second(),
            loop_flag: request.repeat().into(),
            profile: *request.quality().profile(),
        }
    }

    /// Per-frame delay in the GIF's hundredths of a second.
    ///
    /// `round(100 / fps)`, clamped to `1..=u16::MAX`. GIF cannot express
    /// delays finer than 10 ms.
    pub fn frame_delay(&self) -> u16 {
        let delay = (100.0 / self.frames_per_second).round();
        if delay.is_nan() {
            return 1;
        }
        delay.clamp(1.0, u16::MAX as f64) as u16
    }
}

/// The encode collaborator.
pub trait FrameEncoder {
    /// Encode `frames` into `output`.
    ///
    /// Callers guarantee `frames` is non-empty.
    ///
    /// # Errors
    ///
    /// Returns [`ClipError::EncodeFailure`] with the underlying cause.
    fn encode(
        &self,
        frames: &FrameSequence,
        settings: &EncodeSettings,
        output: &mut dyn Write,
    ) -> Result<(), ClipError>;
}

/// Animated GIF encoder backed by the `gif` crate.
///
/// Every frame is scaled to the first frame's dimensions and quantised to a
/// 256-colour palette at the speed the quality profile asks for.
#[derive(Debug, Clone, Copy, Default)]
pub struct GifEncoder;

impl FrameEncoder for GifEncoder {
    fn encode(
        &self,
        frames: &FrameSequence,
        settings: &EncodeSettings,
        output: &mut dyn Write,
    ) -> Result<(), ClipError> {
        let first = frames.frames().first().ok_or(ClipError::EmptyFrameSequence)?;
        let width = gif_dimension("width", first.width())?;
        let height = gif_dimension("height", first.height())?;
        let delay = settings.frame_delay();
        let speed = settings.profile.quantizer_speed();

        log::debug!(
            "Encoding {} frames as {width}x{height} GIF (delay={delay}, speed={speed}, loop={:?})",
            frames.len(),
            settings.loop_flag,
        );

        let mut encoder = Encoder::new(output, width, height, &[])
            .map_err(|error| ClipError::encode_failure("failed to create GIF encoder", error))?;
        encoder
            .set_repeat(settings.loop_flag.to_gif_repeat())
            .map_err(|error| ClipError::encode_failure("failed to set GIF repeat", error))?;

        for image in frames.frames() {
            let rgba = if image.width() == u32::from(width) && image.height() == u32::from(height) {
                image.to_rgba8()
            } else {
                image
                    .resize_exact(u32::from(width), u32::from(height), FilterType::Triangle)
                    .to_rgba8()
            };
            let mut pixels = rgba.into_raw();

            let mut gif_frame = Frame::from_rgba_speed(width, height, &mut pixels, speed);
            gif_frame.delay = delay;

            encoder
                .write_frame(&gif_frame)
                .map_err(|error| ClipError::encode_failure("failed to write GIF frame", error))?;
        }

        encoder
            .into_inner()
            .map_err(|error| ClipError::encode_failure("failed to finish GIF stream", error))?;
        Ok(())
    }
}

fn gif_dimension(name: &str, value: u32) -> Result<u16, ClipError> {
    u16::try_from(value).map_err(|_| ClipError::EncodeFailure {
        reason: format!("frame {name} {value} exceeds the GIF limit of {}", u16::MAX),
        source: None,
    })
}

/// A finished GIF on disk, owned by the caller.
///
/// Dropping the value leaves the file in place; call
/// [`cleanup`](OutputArtifact::cleanup) to remove it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "the artifact stays on disk until `cleanup` is called"]
pub struct OutputArtifact {
    path: PathBuf,
    size: u64,
    frame_count: usize,
}

impl OutputArtifact {
    /// Location of the GIF.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Size of the GIF in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Number of frames encoded.
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Read the GIF bytes back.
    ///
    /// # Errors
    ///
    /// Returns [`ClipError::IoError`] if the file cannot be read.
    pub fn read(&self) -> Result<Vec<u8>, ClipError> {
        Ok(fs::read(&self.path)?)
    }

    /// Delete the GIF. Succeeds if it is already gone.
    ///
    /// # Errors
    ///
    /// Returns [`ClipError::IoError`] if the file exists but cannot be
    /// removed.
    pub fn cleanup(self) -> Result<(), ClipError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                log::debug!("Removed artifact {}", self.path.display());
                Ok(())
            }
            Err(error) if error.kind() == IoErrorKind::NotFound => Ok(()),
            Err(error) => Err(error.into()),
        }
    }

    /// Give up the handle, keeping the file.
    pub fn into_path(self) -> PathBuf {
        self.path
    }
}

/// Readable prefix for an artifact's file name, from the request's start
/// and duration truncated to whole seconds.
///
/// Not unique on its own: [`encode_to_file`] appends a random suffix.
pub fn output_name_prefix(request: &ConversionRequest) -> String {
    format!(
        "output_{}_{}_",
        request.start_time().as_secs(),
        request.duration().as_secs()
    )
}

/// Encode `frames` into memory.
///
/// # Errors
///
/// - [`ClipError::EmptyFrameSequence`] if `frames` is empty; the encoder
///   is not invoked.
/// - Any error from the encoder.
pub fn encode_to_memory<E: FrameEncoder + ?Sized>(
    encoder: &E,
    frames: FrameSequence,
    settings: &EncodeSettings,
) -> Result<Vec<u8>, ClipError> {
    if frames.is_empty() {
        return Err(ClipError::EmptyFrameSequence);
    }

    let mut buffer = Vec::new();
    encoder.encode(&frames, settings, &mut buffer)?;
    log::debug!("Encoded {} frames to {} bytes in memory", frames.len(), buffer.len());
    Ok(buffer)
}

/// Encode `frames` into a new, uniquely named file in `directory`.
///
/// The file is written through a temporary handle that is deleted on every
/// failure path; on success it is persisted and handed to the caller.
///
/// # Errors
///
/// - [`ClipError::EmptyFrameSequence`] if `frames` is empty; the encoder
///   is not invoked and nothing is created.
/// - [`ClipError::IoError`] if the directory or file cannot be created.
/// - Any error from the encoder.
pub fn encode_to_file<E: FrameEncoder + ?Sized>(
    encoder: &E,
    frames: FrameSequence,
    settings: &EncodeSettings,
    directory: &Path,
    name_prefix: &str,
) -> Result<OutputArtifact, ClipError> {
    if frames.is_empty() {
        return Err(ClipError::EmptyFrameSequence);
    }

    fs::create_dir_all(directory)?;
    let temporary = tempfile::Builder::new()
        .prefix(name_prefix)
        .suffix(".gif")
        .tempfile_in(directory)?;

    {
        let mut writer = BufWriter::new(temporary.as_file());
        encoder.encode(&frames, settings, &mut writer)?;
        writer.flush()?;
    }

    let (file, path) = temporary.keep().map_err(|error| ClipError::IoError(error.error))?;
    let size = file_size(&file)?;

    log::info!(
        "Wrote {} frames ({size} bytes) to {}",
        frames.len(),
        path.display()
    );

    Ok(OutputArtifact {
        path,
        size,
        frame_count: frames.len(),
    })
}

fn file_size(file: &File) -> Result<u64, ClipError> {
    Ok(file.metadata()?.len())
}
