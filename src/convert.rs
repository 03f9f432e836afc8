//! The conversion entry points.
//!
//! A conversion walks `Received → Validated → Sampled → Encoded →
//! Delivered`, reporting each transition to the configured
//! [`ProgressCallback`](crate::ProgressCallback). The first failure ends the
//! walk with `Failed`; everything produced so far is dropped and any
//! half-written output file is removed.

use std::path::Path;

use crate::{
    configuration::ConvertOptions,
    encode::{self, EncodeSettings, FrameEncoder, GifEncoder, OutputArtifact},
    error::ClipError,
    media::MediaFile,
    progress::ConversionStage,
    request::ConversionRequest,
    sampler::{self, FrameSequence, SampleWindow},
    source::VideoSource,
    validation,
};

/// Runs conversions with a fixed encoder and options.
///
/// Holds no per-request state, so one converter can serve any number of
/// requests, including concurrently from several threads when `E` is
/// `Sync`.
///
/// # Example
///
/// ```no_run
/// use clipgif::{ClipError, ConversionRequest, ConvertOptions, Converter, Quality, Repeat};
///
/// let converter = Converter::new(ConvertOptions::new().with_width(320));
/// let request = ConversionRequest::from_secs(0.0, 3.0, 0.5, 0.2)?
///     .with_quality(Quality::Good)
///     .with_repeat(Repeat::Loop);
///
/// let artifact = converter.convert_path("input.mp4", &request)?;
/// println!("{} bytes at {}", artifact.size(), artifact.path().display());
/// artifact.cleanup()?;
/// # Ok::<(), ClipError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Converter<E = GifEncoder> {
    encoder: E,
    options: ConvertOptions,
}

impl Converter<GifEncoder> {
    /// A converter producing GIFs with the `gif` crate.
    pub fn new(options: ConvertOptions) -> Self {
        Self::with_encoder(GifEncoder, options)
    }
}

impl Default for Converter<GifEncoder> {
    fn default() -> Self {
        Self::new(ConvertOptions::default())
    }
}

impl<E: FrameEncoder> Converter<E> {
    /// A converter using a custom encode collaborator.
    pub fn with_encoder(encoder: E, options: ConvertOptions) -> Self {
        Self { encoder, options }
    }

    /// The options this converter runs with.
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Convert the video at `path`.
    ///
    /// Checks the file against the size limit, opens it with FFmpeg, and
    /// runs [`run`](Converter::run). The decoder is closed before this
    /// returns, on every path.
    ///
    /// # Errors
    ///
    /// Everything [`run`](Converter::run) returns, plus
    /// [`ClipError::FileTooLarge`], [`ClipError::FileOpen`] and
    /// [`ClipError::NoVideoStream`].
    pub fn convert_path<P: AsRef<Path>>(
        &self,
        path: P,
        request: &ConversionRequest,
    ) -> Result<OutputArtifact, ClipError> {
        let path = path.as_ref();
        self.stage(ConversionStage::Received);

        let result = self.convert_path_stages(path, request);
        self.observe_failure(&result);
        result
    }

    fn convert_path_stages(
        &self,
        path: &Path,
        request: &ConversionRequest,
    ) -> Result<OutputArtifact, ClipError> {
        validation::validate_source_file(path, self.options.max_source_size)?;

        #[cfg(feature = "rayon")]
        if self.options.parallel {
            return self.parallel_stages(|| MediaFile::open(path), request);
        }

        let mut source = MediaFile::open(path)?;
        self.run_stages(&mut source, request)
    }

    /// Convert with frames fetched on the rayon thread pool.
    ///
    /// `open` is called once to resolve the window and once per worker;
    /// every call must yield an independent source for the same video.
    /// Reports the same stages as [`run`](Converter::run).
    ///
    /// # Errors
    ///
    /// Same as [`run`](Converter::run), plus any error from `open`.
    #[cfg(feature = "rayon")]
    pub fn run_parallel<S, F>(
        &self,
        open: F,
        request: &ConversionRequest,
    ) -> Result<OutputArtifact, ClipError>
    where
        S: VideoSource,
        F: Fn() -> Result<S, ClipError> + Sync,
    {
        self.stage(ConversionStage::Received);

        let result = self.parallel_stages(open, request);
        self.observe_failure(&result);
        result
    }

    #[cfg(feature = "rayon")]
    fn parallel_stages<S, F>(
        &self,
        open: F,
        request: &ConversionRequest,
    ) -> Result<OutputArtifact, ClipError>
    where
        S: VideoSource,
        F: Fn() -> Result<S, ClipError> + Sync,
    {
        let window = self.validate(&open()?, request)?;
        let frames = crate::rayon::sample_parallel(&window, &self.options, open)?;
        self.sampled(frames.len());
        self.deliver(frames, request)
    }

    /// Convert from an already-open source.
    ///
    /// The source is only borrowed; the caller keeps ownership and closes
    /// it.
    ///
    /// # Errors
    ///
    /// - [`ClipError::InvalidWindow`] if the start is not before the source
    ///   end.
    /// - [`ClipError::DecodeFailure`] if any frame fetch fails.
    /// - [`ClipError::EmptyFrameSequence`] if the window samples no frames.
    /// - [`ClipError::EncodeFailure`] if the encoder fails.
    /// - [`ClipError::Cancelled`] if the options' token is cancelled.
    pub fn run<S: VideoSource + ?Sized>(
        &self,
        source: &mut S,
        request: &ConversionRequest,
    ) -> Result<OutputArtifact, ClipError> {
        self.stage(ConversionStage::Received);

        let result = self.run_stages(source, request);
        self.observe_failure(&result);
        result
    }

    /// Like [`run`](Converter::run), but returns the GIF bytes instead of
    /// writing a file. Reports no `Delivered` stage.
    ///
    /// # Errors
    ///
    /// Same as [`run`](Converter::run), minus file-system errors.
    pub fn run_to_memory<S: VideoSource + ?Sized>(
        &self,
        source: &mut S,
        request: &ConversionRequest,
    ) -> Result<Vec<u8>, ClipError> {
        self.stage(ConversionStage::Received);

        let result = self.memory_stages(source, request);
        self.observe_failure(&result);
        result
    }

    fn memory_stages<S: VideoSource + ?Sized>(
        &self,
        source: &mut S,
        request: &ConversionRequest,
    ) -> Result<Vec<u8>, ClipError> {
        let window = self.validate(&*source, request)?;
        let frames = self.sample(source, &window)?;
        let bytes =
            encode::encode_to_memory(&self.encoder, frames, &EncodeSettings::for_request(request))?;
        self.stage(ConversionStage::Encoded {
            bytes: bytes.len() as u64,
        });
        Ok(bytes)
    }

    fn run_stages<S: VideoSource + ?Sized>(
        &self,
        source: &mut S,
        request: &ConversionRequest,
    ) -> Result<OutputArtifact, ClipError> {
        let window = self.validate(&*source, request)?;
        let frames = self.sample(source, &window)?;
        self.deliver(frames, request)
    }

    fn validate<S: VideoSource + ?Sized>(
        &self,
        source: &S,
        request: &ConversionRequest,
    ) -> Result<SampleWindow, ClipError> {
        let window = SampleWindow::for_request(request, source.duration())?;
        self.stage(ConversionStage::Validated {
            planned_frames: window.len(),
            truncated: window.is_truncated(),
        });
        Ok(window)
    }

    fn sample<S: VideoSource + ?Sized>(
        &self,
        source: &mut S,
        window: &SampleWindow,
    ) -> Result<FrameSequence, ClipError> {
        let frames = sampler::sample(source, window, &self.options)?;
        self.sampled(frames.len());
        Ok(frames)
    }

    fn sampled(&self, frame_count: usize) {
        self.stage(ConversionStage::Sampled { frame_count });
    }

    fn deliver(
        &self,
        frames: FrameSequence,
        request: &ConversionRequest,
    ) -> Result<OutputArtifact, ClipError> {
        let artifact = encode::encode_to_file(
            &self.encoder,
            frames,
            &EncodeSettings::for_request(request),
            &self.options.output_directory,
            &encode::output_name_prefix(request),
        )?;

        self.stage(ConversionStage::Encoded {
            bytes: artifact.size(),
        });
        self.stage(ConversionStage::Delivered {
            path: artifact.path().to_path_buf(),
        });
        Ok(artifact)
    }

    fn stage(&self, stage: ConversionStage) {
        log::debug!("Conversion stage: {stage:?}");
        self.options.progress.on_stage(&stage);
    }

    fn observe_failure<T>(&self, result: &Result<T, ClipError>) {
        if let Err(error) = result {
            log::error!("Error converting video to GIF: {error}");
            self.stage(ConversionStage::Failed {
                kind: error.kind(),
                message: error.to_string(),
            });
        }
    }
}

/// Convert the video at `path` with default options.
///
/// Writes the GIF under `<temp>/temp_gifs` and returns its handle. The
/// caller owns the file and is responsible for
/// [`cleanup`](OutputArtifact::cleanup).
///
/// # Errors
///
/// See [`Converter::convert_path`].
///
/// # Example
///
/// ```no_run
/// use clipgif::{ClipError, ConversionRequest, Quality, Repeat};
///
/// let request = ConversionRequest::from_secs(2.0, 4.0, 0.25, 0.1)?
///     .with_quality(Quality::Best)
///     .with_repeat(Repeat::Loop);
/// let artifact = clipgif::convert("input.mp4", &request)?;
/// let bytes = artifact.read()?;
/// artifact.cleanup()?;
/// # Ok::<(), ClipError>(())
/// ```
pub fn convert<P: AsRef<Path>>(
    path: P,
    request: &ConversionRequest,
) -> Result<OutputArtifact, ClipError> {
    Converter::default().convert_path(path, request)
}

/// Convert the video at `path` with explicit options.
///
/// # Errors
///
/// See [`Converter::convert_path`].
pub fn convert_with_options<P: AsRef<Path>>(
    path: P,
    request: &ConversionRequest,
    options: &ConvertOptions,
) -> Result<OutputArtifact, ClipError> {
    Converter::new(options.clone()).convert_path(path, request)
}
