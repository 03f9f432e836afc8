//! Conversion parameters.
//!
//! [`ConversionRequest`] bundles the clip window, the two cadences, and the
//! output policy for one conversion. It is validated for internal sanity on
//! construction; whether the window fits the source is only known once the
//! source is open, and is checked by the sampler.
//!
//! # Example
//!
//! ```
//! use clipgif::{ClipError, ConversionRequest, Quality, Repeat};
//!
//! let request = ConversionRequest::from_secs(1.5, 3.0, 0.5, 0.2)?
//!     .with_quality(Quality::Medium)
//!     .with_repeat(Repeat::Loop);
//! assert_eq!(request.frames_per_second(), 5.0);
//! # Ok::<(), ClipError>(())
//! ```

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
    time::Duration,
};

use crate::{error::ClipError, quality::Quality};

/// Whether the output animation repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Repeat {
    /// Loop forever.
    Loop,
    /// Play through a single time.
    #[default]
    PlayOnce,
}

impl Display for Repeat {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Repeat::Loop => f.write_str("loop"),
            Repeat::PlayOnce => f.write_str("once"),
        }
    }
}

impl FromStr for Repeat {
    type Err = ClipError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "loop" | "repeat" => Ok(Repeat::Loop),
            "once" | "play-once" | "no-repeat" | "no repeat" => Ok(Repeat::PlayOnce),
            _ => Err(ClipError::invalid_parameter(
                "repeat",
                format!("unknown repeat mode '{value}' (expected loop or once)"),
            )),
        }
    }
}

/// Everything needed to turn a source video into one GIF.
///
/// Immutable once built: the `with_*` methods consume and return a new value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionRequest {
    start_time: Duration,
    duration: Duration,
    sample_interval: Duration,
    playback_interval: Duration,
    quality: Quality,
    repeat: Repeat,
}

impl Default for ConversionRequest {
    fn default() -> Self {
        Self {
            start_time: Duration::ZERO,
            duration: Duration::from_secs(3),
            sample_interval: Duration::from_millis(500),
            playback_interval: Duration::from_millis(200),
            quality: Quality::default(),
            repeat: Repeat::default(),
        }
    }
}

impl ConversionRequest {
    /// Create a request from exact durations.
    ///
    /// # Errors
    ///
    /// Returns [`ClipError::InvalidParameter`] if `duration`,
    /// `sample_interval` or `playback_interval` is zero.
    pub fn new(
        start_time: Duration,
        duration: Duration,
        sample_interval: Duration,
        playback_interval: Duration,
    ) -> Result<Self, ClipError> {
        require_positive("duration", duration)?;
        require_positive("sample_interval", sample_interval)?;
        require_positive("playback_interval", playback_interval)?;

        Ok(Self {
            start_time,
            duration,
            sample_interval,
            playback_interval,
            ..Self::default()
        })
    }

    /// Create a request from floating-point seconds.
    ///
    /// # Errors
    ///
    /// Returns [`ClipError::InvalidParameter`] for negative, NaN or infinite
    /// values, and for a zero `duration` or interval.
    pub fn from_secs(
        start_time: f64,
        duration: f64,
        sample_interval: f64,
        playback_interval: f64,
    ) -> Result<Self, ClipError> {
        Self::new(
            seconds("start_time", start_time)?,
            seconds("duration", duration)?,
            seconds("sample_interval", sample_interval)?,
            seconds("playback_interval", playback_interval)?,
        )
    }

    /// Set the quality preset.
    #[must_use]
    pub fn with_quality(mut self, quality: Quality) -> Self {
        self.quality = quality;
        self
    }

    /// Set the repeat policy.
    #[must_use]
    pub fn with_repeat(mut self, repeat: Repeat) -> Self {
        self.repeat = repeat;
        self
    }

    /// Offset into the source where the clip begins.
    pub fn start_time(&self) -> Duration {
        self.start_time
    }

    /// Requested clip length. May be cut short by the end of the source.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Gap between captured frames.
    pub fn sample_interval(&self) -> Duration {
        self.sample_interval
    }

    /// How long each captured frame is shown in the output.
    pub fn playback_interval(&self) -> Duration {
        self.playback_interval
    }

    /// Output frame rate, the inverse of the playback interval.
    pub fn frames_per_second(&self) -> f64 {
        1.0 / self.playback_interval.as_secs_f64()
    }

    /// Quality preset.
    pub fn quality(&self) -> Quality {
        self.quality
    }

    /// Repeat policy.
    pub fn repeat(&self) -> Repeat {
        self.repeat
    }
}

fn require_positive(name: &'static str, value: Duration) -> Result<(), ClipError> {
    if value.is_zero() {
        return Err(ClipError::invalid_parameter(name, "must be greater than zero"));
    }
    Ok(())
}

fn seconds(name: &'static str, value: f64) -> Result<Duration, ClipError> {
    Duration::try_from_secs_f64(value).map_err(|error| {
        ClipError::invalid_parameter(name, format!("{value} is not a valid number of seconds: {error}"))
    })
}
