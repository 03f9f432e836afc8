//! Quality presets and the encoder options they map to.
//!
//! The table is a process-wide constant: [`Quality::Best`] asks for the most
//! accurate palette and every other preset uses the encoder defaults. The `palette_size` and
//! `dithering` slots are reserved for size/quality tuning and are `None` in
//! every baseline entry.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use crate::error::ClipError;

/// NeuQuant sampling speed the `gif` crate uses when no preference is given.
pub const DEFAULT_QUANTIZER_SPEED: i32 = 10;

/// NeuQuant sampling speed for the most accurate palette (every pixel sampled).
pub const EXHAUSTIVE_QUANTIZER_SPEED: i32 = 1;

/// Named quality preset selected by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Quality {
    /// Most accurate palette (every pixel sampled). Slowest, largest files.
    #[default]
    Best,
    /// Encoder defaults.
    Good,
    /// Encoder defaults.
    Medium,
    /// Encoder defaults.
    Low,
}

impl Quality {
    /// Every preset, best first.
    pub const ALL: [Quality; 4] = [Quality::Best, Quality::Good, Quality::Medium, Quality::Low];

    /// Look up the encoder options for this preset.
    pub fn profile(self) -> &'static QualityProfile {
        &QUALITY_PROFILES[self as usize]
    }

    /// Canonical lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Quality::Best => "best",
            Quality::Good => "good",
            Quality::Medium => "medium",
            Quality::Low => "low",
        }
    }
}

impl Display for Quality {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.name())
    }
}

impl FromStr for Quality {
    type Err = ClipError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Quality::ALL
            .into_iter()
            .find(|quality| quality.name().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| {
                ClipError::invalid_parameter(
                    "quality",
                    format!("unknown quality '{value}' (expected best, good, medium or low)"),
                )
            })
    }
}

/// Encoder options attached to a [`Quality`] preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualityProfile {
    /// Build each frame's palette from every pixel rather than a sample.
    /// Output is still reduced to 256 colours per frame.
    pub exhaustive_palette: bool,
    /// Maximum palette entries per frame. `None` lets the encoder decide.
    pub palette_size: Option<u16>,
    /// Whether to dither when reducing to the palette. `None` lets the
    /// encoder decide.
    pub dithering: Option<bool>,
}

impl QualityProfile {
    const EXHAUSTIVE: QualityProfile = QualityProfile {
        exhaustive_palette: true,
        palette_size: None,
        dithering: None,
    };

    const DEFAULT: QualityProfile = QualityProfile {
        exhaustive_palette: false,
        palette_size: None,
        dithering: None,
    };

    /// NeuQuant speed handed to [`gif::Frame::from_rgba_speed`].
    pub fn quantizer_speed(&self) -> i32 {
        if self.exhaustive_palette {
            EXHAUSTIVE_QUANTIZER_SPEED
        } else {
            DEFAULT_QUANTIZER_SPEED
        }
    }
}

/// Indexed by `Quality as usize`.
static QUALITY_PROFILES: [QualityProfile; 4] = [
    QualityProfile::EXHAUSTIVE,
    QualityProfile::DEFAULT,
    QualityProfile::DEFAULT,
    QualityProfile::DEFAULT,
];
