//! Shared test doubles.

#![allow(dead_code)]

use std::sync::Mutex;
use std::time::Duration;

use clipgif::{ClipError, ConversionStage, ProgressCallback, ProgressInfo, VideoSource};
use image::{DynamicImage, Rgba, RgbaImage};

pub fn sample_video_path() -> &'static str {
    "tests/fixtures/sample_video.mp4"
}

/// An in-memory video whose frame at `t` is a solid colour derived from
/// `t`. Records every timestamp it is asked for.
pub struct SyntheticSource {
    duration: Duration,
    width: u32,
    height: u32,
    fail_at: Option<Duration>,
    pub requested: Vec<Duration>,
}

impl SyntheticSource {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            width: 32,
            height: 24,
            fail_at: None,
            requested: Vec::new(),
        }
    }

    pub fn secs(seconds: f64) -> Self {
        Self::new(Duration::from_secs_f64(seconds))
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn failing_at(mut self, timestamp: Duration) -> Self {
        self.fail_at = Some(timestamp);
        self
    }
}

impl VideoSource for SyntheticSource {
    fn duration(&self) -> Duration {
        self.duration
    }

    fn frame_at(&mut self, timestamp: Duration) -> Result<DynamicImage, ClipError> {
        self.requested.push(timestamp);
        if self.fail_at == Some(timestamp) {
            return Err(ClipError::DecodeFailure {
                timestamp: Some(timestamp),
                reason: "corrupt packet".to_string(),
            });
        }
        let shade = (timestamp.as_millis() / 10 % 256) as u8;
        Ok(DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            self.width,
            self.height,
            Rgba([shade, 255 - shade, 128, 255]),
        )))
    }
}

/// Captures every callback for later inspection.
#[derive(Default)]
pub struct RecordingProgress {
    pub stages: Mutex<Vec<ConversionStage>>,
    pub infos: Mutex<Vec<ProgressInfo>>,
}

impl RecordingProgress {
    pub fn stages(&self) -> Vec<ConversionStage> {
        self.stages.lock().unwrap().clone()
    }

    pub fn infos(&self) -> Vec<ProgressInfo> {
        self.infos.lock().unwrap().clone()
    }
}

impl ProgressCallback for RecordingProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        self.infos.lock().unwrap().push(info.clone());
    }

    fn on_stage(&self, stage: &ConversionStage) {
        self.stages.lock().unwrap().push(stage.clone());
    }
}
