//! Convert a window of a video into an animated GIF.
//!
//! Usage: `cargo run --example convert -- path/to/video.mp4 [start] [duration] [sample] [playback] [quality] [repeat]`
//!
//! Defaults: start 0, duration 3, sample 0.5, playback 0.2, quality best,
//! repeat once.

use std::env;
use std::sync::Arc;

use clipgif::{
    ClipError, ConversionRequest, ConversionStage, ConvertOptions, Converter, MediaFile,
    ProgressCallback, ProgressInfo, Quality, Repeat,
};

struct PrintProgress;

impl ProgressCallback for PrintProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        if let Some(percentage) = info.percentage {
            println!("  {:?}: {percentage:.0}%", info.operation);
        }
    }

    fn on_stage(&self, stage: &ConversionStage) {
        println!("{stage:?}");
    }
}

fn main() -> Result<(), ClipError> {
    let arguments: Vec<String> = env::args().skip(1).collect();
    let Some(path) = arguments.first() else {
        eprintln!("Usage: convert <video_path> [start] [duration] [sample] [playback] [quality] [repeat]");
        return Ok(());
    };

    let number = |index: usize, default: f64| {
        arguments
            .get(index)
            .and_then(|value| value.parse::<f64>().ok())
            .unwrap_or(default)
    };
    let quality: Quality = match arguments.get(5) {
        Some(value) => value.parse()?,
        None => Quality::Best,
    };
    let repeat: Repeat = match arguments.get(6) {
        Some(value) => value.parse()?,
        None => Repeat::PlayOnce,
    };

    let media = MediaFile::open(path)?;
    let metadata = media.metadata();
    println!(
        "Input: {}x{}, {:.2} fps, {:.2}s",
        metadata.width,
        metadata.height,
        metadata.frames_per_second,
        metadata.duration.as_secs_f64()
    );
    drop(media);

    let request = ConversionRequest::from_secs(number(1, 0.0), number(2, 3.0), number(3, 0.5), number(4, 0.2))?
        .with_quality(quality)
        .with_repeat(repeat);
    let converter = Converter::new(ConvertOptions::new().with_progress(Arc::new(PrintProgress)));

    let artifact = converter.convert_path(path, &request)?;
    println!(
        "GIF ready: {} frames, {} bytes",
        artifact.frame_count(),
        artifact.size()
    );
    let path = artifact.into_path();
    println!("Saved to {}", path.display());

    Ok(())
}
