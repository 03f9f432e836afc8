//! FFmpeg log level configuration.
//!
//! FFmpeg writes its own diagnostics to stderr, separately from the Rust
//! [`log`] facade this crate uses. These helpers let callers drive both from
//! one [`log::LevelFilter`] instead of importing `ffmpeg-next` directly.
//!
//! # Example
//!
//! ```no_run
//! use log::LevelFilter;
//!
//! // Only let FFmpeg report errors.
//! clipgif::set_ffmpeg_log_level(LevelFilter::Error);
//! ```

use ffmpeg_next::util::log::Level;
use log::LevelFilter;

/// Set FFmpeg's internal verbosity from a `log` level filter.
///
/// `Off` silences FFmpeg entirely. This does **not** affect Rust-side `log`
/// output.
pub fn set_ffmpeg_log_level(filter: LevelFilter) {
    let level = match filter {
        LevelFilter::Off => Level::Quiet,
        LevelFilter::Error => Level::Error,
        LevelFilter::Warn => Level::Warning,
        LevelFilter::Info => Level::Info,
        LevelFilter::Debug => Level::Debug,
        LevelFilter::Trace => Level::Trace,
    };
    ffmpeg_next::util::log::set_level(level);
}

/// FFmpeg's current verbosity expressed as a `log` level filter.
///
/// FFmpeg's `Panic` and `Fatal` fold into `Error`, `Verbose` into `Debug`.
/// Returns `None` if FFmpeg reports a level outside its known set.
pub fn ffmpeg_log_level() -> Option<LevelFilter> {
    let level = ffmpeg_next::util::log::get_level().ok()?;
    Some(match level {
        Level::Quiet => LevelFilter::Off,
        Level::Panic | Level::Fatal | Level::Error => LevelFilter::Error,
        Level::Warning => LevelFilter::Warn,
        Level::Info => LevelFilter::Info,
        Level::Verbose | Level::Debug => LevelFilter::Debug,
        Level::Trace => LevelFilter::Trace,
    })
}
