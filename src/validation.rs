//! Source file checks run before any decoding.
//!
//! [`validate_source_file`] rejects paths that are missing, are not regular
//! files, or exceed the configured size limit, so an oversized upload never
//! reaches FFmpeg.
//!
//! # Example
//!
//! ```no_run
//! use clipgif::{ClipError, configuration::DEFAULT_MAX_SOURCE_SIZE};
//!
//! let size = clipgif::validate_source_file("input.mp4".as_ref(), Some(DEFAULT_MAX_SOURCE_SIZE))?;
//! println!("{size} bytes");
//! # Ok::<(), ClipError>(())
//! ```

use std::fs;
use std::io::ErrorKind as IoErrorKind;
use std::path::Path;

use crate::error::ClipError;

/// Check that `path` is a readable regular file no larger than `limit`
/// bytes, and return its size.
///
/// # Errors
///
/// - [`ClipError::FileOpen`] if the path does not exist or is not a regular
///   file.
/// - [`ClipError::FileTooLarge`] if the file is larger than `limit`.
/// - [`ClipError::IoError`] if the file's metadata cannot be read.
pub fn validate_source_file(path: &Path, limit: Option<u64>) -> Result<u64, ClipError> {
    let metadata = match fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(error) if error.kind() == IoErrorKind::NotFound => {
            return Err(ClipError::FileOpen {
                path: path.to_path_buf(),
                reason: "file does not exist".to_string(),
            });
        }
        Err(error) => return Err(error.into()),
    };

    if !metadata.is_file() {
        return Err(ClipError::FileOpen {
            path: path.to_path_buf(),
            reason: "not a regular file".to_string(),
        });
    }

    let size = metadata.len();
    if let Some(limit) = limit.filter(|&limit| size > limit) {
        log::warn!(
            "Rejecting {}: {size} bytes exceeds the {limit} byte limit",
            path.display()
        );
        return Err(ClipError::FileTooLarge {
            path: path.to_path_buf(),
            size,
            limit,
        });
    }

    log::debug!("Source {} accepted ({size} bytes)", path.display());
    Ok(size)
}
