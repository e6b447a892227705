//! Media file pre-validation
//!
//! Checks run before a file is handed to the upload client:
//! - Extension must be in the allow-list (case-insensitive)
//! - Size must not exceed the configured ceiling
//!
//! The upload client performs none of these checks itself.

use anyhow::{Context, Result};
use std::path::Path;

/// Default maximum upload size (500 MB)
pub const DEFAULT_MAX_FILE_SIZE_MB: u64 = 500;

/// Default extension allow-list for subtitle jobs
pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &["mp4", "mov", "m4v", "mkv", "webm"];

/// Validate a file name against an extension allow-list
pub fn validate_extension(filename: &str, allowed_extensions: &[String]) -> Result<()> {
    let extension = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .ok_or_else(|| anyhow::anyhow!("File '{}' has no extension", filename))?;

    if !allowed_extensions
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(&extension))
    {
        return Err(anyhow::anyhow!(
            "Unsupported file extension '.{}'. Allowed: {}",
            extension,
            allowed_extensions.join(", ")
        ));
    }

    Ok(())
}

/// Validate a payload size against a ceiling in bytes
pub fn validate_size(size_bytes: u64, max_size_bytes: u64) -> Result<()> {
    if size_bytes == 0 {
        return Err(anyhow::anyhow!("File is empty"));
    }

    if size_bytes > max_size_bytes {
        return Err(anyhow::anyhow!(
            "File size {} bytes exceeds maximum of {} bytes",
            size_bytes,
            max_size_bytes
        ));
    }

    Ok(())
}

/// Validate a file on disk: extension first, then size from metadata.
pub fn validate_media_file(
    path: &Path,
    allowed_extensions: &[String],
    max_size_bytes: u64,
) -> Result<()> {
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow::anyhow!("Invalid file path: {}", path.display()))?;

    validate_extension(filename, allowed_extensions)?;

    let metadata = std::fs::metadata(path)
        .with_context(|| format!("Failed to read metadata for {}", path.display()))?;
    if !metadata.is_file() {
        return Err(anyhow::anyhow!("Not a regular file: {}", path.display()));
    }

    validate_size(metadata.len(), max_size_bytes)
}
