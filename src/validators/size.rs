use crate::error::{Result, UploaderError};
use crate::manifest::Manifest;
use std::fs;
use std::path::Path;
use tracing::{error, info};

/// Unit suffixes ordered longest-first so "10MB" is not mis-parsed as
/// ending in the bare "B" suffix.
const UNITS: &[(&str, u64)] = &[
    ("GB", 1024 * 1024 * 1024),
    ("MB", 1024 * 1024),
    ("KB", 1024),
    ("B", 1),
];

/// Convert a human-readable size string like "10MB" to a byte count.
///
/// Case-insensitive; fractional values are truncated ("1.5KB" → 1536).
/// A string with no recognized suffix is parsed as a bare byte count.
pub fn parse_size(text: &str) -> Result<u64> {
    let normalized = text.trim().to_uppercase();

    for (suffix, factor) in UNITS {
        if let Some(number) = normalized.strip_suffix(suffix) {
            let number: f64 = number
                .trim()
                .parse()
                .map_err(|_| UploaderError::InvalidSizeFormat(text.to_string()))?;
            return Ok((number * *factor as f64) as u64);
        }
    }

    normalized
        .parse()
        .map_err(|_| UploaderError::InvalidSizeFormat(text.to_string()))
}

/// Checks a file against the size limit declared for its data type.
pub struct SizeLimiter<'a> {
    manifest: &'a Manifest,
}

impl<'a> SizeLimiter<'a> {
    pub fn new(manifest: &'a Manifest) -> Self {
        Self { manifest }
    }

    /// Returns the file's byte count when it is within the limit.
    ///
    /// A file of exactly the limit passes; one byte over fails. An unknown
    /// data type is a hard validation failure, not a crash.
    pub fn check_file(&self, path: &Path, data_type: &str) -> Result<u64> {
        let spec =
            self.manifest
                .spec_for(data_type)
                .ok_or_else(|| UploaderError::UnknownDataType {
                    data_type: data_type.to_string(),
                })?;

        let actual = fs::metadata(path)?.len();
        let limit = parse_size(&spec.validation.max_file_size)?;

        if actual > limit {
            error!(actual, limit, "file exceeds size limit for {data_type}");
            return Err(UploaderError::FileTooLarge { actual, limit });
        }

        info!("File size OK: {actual} bytes (limit {limit})");
        Ok(actual)
    }
}
