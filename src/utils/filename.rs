use crate::error::{Result, UploaderError};
use crate::manifest::Manifest;
use chrono::{DateTime, Datelike, Timelike, Utc};

/// Render a data type's filename pattern for the given timestamp.
///
/// Placeholder tokens `YYYY`, `MM`, `DD`, `HH`, `mm` are substituted with
/// zero-padded calendar fields; all other characters pass through.
pub fn generate_filename(
    manifest: &Manifest,
    data_type: &str,
    timestamp: DateTime<Utc>,
) -> Result<String> {
    let spec = manifest
        .spec_for(data_type)
        .ok_or_else(|| UploaderError::UnknownDataType {
            data_type: data_type.to_string(),
        })?;
    Ok(render_pattern(&spec.filename.pattern, timestamp))
}

fn render_pattern(pattern: &str, ts: DateTime<Utc>) -> String {
    pattern
        .replace("YYYY", &format!("{:04}", ts.year()))
        .replace("MM", &format!("{:02}", ts.month()))
        .replace("DD", &format!("{:02}", ts.day()))
        .replace("HH", &format!("{:02}", ts.hour()))
        .replace("mm", &format!("{:02}", ts.minute()))
}
