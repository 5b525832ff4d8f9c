use thiserror::Error;

pub type Result<T> = std::result::Result<T, UploaderError>;

#[derive(Error, Debug)]
pub enum UploaderError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed manifest at {path}: {reason}")]
    MalformedManifest { path: String, reason: String },

    #[error("Unknown data type: {data_type}")]
    UnknownDataType { data_type: String },

    #[error("Invalid size format: {0}")]
    InvalidSizeFormat(String),

    #[error("File too large: {actual} bytes > {limit} bytes")]
    FileTooLarge { actual: u64, limit: u64 },

    #[error("Structure validation failed at {path}: {message}")]
    SchemaMismatch { message: String, path: String },

    #[error("Observations payload must be an array")]
    NotAnArray,

    #[error("Too many records: {count} > {limit}")]
    TooManyRecords { count: usize, limit: usize },

    #[error("BASINWX_API_KEY environment variable not set")]
    MissingApiKey,

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upload failed after {attempts} attempts: {reason}")]
    UploadFailed { attempts: u32, reason: String },

    #[error("Upload terminally rejected: {reason}")]
    UploadRejected { reason: String },

    #[error("API health check failed")]
    HealthUnreachable,
}
