/// Environment variable names
pub const ENV_API_KEY: &str = "BASINWX_API_KEY";
pub const ENV_API_URL: &str = "BASINWX_API_URL";
pub const ENV_CLIENT_HOSTNAME: &str = "BASINWX_CLIENT_HOSTNAME";

/// API defaults
pub const DEFAULT_API_URL: &str = "https://basinwx.com";
pub const HEALTH_ENDPOINT: &str = "/api/health";

/// Request headers
pub const HEADER_API_KEY: &str = "x-api-key";
pub const HEADER_CLIENT_HOSTNAME: &str = "x-client-hostname";

/// Manifest defaults
pub const DEFAULT_MANIFEST_PATH: &str = "DATA_MANIFEST.json";
pub const DEFAULT_MAX_FILE_SIZE: &str = "10MB";
pub const DEFAULT_MAX_RECORDS: usize = 50_000;

/// Data types whose payloads are decoded and structurally validated
pub const JSON_DATA_TYPES: &[&str] = &["observations", "metadata", "timeseries"];

/// Network timeouts
pub const UPLOAD_TIMEOUT_SECS: u64 = 30;
pub const HEALTH_TIMEOUT_SECS: u64 = 10;

/// Retry policy defaults
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const BACKOFF_BASE_SECS: u64 = 5;

/// Cap on stations named in the missing-variable warning log
pub const MISSING_VARS_LOG_CAP: usize = 5;
