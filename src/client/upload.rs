use crate::error::{Result, UploaderError};
use crate::manifest::Manifest;
use crate::utils::constants::{
    BACKOFF_BASE_SECS, DEFAULT_API_URL, DEFAULT_MAX_ATTEMPTS, ENV_API_KEY, ENV_API_URL,
    ENV_CLIENT_HOSTNAME, HEADER_API_KEY, HEADER_CLIENT_HOSTNAME, HEALTH_ENDPOINT,
    HEALTH_TIMEOUT_SECS, UPLOAD_TIMEOUT_SECS,
};
use reqwest::multipart;
use reqwest::StatusCode;
use serde_json::Value;
use std::env;
use std::path::Path;
use std::time::Duration;
use tracing::{error, info, warn};

/// Final result of an upload, as seen by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadOutcome {
    /// HTTP 200; carries the server's JSON acknowledgment.
    Success(Value),
    /// All attempts failed with transient errors; carries the last one.
    Retryable { reason: String },
    /// Retrying cannot help (auth rejection, unknown data type).
    Terminal { reason: String },
}

impl UploadOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, UploadOutcome::Success(_))
    }

    /// Collapse the outcome into the crate error taxonomy, for callers
    /// that map outcomes to exit status.
    pub fn into_result(self, max_attempts: u32) -> Result<Value> {
        match self {
            UploadOutcome::Success(body) => Ok(body),
            UploadOutcome::Retryable { reason } => Err(UploaderError::UploadFailed {
                attempts: max_attempts,
                reason,
            }),
            UploadOutcome::Terminal { reason } => Err(UploaderError::UploadRejected { reason }),
        }
    }
}

/// What a single HTTP attempt produced.
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptOutcome {
    Success(Value),
    /// HTTP 401/403. Repeating an unauthenticated request cannot succeed.
    AuthRejected { status: u16 },
    /// Any other non-200 status or a transport-level failure.
    Retryable { reason: String },
}

/// States of the retry machine. `Attempting` and `Backoff` are transient;
/// the rest end the upload.
#[derive(Debug, Clone, PartialEq)]
pub enum RetryState {
    Attempting { attempt: u32 },
    Backoff { next_attempt: u32, delay: Duration },
    Succeeded { body: Value },
    Exhausted { reason: String },
    AuthRejected { status: u16 },
}

/// Retry policy: `max_attempts` tries with exponential backoff between
/// them (`backoff_base × 2^(attempt−1)`; 5s, 10s, 20s, … in production).
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_base: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff_base: Duration::from_secs(BACKOFF_BASE_SECS),
        }
    }
}

impl RetryPolicy {
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        self.backoff_base * 2u32.pow(attempt.saturating_sub(1))
    }

    /// Transition function of the retry machine. Auth rejection ends the
    /// upload immediately; transient failures back off until the attempt
    /// budget is exhausted.
    pub fn next_state(&self, attempt: u32, outcome: AttemptOutcome) -> RetryState {
        match outcome {
            AttemptOutcome::Success(body) => RetryState::Succeeded { body },
            AttemptOutcome::AuthRejected { status } => RetryState::AuthRejected { status },
            AttemptOutcome::Retryable { reason } => {
                if attempt < self.max_attempts {
                    RetryState::Backoff {
                        next_attempt: attempt + 1,
                        delay: self.backoff_delay(attempt),
                    }
                } else {
                    RetryState::Exhausted { reason }
                }
            }
        }
    }
}

/// Client for the BasinWx upload API: multipart file upload with
/// retry/backoff, plus an advisory health probe.
pub struct UploadClient<'a> {
    manifest: &'a Manifest,
    api_url: String,
    api_key: String,
    hostname: String,
    upload_client: reqwest::Client,
    health_client: reqwest::Client,
    policy: RetryPolicy,
}

impl<'a> UploadClient<'a> {
    /// Build a client from the environment. A missing API key is a fatal
    /// configuration error; the API URL and client hostname have defaults.
    pub fn from_env(manifest: &'a Manifest) -> Result<Self> {
        let api_key = env::var(ENV_API_KEY).map_err(|_| UploaderError::MissingApiKey)?;
        let api_url = env::var(ENV_API_URL).unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let hostname = env::var(ENV_CLIENT_HOSTNAME).unwrap_or_else(|_| "unknown".to_string());
        Self::new(manifest, &api_url, api_key, hostname)
    }

    pub fn new(
        manifest: &'a Manifest,
        api_url: &str,
        api_key: String,
        hostname: String,
    ) -> Result<Self> {
        // Separate clients so a slow health probe cannot eat into the
        // upload timeout budget.
        let upload_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(UPLOAD_TIMEOUT_SECS))
            .build()?;
        let health_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(HEALTH_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            manifest,
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key,
            hostname,
            upload_client,
            health_client,
            policy: RetryPolicy::default(),
        })
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Upload a file to the endpoint declared for its data type, retrying
    /// transient failures per the retry policy.
    pub async fn upload(&self, path: &Path, data_type: &str) -> Result<UploadOutcome> {
        let Some(spec) = self.manifest.spec_for(data_type) else {
            error!("Unknown data type: {data_type}");
            return Ok(UploadOutcome::Terminal {
                reason: format!("unknown data type: {data_type}"),
            });
        };

        let url = format!("{}{}", self.api_url, spec.endpoint);
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload.bin")
            .to_string();
        let bytes = tokio::fs::read(path).await?;

        let mut state = RetryState::Attempting { attempt: 1 };
        loop {
            state = match state {
                RetryState::Attempting { attempt } => {
                    info!(
                        "Upload attempt {attempt}/{} to {url}",
                        self.policy.max_attempts
                    );
                    let outcome = self.attempt(&url, &file_name, bytes.clone()).await;
                    self.policy.next_state(attempt, outcome)
                }
                RetryState::Backoff {
                    next_attempt,
                    delay,
                } => {
                    warn!("Upload attempt failed, retrying in {delay:?}");
                    tokio::time::sleep(delay).await;
                    RetryState::Attempting {
                        attempt: next_attempt,
                    }
                }
                RetryState::Succeeded { body } => {
                    info!("Upload successful: {body}");
                    return Ok(UploadOutcome::Success(body));
                }
                RetryState::AuthRejected { status } => {
                    error!("Upload rejected with HTTP {status}, not retrying");
                    return Ok(UploadOutcome::Terminal {
                        reason: format!("authentication rejected (HTTP {status})"),
                    });
                }
                RetryState::Exhausted { reason } => {
                    error!(
                        "Upload failed after {} attempts: {reason}",
                        self.policy.max_attempts
                    );
                    return Ok(UploadOutcome::Retryable { reason });
                }
            };
        }
    }

    /// One HTTP attempt, classified for the retry machine.
    async fn attempt(&self, url: &str, file_name: &str, bytes: Vec<u8>) -> AttemptOutcome {
        let part = multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = multipart::Form::new().part("file", part);

        let response = self
            .upload_client
            .post(url)
            .header(HEADER_API_KEY, &self.api_key)
            .header(HEADER_CLIENT_HOSTNAME, &self.hostname)
            .multipart(form)
            .send()
            .await;

        match response {
            Ok(response) if response.status() == StatusCode::OK => {
                // The acknowledgment body is logged, never interpreted.
                let body = response.json::<Value>().await.unwrap_or(Value::Null);
                AttemptOutcome::Success(body)
            }
            Ok(response)
                if response.status() == StatusCode::UNAUTHORIZED
                    || response.status() == StatusCode::FORBIDDEN =>
            {
                AttemptOutcome::AuthRejected {
                    status: response.status().as_u16(),
                }
            }
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                error!("Upload failed: {status} - {body}");
                AttemptOutcome::Retryable {
                    reason: format!("HTTP {status}: {body}"),
                }
            }
            Err(e) => {
                error!("Upload exception: {e}");
                AttemptOutcome::Retryable {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Probe `/api/health`. Advisory only: callers may proceed with an
    /// upload after an unreachable result.
    pub async fn health_check(&self) -> bool {
        let url = format!("{}{}", self.api_url, HEALTH_ENDPOINT);
        match self.health_client.get(&url).send().await {
            Ok(response) if response.status() == StatusCode::OK => {
                info!("API health check passed");
                true
            }
            Ok(response) => {
                warn!("API health check returned {}", response.status());
                false
            }
            Err(e) => {
                error!("API health check failed: {e}");
                false
            }
        }
    }
}
