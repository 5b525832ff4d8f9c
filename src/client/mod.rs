pub mod upload;

pub use upload::{AttemptOutcome, RetryPolicy, RetryState, UploadClient, UploadOutcome};
