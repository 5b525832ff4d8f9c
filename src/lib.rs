pub mod cli;
pub mod client;
pub mod error;
pub mod manifest;
pub mod utils;
pub mod validators;

pub use error::{Result, UploaderError};
