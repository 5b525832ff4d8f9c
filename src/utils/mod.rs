pub mod constants;
pub mod filename;
pub mod progress;

pub use filename::generate_filename;
pub use progress::ProgressReporter;
