pub mod observations;
pub mod size;
pub mod structure;

pub use observations::{ObservationChecker, ObservationReport, ObservationWarning};
pub use size::{parse_size, SizeLimiter};
pub use structure::StructuralValidator;
