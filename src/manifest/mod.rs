pub mod model;

pub use model::{DataTypeSpec, FilenameSpec, Manifest, ValidationRules};
