pub mod backend;
pub mod classes;
pub mod config;
pub mod error;
pub mod postprocessing;
pub mod preprocessing;
pub mod visualization;

// Re-export commonly used types for convenience
pub use backend::{InferenceBackend, InferenceOutput};
pub use error::DetectorError;
pub use postprocessing::{Detection, PostProcessor};
pub use preprocessing::PreProcessor;
