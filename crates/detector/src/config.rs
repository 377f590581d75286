use std::path::PathBuf;

pub use common::Environment;

/// Spatial resolution the graph was exported at.
pub const DEFAULT_INPUT_SIZE: (u32, u32) = (448, 448);

#[derive(Debug, Clone)]
pub struct DetectorConfig {
    pub environment: Environment,
    pub model_path: PathBuf,
    pub image_path: PathBuf,
    pub output_path: PathBuf,
    pub input_size: (u32, u32),
    pub confidence_threshold: f32,
}

impl DetectorConfig {
    pub fn new(
        model_path: PathBuf,
        image_path: PathBuf,
        output_path: PathBuf,
        confidence_threshold: f32,
    ) -> Self {
        Self {
            environment: Environment::from_env(),
            model_path,
            image_path,
            output_path,
            input_size: DEFAULT_INPUT_SIZE,
            confidence_threshold,
        }
    }

    /// Create default configuration for testing
    #[cfg(test)]
    pub fn test_default() -> Self {
        Self {
            environment: Environment::Development,
            model_path: PathBuf::from("inference_model.onnx"),
            image_path: PathBuf::from("test.jpg"),
            output_path: PathBuf::from("out.jpg"),
            input_size: DEFAULT_INPUT_SIZE,
            confidence_threshold: 0.6,
        }
    }
}
