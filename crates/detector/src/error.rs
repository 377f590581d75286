use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DetectorError {
    #[error("model file not found: {}", .0.display())]
    ModelNotFound(PathBuf),

    #[error("cannot read image {}", path.display())]
    UnreadableImage {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("unexpected model output shape: {0}")]
    BadOutputShape(String),
}
