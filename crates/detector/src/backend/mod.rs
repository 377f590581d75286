use ndarray::{Array, IxDyn};
use std::path::Path;

pub mod ort;

pub trait InferenceBackend {
    fn load_model(path: &Path) -> anyhow::Result<Self>
    where
        Self: Sized;

    /// Run the forward pass on a prepared `[1, H, W, 3]` u8 tensor.
    fn infer(&mut self, input: &Array<u8, IxDyn>) -> anyhow::Result<InferenceOutput>;
}

pub struct InferenceOutput {
    /// `[1, N, 4]` boxes in cxcywh format, normalized 0-1
    pub boxes: ndarray::ArrayD<f32>,
    /// `[1, N, num_classes]` raw class scores
    pub logits: ndarray::ArrayD<f32>,
}
