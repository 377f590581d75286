use super::{InferenceBackend, InferenceOutput};
use crate::error::DetectorError;
use ndarray::{Array, IxDyn};
use ort::{
    session::{Session, builder::GraphOptimizationLevel},
    value::TensorRef,
};
use std::path::Path;

#[derive(Debug)]
pub struct OrtBackend {
    session: Session,
    input_name: String,
    output_names: (String, String),
}

impl OrtBackend {
    fn build_session(path: &Path) -> anyhow::Result<Session> {
        // Initialize ORT environment (idempotent)
        let _ = ort::init().commit();

        let builder = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(4)?;

        #[cfg(feature = "cuda")]
        let builder = {
            tracing::info!("Initializing ONNX Runtime with CUDA execution provider");
            builder.with_execution_providers([
                ort::execution_providers::CUDAExecutionProvider::default()
                    .with_device_id(0)
                    .build()
                    .error_on_failure(),
            ])?
        };

        Ok(builder.commit_from_file(path)?)
    }
}

impl InferenceBackend for OrtBackend {
    fn load_model(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Err(DetectorError::ModelNotFound(path.to_path_buf()).into());
        }

        let session = Self::build_session(path)?;

        anyhow::ensure!(
            !session.inputs().is_empty(),
            "model graph declares no inputs"
        );
        anyhow::ensure!(
            session.outputs().len() >= 2,
            "model graph must expose box and logit outputs, found {}",
            session.outputs().len()
        );

        let input_name = session.inputs()[0].name().to_string();
        let output_names = (
            session.outputs()[0].name().to_string(),
            session.outputs()[1].name().to_string(),
        );

        tracing::info!(
            model_path = %path.display(),
            input = %input_name,
            "Model loaded"
        );

        Ok(Self {
            session,
            input_name,
            output_names,
        })
    }

    fn infer(&mut self, input: &Array<u8, IxDyn>) -> anyhow::Result<InferenceOutput> {
        let outputs = self.session.run(ort::inputs![
            self.input_name.as_str() => TensorRef::from_array_view(input.view())?
        ])?;

        let boxes = outputs[self.output_names.0.as_str()].try_extract_array::<f32>()?;
        let logits = outputs[self.output_names.1.as_str()].try_extract_array::<f32>()?;

        Ok(InferenceOutput {
            boxes: boxes.into_owned(),
            logits: logits.into_owned(),
        })
    }
}
