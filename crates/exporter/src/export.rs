use anyhow::Context;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

/// Name of the graph file the vendor export routine produces.
pub const EXPORTED_MODEL_NAME: &str = "inference_model.onnx";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("resolution must be divisible by 32, got {0}")]
    ResolutionNotDivisible(u32),
}

#[derive(Debug, Clone)]
pub struct ExportRequest {
    /// Pretrained weights; the library's default weights when absent.
    pub weights: Option<PathBuf>,
    pub output_dir: PathBuf,
    /// Square input resolution baked into the exported graph.
    pub resolution: u32,
}

impl ExportRequest {
    /// The backbone downsamples by 32, so the graph only accepts multiples
    /// of 32. Runs before any model work starts.
    pub fn validate(&self) -> Result<(), ExportError> {
        if self.resolution % 32 != 0 {
            return Err(ExportError::ResolutionNotDivisible(self.resolution));
        }
        Ok(())
    }
}

pub struct Exporter {
    python: String,
}

impl Exporter {
    pub fn new(python: impl Into<String>) -> Self {
        Self {
            python: python.into(),
        }
    }

    /// Drive the vendor library's own export routine. Graph serialization
    /// lives entirely in that library; this only forwards validated
    /// parameters and reports where the file landed.
    pub fn export(&self, request: &ExportRequest) -> anyhow::Result<PathBuf> {
        request.validate()?;

        std::fs::create_dir_all(&request.output_dir).with_context(|| {
            format!(
                "failed to create output directory {}",
                request.output_dir.display()
            )
        })?;

        let script = build_export_script(request);

        tracing::info!(
            resolution = request.resolution,
            output_dir = %request.output_dir.display(),
            weights = ?request.weights,
            "Exporting model"
        );

        let status = Command::new(&self.python)
            .arg("-c")
            .arg(&script)
            .status()
            .with_context(|| format!("failed to launch {}", self.python))?;

        anyhow::ensure!(status.success(), "model export exited with {status}");

        Ok(request.output_dir.join(EXPORTED_MODEL_NAME))
    }
}

fn build_export_script(request: &ExportRequest) -> String {
    let constructor = match &request.weights {
        Some(weights) => format!(
            "RFDETRNano(pretrain_weights={:?})",
            path_str(weights)
        ),
        None => format!("RFDETRNano(resolution={})", request.resolution),
    };

    format!(
        "from rfdetr import RFDETRNano; model = {constructor}; \
         model.export(output_dir={output:?}, simplify=True, opset_version=17, \
         batch_size=1, shape=({r}, {r}), force=True)",
        output = path_str(&request.output_dir),
        r = request.resolution,
    )
}

fn path_str(path: &Path) -> String {
    path.display().to_string()
}
