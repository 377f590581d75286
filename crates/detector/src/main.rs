use clap::Parser;
use common::setup_logging;
use detector::backend::ort::OrtBackend;
use detector::config::DetectorConfig;
use detector::postprocessing::PostProcessor;
use detector::preprocessing::PreProcessor;
use detector::visualization::Visualizer;
use detector::InferenceBackend;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "detect", about = "RF-DETR object detection on a single image")]
struct Args {
    /// Path to the exported ONNX model
    #[arg(long, default_value = "inference_model.onnx")]
    model: PathBuf,

    /// Input image path
    #[arg(long, default_value = "test.jpg")]
    image: PathBuf,

    /// Confidence threshold
    #[arg(long, default_value_t = 0.6)]
    conf: f32,

    /// Annotated output image path
    #[arg(long, default_value = "out.jpg")]
    output: PathBuf,
}

fn main() {
    let args = Args::parse();
    let config = DetectorConfig::new(args.model, args.image, args.output, args.conf);

    setup_logging(config.environment.clone());

    tracing::info!(
        config = ?config,
        "Loaded configuration"
    );

    // Failures are reported, not propagated; the tool always exits 0.
    if let Err(e) = run(&config) {
        tracing::error!(error = %e, "Detection failed");
        println!("Error: {e}");
    }
}

fn run(config: &DetectorConfig) -> anyhow::Result<()> {
    let mut backend = OrtBackend::load_model(&config.model_path)?;
    let preprocessor = PreProcessor::new(config.input_size);
    let postprocessor = PostProcessor::new(config.confidence_threshold);

    let prepared = preprocessor.prepare(&config.image_path)?;
    let output = backend.infer(&prepared.tensor)?;
    let detections = postprocessor.decode(&output, prepared.original_size)?;

    println!("Detected {} object(s)", detections.len());
    for (i, det) in detections.iter().enumerate() {
        println!(
            "  {}: {} (ID: {}), confidence: {:.3}, bbox: {:?}",
            i + 1,
            det.class_name.as_deref().unwrap_or("unknown"),
            det.class_id,
            det.confidence,
            det.bbox
        );
    }

    let visualizer = Visualizer::new();
    visualizer.annotate(&config.image_path, &detections, &config.output_path)?;

    Ok(())
}
