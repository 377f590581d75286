mod export;

use clap::Parser;
use common::{Environment, setup_logging};
use export::{ExportRequest, Exporter};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "export", about = "Export pretrained RF-DETR weights to ONNX")]
struct Args {
    /// Pretrained weights path (library default weights when omitted)
    #[arg(long)]
    weights: Option<PathBuf>,

    /// Output directory for the exported graph
    #[arg(long, default_value = "./export")]
    output: PathBuf,

    /// Square input resolution, must be divisible by 32
    #[arg(long, default_value_t = 448)]
    resolution: u32,

    /// Python interpreter with the rfdetr package installed
    #[arg(long, default_value = "python3")]
    python: String,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    setup_logging(Environment::from_env());

    let request = ExportRequest {
        weights: args.weights,
        output_dir: args.output,
        resolution: args.resolution,
    };

    // Fail fast on a bad resolution, before touching anything else.
    request.validate()?;

    let exporter = Exporter::new(args.python);
    let model_path = exporter.export(&request)?;

    tracing::info!(model = %model_path.display(), "Export complete");
    println!("Exported: {}", model_path.display());

    Ok(())
}
