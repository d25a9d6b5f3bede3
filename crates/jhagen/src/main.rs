use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use jhagen::pipeline::LogProgress;
use jhagen::{convert_mop, load_config, Config};

/// Convert a Method of Procedure (.docx) into a Job Hazard Analysis
/// document using the standard template.
#[derive(Parser, Debug)]
#[command(name = "jhagen", version, about)]
struct Args {
    /// Path to the MOP document.
    input: PathBuf,

    /// Path to a JSON config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// JHA template path (overrides the config).
    #[arg(long)]
    template: Option<PathBuf>,

    /// Where to write the generated document (defaults to the configured
    /// output filename in the current directory).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Classification model (overrides the config).
    #[arg(long)]
    model: Option<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    if let Err(e) = run(Args::parse()) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => Config::default(),
    };
    if let Some(template) = &args.template {
        config.template_path = template.display().to_string();
    }
    if let Some(model) = args.model {
        config.model = model;
    }

    let mop_bytes = std::fs::read(&args.input)
        .map_err(|e| format!("failed to read '{}': {e}", args.input.display()))?;

    let output_bytes = convert_mop(mop_bytes, &config, &LogProgress)?;

    let output_path = args
        .output
        .unwrap_or_else(|| PathBuf::from(&config.output_filename));
    std::fs::write(&output_path, output_bytes)
        .map_err(|e| format!("failed to write '{}': {e}", output_path.display()))?;

    info!("Wrote {}", output_path.display());
    Ok(())
}
