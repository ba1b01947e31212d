//! Vertical-crop batch pipeline binary.

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vertcut_cli::{run_batch, run_single, AppConfig};
use vertcut_media::{check_ffmpeg, check_ffprobe};
use vertcut_planner::GeminiPlanner;

/// Convert wide videos into vertical 9:16 crops driven by AI framing.
#[derive(Debug, Parser)]
#[command(name = "vertcut", version)]
struct Cli {
    /// Process a single source video instead of scanning the input directory
    #[arg(long, conflicts_with = "input_dir")]
    input: Option<PathBuf>,

    /// Directory of source videos
    #[arg(long)]
    input_dir: Option<PathBuf>,

    /// Directory for rendered outputs and plan artifacts
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Encoder CRF for the segment re-encode
    #[arg(long)]
    crf: Option<u8>,

    /// Encoder preset for the segment re-encode
    #[arg(long)]
    preset: Option<String>,

    /// Re-process videos whose output file already exists
    #[arg(long)]
    force: bool,
}

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("vertcut=info"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    let cli = Cli::parse();

    let mut config = AppConfig::from_env();
    if let Some(input_dir) = cli.input_dir {
        config.input_dir = input_dir;
    }
    if let Some(output_dir) = cli.output_dir {
        config.output_dir = output_dir;
    }
    if let Some(crf) = cli.crf {
        config.encoding = config.encoding.with_crf(crf);
    }
    if let Some(preset) = cli.preset {
        config.encoding = config.encoding.with_preset(preset);
    }
    if cli.force {
        config.skip_existing = false;
    }

    info!("Starting vertcut");
    info!(
        "Input: {}, output: {}",
        config.input_dir.display(),
        config.output_dir.display()
    );

    if let Err(e) = check_ffmpeg() {
        error!("{}", e);
        std::process::exit(1);
    }
    if let Err(e) = check_ffprobe() {
        error!("{}", e);
        std::process::exit(1);
    }

    let planner = match GeminiPlanner::from_env() {
        Ok(p) => p,
        Err(e) => {
            error!("Failed to create Gemini planner: {}", e);
            std::process::exit(1);
        }
    };

    let result = match &cli.input {
        Some(source) => run_single(&config, &planner, source).await,
        None => run_batch(&config, &planner).await,
    };

    match result {
        Ok(summary) => {
            summary.log();
            if !summary.is_all_ok() {
                std::process::exit(1);
            }
        }
        Err(e) => {
            error!("Batch aborted: {}", e);
            std::process::exit(1);
        }
    }
}
