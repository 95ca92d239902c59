use std::path::PathBuf;
use std::process::ExitCode;

use armor_vision::detect::run_and_report;
use armor_vision::{ArmorDetectConfig, ParamValue};
use clap::Parser;
use log::LevelFilter;

#[cfg(feature = "tracing")]
use tracing_log::LogTracer;

/// Detect armor plates in one image as described by a JSON config.
#[derive(Debug, Parser)]
#[command(name = "armor-vision", version, about)]
struct Cli {
    /// Path to the JSON config.
    config: PathBuf,

    /// Override the target color (0 = red, 1 = blue).
    #[arg(long)]
    detect_color: Option<i64>,

    /// Override the classifier confidence threshold.
    #[arg(long)]
    threshold: Option<f64>,

    /// Emit debug measurements and images.
    #[arg(long)]
    debug: bool,

    /// Override the report path.
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Log per-stage details.
    #[arg(long, short)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    #[cfg(feature = "tracing")]
    {
        let _ = LogTracer::init_with_filter(level);
        armor_vision::core::init_tracing(false);
    }
    #[cfg(not(feature = "tracing"))]
    let _ = armor_vision::core::init_with_level(level);
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut cfg = ArmorDetectConfig::load_json(&cli.config)?;

    if let Some(color) = cli.detect_color {
        cfg.params
            .set_named("detect_color", ParamValue::Int(color))?;
    }
    if let Some(t) = cli.threshold {
        cfg.params
            .set_named("classifier.threshold", ParamValue::Float(t))?;
    }
    if cli.debug {
        cfg.params.debug = true;
    }
    if let Some(out) = cli.output {
        cfg.output_path = Some(out.to_string_lossy().into_owned());
    }

    let report = run_and_report(&cfg)?;
    println!(
        "detected {} armors, report written to {}",
        report.armors.len(),
        cfg.output_path().display()
    );
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
