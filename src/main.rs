use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use gcodemeter::{init_logging, Config, GcodeFileReader, BUILD_DATE, VERSION};

const LONG_VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("BUILD_DATE"), ")");

/// Estimate run time, travel and extents of a G-code program
#[derive(Parser, Debug)]
#[command(version, long_version = LONG_VERSION, about, long_about = None)]
struct Args {
    /// G-code file to estimate
    #[arg()]
    file: PathBuf,

    /// Config file (.json or .toml); defaults to the platform config location
    #[arg()]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging()?;
    tracing::debug!("gcodemeter {} built {}", VERSION, BUILD_DATE);

    let config = match &args.config {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Config::load_or_default()?,
    };

    let reader = GcodeFileReader::new(&args.file)?;
    tracing::info!(
        "Estimating {} ({} bytes)",
        args.file.display(),
        reader.file_size()
    );

    let result = reader.estimate_with_progress(&config.processor_options(), |progress| {
        tracing::debug!(
            "{} lines, {} invalid, {:.1}s so far",
            progress.lines_processed,
            progress.invalid_gcode,
            progress.estimated_time
        );
    })?;

    if result.invalid_gcode > 0 {
        tracing::warn!("{} lines could not be interpreted", result.invalid_gcode);
    }
    let suffix = result.units.suffix();
    tracing::info!(
        "{:.1}s total, {:.3}{} rapid, {:.3}{} feed",
        result.total_time,
        result.rapid_distance,
        suffix,
        result.feed_distance,
        suffix
    );

    let json = if config.output.pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };
    println!("{}", json);

    Ok(())
}
