//! # GCodeMeter
//!
//! G-code line codec and single-pass job estimator for CNC senders:
//! - Lossless line parsing and rebuilding with word-level edits
//! - Modal machine state tracking and motion interpretation
//! - Run-time estimates with per-axis feed and acceleration limits
//! - Bounding box, tool, spindle and feed usage summaries
//!
//! ## Architecture
//!
//! GCodeMeter is organized as a workspace with multiple crates:
//!
//! 1. **gcodemeter-core** - Units, machine limits, shared errors
//! 2. **gcodemeter-parser** - Line codec and modal group table
//! 3. **gcodemeter-estimator** - Machine state, arcs, kinematics, estimation pass
//! 4. **gcodemeter-settings** - Configuration files
//! 5. **gcodemeter** - Command-line binary and file streaming

pub mod file_io;

pub use file_io::{FileReadStats, GcodeFileReader};

pub use gcodemeter_core::{ConfigError, Error, GcodeError, MachineLimits, Result, Units};

pub use gcodemeter_parser::{
    Comment, CommentStyle, FormatOptions, GroupRef, Line, LineError, ModalGroup, ModalGroupTable,
    Word,
};

pub use gcodemeter_estimator::{
    process_file, process_file_with_progress, ArcInterpolator, BoundingBox, EstimateResult,
    FileShape, Processor, ProcessorOptions, Progress,
};

pub use gcodemeter_settings::Config;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Log lines go to stderr so stdout stays free for the JSON result.
/// `RUST_LOG` overrides the default `info` level.
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
