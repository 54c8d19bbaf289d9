//! # GCodeMeter Core
//!
//! Core types shared by the GCodeMeter crates: the error taxonomy,
//! the program unit system, and machine axis limits.

pub mod error;
pub mod machine;
pub mod units;

pub use error::{ConfigError, Error, GcodeError, Result};
pub use machine::{AxisKind, MachineLimits, DEFAULT_AXES};
pub use units::{Units, MM_PER_INCH};
