//! # GCodeMeter Settings
//!
//! Loading, saving and validating estimator configuration files.

pub mod config;

pub use config::{Config, OutputSettings, ProcessingSettings};
