//! Error handling for GCodeMeter
//!
//! Provides error types for the layers that sit above the line codec:
//! - G-Code errors (lines the estimator could not interpret)
//! - Configuration errors (estimator settings files)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// G-Code error type
///
/// Describes why a whole line was skipped during an estimation pass.
/// Line numbers are 1-based positions in the input, not `N` words.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GcodeError {
    /// Invalid G-Code syntax
    #[error("Invalid syntax at line {line_number}: {reason}")]
    InvalidSyntax {
        /// The line number where the syntax error occurred.
        line_number: u64,
        /// The reason for the syntax error.
        reason: String,
    },

    /// Two codes from the same modal group on one line
    #[error("Modal group conflict at line {line_number}: {first} and {second} share group {group}")]
    ModalGroupConflict {
        /// The line number where the conflict was found.
        line_number: u64,
        /// The group both codes belong to.
        group: String,
        /// The code seen first.
        first: String,
        /// The code seen second.
        second: String,
    },

    /// A letter that may only appear once was repeated
    #[error("Ambiguous word '{letter}' at line {line_number}")]
    AmbiguousWord {
        /// The line number where the repeated letter was found.
        line_number: u64,
        /// The repeated letter.
        letter: char,
    },

    /// Invalid parameter value
    #[error("Invalid parameter '{param}' at line {line_number}: {reason}")]
    InvalidParameter {
        /// The line number where the invalid parameter was found.
        line_number: u64,
        /// The parameter name.
        param: char,
        /// The reason the parameter is invalid.
        reason: String,
    },
}

impl GcodeError {
    /// Line number the error refers to
    pub fn line_number(&self) -> u64 {
        match self {
            Self::InvalidSyntax { line_number, .. }
            | Self::ModalGroupConflict { line_number, .. }
            | Self::AmbiguousWord { line_number, .. }
            | Self::InvalidParameter { line_number, .. } => *line_number,
        }
    }
}

/// Configuration error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A per-axis list does not match the configured axes
    #[error("{setting} has {actual} entries but {expected} axes are configured")]
    AxisCountMismatch {
        /// The offending setting.
        setting: String,
        /// Number of configured axes.
        expected: usize,
        /// Number of entries supplied.
        actual: usize,
    },

    /// A value is outside its allowed range
    #[error("Invalid value for {setting}: {reason}")]
    InvalidValue {
        /// The offending setting.
        setting: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// Unsupported file format
    #[error("Config file must be .json or .toml: {path}")]
    UnsupportedFormat {
        /// The path that was given.
        path: String,
    },

    /// The file could not be deserialized
    #[error("Invalid config file: {reason}")]
    Malformed {
        /// Deserializer message.
        reason: String,
    },
}

/// Main error type for GCodeMeter
///
/// A unified error type that can represent any error from all layers.
#[derive(Error, Debug)]
pub enum Error {
    /// G-Code error
    #[error(transparent)]
    Gcode(#[from] GcodeError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Check if this is a G-Code error
    pub fn is_gcode_error(&self) -> bool {
        matches!(self, Error::Gcode(_))
    }

    /// Check if this is a configuration error
    pub fn is_config_error(&self) -> bool {
        matches!(self, Error::Config(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
