//! Unit conversion utilities
//!
//! Handles the G20/G21 unit systems. Estimation runs internally in
//! millimetres and converts back to the program's final unit system.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Millimetres per inch
pub const MM_PER_INCH: f64 = 25.4;

/// Program unit system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    /// Millimetres (G21)
    #[default]
    Millimeters,
    /// Inches (G20)
    Inches,
}

impl Units {
    /// Unit system selected by a units-group G code (`20` or `21`)
    pub fn from_gcode(code: f64) -> Option<Self> {
        if code == 20.0 {
            Some(Self::Inches)
        } else if code == 21.0 {
            Some(Self::Millimeters)
        } else {
            None
        }
    }

    /// Convert a value in this unit system to millimetres
    pub fn to_mm(self, value: f64) -> f64 {
        match self {
            Self::Millimeters => value,
            Self::Inches => value * MM_PER_INCH,
        }
    }

    /// Convert a value in millimetres to this unit system
    pub fn from_mm(self, value_mm: f64) -> f64 {
        match self {
            Self::Millimeters => value_mm,
            Self::Inches => value_mm / MM_PER_INCH,
        }
    }

    /// Short unit suffix for display
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Millimeters => "mm",
            Self::Inches => "in",
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Millimeters => write!(f, "Millimeters"),
            Self::Inches => write!(f, "Inches"),
        }
    }
}
