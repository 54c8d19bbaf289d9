//! Estimation pass output

use gcodemeter_core::Units;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

use crate::bounds::BoundingBox;

/// File classification derived from the axes used anywhere in the file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileShape {
    /// Three linear axes
    #[default]
    Standard,
    /// A rotary axis replaces the secondary linear axis
    Rotary,
    /// Secondary linear axis and rotary axis together
    FourAxis,
}

impl FileShape {
    /// Classify from every axis letter used in the file
    pub fn classify(used_axes: &BTreeSet<char>) -> Self {
        match (used_axes.contains(&'Y'), used_axes.contains(&'A')) {
            (true, true) => Self::FourAxis,
            (false, true) => Self::Rotary,
            _ => Self::Standard,
        }
    }
}

impl fmt::Display for FileShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard => write!(f, "standard"),
            Self::Rotary => write!(f, "rotary"),
            Self::FourAxis => write!(f, "four-axis"),
        }
    }
}

/// A commanded numeric value kept in a usage set
///
/// Ordered with `f64::total_cmp` so values can live in a `BTreeSet`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UsageValue(pub f64);

impl PartialEq for UsageValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for UsageValue {}

impl PartialOrd for UsageValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for UsageValue {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// One skipped line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineDiagnostic {
    /// 1-based line position in the input
    pub line_number: u64,
    pub message: String,
}

/// Result of a whole-file estimation pass
#[derive(Debug, Clone, Serialize)]
pub struct EstimateResult {
    /// Lines read, including blank and invalid ones
    pub lines: u64,
    /// Lines skipped because they could not be interpreted
    pub invalid_gcode: u64,
    /// Estimated run time in seconds
    pub total_time: f64,
    /// Dwell time in seconds (included in `total_time`)
    pub dwell_time: f64,
    /// Rapid travel in `units` (linear moves only)
    pub rapid_distance: f64,
    /// Feed travel in `units` (linear moves only)
    pub feed_distance: f64,
    /// Linear extents in `units`, rotary extents in degrees
    pub bounding_box: BoundingBox,
    /// Unit system active at the end of the file
    pub units: Units,
    pub tools: BTreeSet<u32>,
    pub spindle_speeds: BTreeSet<UsageValue>,
    pub feed_rates: BTreeSet<UsageValue>,
    /// Axis letters given a coordinate anywhere in the file
    pub used_axes: BTreeSet<char>,
    pub file_shape: FileShape,
    /// First skipped lines, capped by `max_reported_errors`
    pub diagnostics: Vec<LineDiagnostic>,
}

impl EstimateResult {
    /// Spindle speeds in ascending order
    pub fn spindle_speed_values(&self) -> Vec<f64> {
        self.spindle_speeds.iter().map(|v| v.0).collect()
    }

    /// Feed rates in ascending order
    pub fn feed_rate_values(&self) -> Vec<f64> {
        self.feed_rates.iter().map(|v| v.0).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_shape_classification() {
        let axes = |s: &str| s.chars().collect::<BTreeSet<char>>();
        assert_eq!(FileShape::classify(&axes("XYZ")), FileShape::Standard);
        assert_eq!(FileShape::classify(&axes("XZA")), FileShape::Rotary);
        assert_eq!(FileShape::classify(&axes("A")), FileShape::Rotary);
        assert_eq!(FileShape::classify(&axes("AXYZ")), FileShape::FourAxis);
        assert_eq!(FileShape::classify(&axes("")), FileShape::Standard);
        assert_eq!(FileShape::FourAxis.to_string(), "four-axis");
    }

    #[test]
    fn test_usage_values_are_ordered_and_deduplicated() {
        let mut set = BTreeSet::new();
        for v in [1200.0, 500.0, 1200.0, 0.0] {
            set.insert(UsageValue(v));
        }
        let values: Vec<f64> = set.iter().map(|v| v.0).collect();
        assert_eq!(values, vec![0.0, 500.0, 1200.0]);
        assert_eq!(serde_json::to_string(&set).unwrap(), "[0.0,500.0,1200.0]");
    }
}
