//! Machine axis configuration and kinematic limits

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Axis labels used when the caller does not configure any
pub const DEFAULT_AXES: [char; 6] = ['X', 'Y', 'Z', 'A', 'B', 'C'];

/// Kind of motion an axis performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisKind {
    /// Travels in length units
    Linear,
    /// Rotates in degrees
    Rotary,
}

impl AxisKind {
    /// Classify an axis letter (A, B and C rotate, everything else is linear)
    pub fn of(letter: char) -> Self {
        match letter.to_ascii_uppercase() {
            'A' | 'B' | 'C' => Self::Rotary,
            _ => Self::Linear,
        }
    }
}

/// Axis labels plus optional per-axis feed and acceleration limits
///
/// Limits are indexed like `axes`. Linear axes use mm/min and mm/s²,
/// rotary axes deg/min and deg/s². Missing limits mean unconstrained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineLimits {
    /// Axis labels, upper case
    pub axes: Vec<char>,
    /// Maximum feed per axis
    #[serde(default)]
    pub max_feed: Option<Vec<f64>>,
    /// Maximum acceleration per axis
    #[serde(default)]
    pub acceleration: Option<Vec<f64>>,
}

impl Default for MachineLimits {
    fn default() -> Self {
        Self::new(DEFAULT_AXES)
    }
}

impl MachineLimits {
    /// Create unconstrained limits for the given axis labels
    pub fn new(axes: impl IntoIterator<Item = char>) -> Self {
        Self {
            axes: axes.into_iter().map(|c| c.to_ascii_uppercase()).collect(),
            max_feed: None,
            acceleration: None,
        }
    }

    /// Set maximum feed per axis
    pub fn with_max_feed(mut self, max_feed: Vec<f64>) -> Self {
        self.max_feed = Some(max_feed);
        self
    }

    /// Set maximum acceleration per axis
    pub fn with_acceleration(mut self, acceleration: Vec<f64>) -> Self {
        self.acceleration = Some(acceleration);
        self
    }

    /// Index of an axis label (case-insensitive)
    pub fn axis_index(&self, letter: char) -> Option<usize> {
        let letter = letter.to_ascii_uppercase();
        self.axes.iter().position(|&a| a.to_ascii_uppercase() == letter)
    }

    /// Maximum feed for the axis at `index`, if configured
    pub fn max_feed_for(&self, index: usize) -> Option<f64> {
        self.max_feed.as_ref().and_then(|v| v.get(index).copied())
    }

    /// Maximum acceleration for the axis at `index`, if configured
    pub fn acceleration_for(&self, index: usize) -> Option<f64> {
        self.acceleration.as_ref().and_then(|v| v.get(index).copied())
    }

    /// Check that limit arrays match the axes and hold positive values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.axes.is_empty() {
            return Err(ConfigError::InvalidValue {
                setting: "axes".to_string(),
                reason: "at least one axis is required".to_string(),
            });
        }
        for (i, a) in self.axes.iter().enumerate() {
            if !a.is_ascii_alphabetic() {
                return Err(ConfigError::InvalidValue {
                    setting: "axes".to_string(),
                    reason: format!("'{}' is not an axis letter", a),
                });
            }
            if self.axes[..i]
                .iter()
                .any(|b| b.eq_ignore_ascii_case(a))
            {
                return Err(ConfigError::InvalidValue {
                    setting: "axes".to_string(),
                    reason: format!("axis '{}' listed twice", a),
                });
            }
        }

        for (name, values) in [
            ("max_feed", &self.max_feed),
            ("acceleration", &self.acceleration),
        ] {
            let Some(values) = values else {
                continue;
            };
            if values.len() != self.axes.len() {
                return Err(ConfigError::AxisCountMismatch {
                    setting: name.to_string(),
                    expected: self.axes.len(),
                    actual: values.len(),
                });
            }
            if let Some(bad) = values.iter().find(|v| !v.is_finite() || **v <= 0.0) {
                return Err(ConfigError::InvalidValue {
                    setting: name.to_string(),
                    reason: format!("{} must be > 0", bad),
                });
            }
        }
        Ok(())
    }
}
