//! Serialization options and number formatting for G-code words

use serde::{Deserialize, Serialize};

/// How a rebuilt line is written back to text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatOptions {
    /// Omit spaces between words and drop the comment
    pub compact: bool,
    /// Fractional digits kept (values are truncated, not rounded)
    pub precision: usize,
    /// Minimum integer digits of G and M values (`G1` -> `G01`)
    pub min_command_digits: usize,
    /// Minimum digits of N values
    pub min_line_digits: usize,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            compact: false,
            precision: 4,
            min_command_digits: 2,
            min_line_digits: 1,
        }
    }
}

impl FormatOptions {
    /// Default options in compact mode
    pub fn compact() -> Self {
        Self {
            compact: true,
            ..Self::default()
        }
    }

    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    pub fn with_min_command_digits(mut self, digits: usize) -> Self {
        self.min_command_digits = digits;
        self
    }

    pub fn with_min_line_digits(mut self, digits: usize) -> Self {
        self.min_line_digits = digits;
        self
    }
}

/// Format a value truncated to `precision` fractional digits
///
/// Trailing zeros and a bare decimal point are dropped; negative zero
/// prints as `0`.
pub fn format_number(value: f64, precision: usize) -> String {
    // f64 Display never uses exponent notation
    let mut s = value.to_string();
    if let Some(dot) = s.find('.') {
        s.truncate(precision.saturating_add(dot + 1).min(s.len()));
        while s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
    }
    if s == "-0" {
        s = "0".to_string();
    }
    s
}

/// Left-pad the integer part of a formatted number with zeros
pub fn pad_integer_part(number: &str, width: usize) -> String {
    let (sign, digits) = match number.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", number),
    };
    let int_len = digits.find('.').unwrap_or(digits.len());
    if int_len >= width {
        return number.to_string();
    }
    format!("{}{}{}", sign, "0".repeat(width - int_len), digits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number_truncates() {
        assert_eq!(format_number(1.23456, 4), "1.2345");
        assert_eq!(format_number(1.99999, 2), "1.99");
        assert_eq!(format_number(10.0, 4), "10");
        assert_eq!(format_number(0.5, 4), "0.5");
        assert_eq!(format_number(-2.25, 1), "-2.2");
        assert_eq!(format_number(3.7, 0), "3");
    }

    #[test]
    fn test_format_number_huge_precision_keeps_all_digits() {
        assert_eq!(format_number(1.25, usize::MAX), "1.25");
        assert_eq!(format_number(-3.0, usize::MAX), "-3");
    }

    #[test]
    fn test_format_number_negative_zero() {
        assert_eq!(format_number(-0.0, 4), "0");
        assert_eq!(format_number(-0.00001, 4), "0");
    }

    #[test]
    fn test_pad_integer_part() {
        assert_eq!(pad_integer_part("1", 2), "01");
        assert_eq!(pad_integer_part("38.2", 2), "38.2");
        assert_eq!(pad_integer_part("0.5", 3), "000.5");
        assert_eq!(pad_integer_part("-3", 2), "-03");
        assert_eq!(pad_integer_part("120", 1), "120");
    }

    #[test]
    fn test_defaults() {
        let opts = FormatOptions::default();
        assert!(!opts.compact);
        assert_eq!(opts.precision, 4);
        assert_eq!(opts.min_command_digits, 2);
        assert_eq!(opts.min_line_digits, 1);
        assert!(FormatOptions::compact().compact);
    }
}
