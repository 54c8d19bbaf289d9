//! G-code words

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::format::{format_number, pad_integer_part, FormatOptions};

/// Tolerance used when comparing code values such as `G38.2`
const CODE_EPSILON: f64 = 1e-9;

/// A single letter and number pair, e.g. `X10.5`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Word {
    /// Upper case ASCII letter
    pub letter: char,
    /// Signed value
    pub value: f64,
}

impl Word {
    /// Create a word, normalising the letter to upper case
    pub fn new(letter: char, value: f64) -> Self {
        Self {
            letter: letter.to_ascii_uppercase(),
            value,
        }
    }

    /// Read a full code such as `"G1"`, `"g38.2"` or `"M03"`
    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim();
        let mut chars = code.chars();
        let letter = chars.next().filter(char::is_ascii_alphabetic)?;
        let value = chars.as_str().trim().parse::<f64>().ok()?;
        value.is_finite().then(|| Self::new(letter, value))
    }

    /// Whether this is a G or M command word
    pub fn is_command(&self) -> bool {
        matches!(self.letter, 'G' | 'M')
    }

    /// Same letter and numerically equal value
    pub fn matches(&self, other: &Word) -> bool {
        self.letter == other.letter && (self.value - other.value).abs() < CODE_EPSILON
    }

    /// Write the word using the given options
    pub fn format(&self, opts: &FormatOptions) -> String {
        let number = format_number(self.value, opts.precision);
        let number = match self.letter {
            'G' | 'M' => pad_integer_part(&number, opts.min_command_digits),
            'N' => pad_integer_part(&number, opts.min_line_digits),
            _ => number,
        };
        format!("{}{}", self.letter, number)
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(&FormatOptions::default()))
    }
}
