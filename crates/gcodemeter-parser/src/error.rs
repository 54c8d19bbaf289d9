//! Error types for the line codec.
//!
//! Parsing failures carry the partially parsed line so callers can still
//! use the words extracted before the bad token. Query and mutation errors
//! apply to a single call and never invalidate the line.

use thiserror::Error;

use crate::line::Line;

/// Errors raised by word queries and mutations on a [`Line`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LineError {
    /// More than one word matches a letter that must be unique for the call.
    #[error("Ambiguous word '{letter}': {count} words match")]
    AmbiguousWord { letter: char, count: usize },

    /// A full code was given as a modal group but has no table entry.
    #[error("Unknown modal group for code {code}")]
    UnknownModalGroup { code: String },

    /// A code string could not be read as letter plus number.
    #[error("Invalid code '{code}'")]
    InvalidCode { code: String },

    /// A word letter must be a single ASCII letter.
    #[error("Invalid word letter '{letter}'")]
    InvalidLetter { letter: char },

    /// Word values must be finite numbers.
    #[error("Non-finite value for word '{letter}'")]
    NonFiniteValue { letter: char },
}

/// A line contained a token the lexer could not read.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Unparseable token '{token}' at column {column}")]
pub struct ParseError {
    /// The offending token text.
    pub token: String,
    /// Byte offset of the token in the source line.
    pub column: usize,
    partial: Box<Line>,
}

impl ParseError {
    pub(crate) fn new(token: impl Into<String>, column: usize, partial: Line) -> Self {
        Self {
            token: token.into(),
            column,
            partial: Box::new(partial),
        }
    }

    /// Words and comment extracted before the bad token.
    pub fn partial(&self) -> &Line {
        &self.partial
    }

    /// Take ownership of the partially parsed line.
    pub fn into_partial(self) -> Line {
        *self.partial
    }
}

/// Result type alias for line operations.
pub type LineResult<T> = Result<T, LineError>;
