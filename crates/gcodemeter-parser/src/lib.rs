//! # GCodeMeter Parser
//!
//! Line-level G-code codec: parse a line into words and comments, query and
//! edit words, and write it back. Unmodified lines round-trip byte for byte.
//!
//! Also provides the modal group table used to classify G and M codes.

pub mod error;
pub mod format;
mod lexer;
pub mod line;
pub mod modal;
pub mod word;

pub use error::{LineError, LineResult, ParseError};
pub use format::FormatOptions;
pub use line::{Comment, CommentStyle, GroupRef, Line, DEFAULT_COORD_AXES};
pub use modal::{ModalGroup, ModalGroupTable};
pub use word::Word;
