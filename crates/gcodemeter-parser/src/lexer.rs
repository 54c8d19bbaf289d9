//! G-code line lexer
//!
//! Splits a line into comments and words. Comment spans are blanked out
//! (same byte length) so token columns still point into the source line.

use regex::Regex;
use std::sync::OnceLock;

use crate::line::CommentStyle;
use crate::word::Word;

/// Comments and blanked code of one line
#[derive(Debug, Default)]
pub(crate) struct Stripped {
    /// Source text with every comment span replaced by spaces
    pub code: String,
    /// Trimmed comment texts in source order (empty comments dropped)
    pub comments: Vec<String>,
    /// Style of the first comment found
    pub style: Option<CommentStyle>,
}

/// Remove parenthesis and semicolon comments from a line
///
/// An unclosed `(` runs to the end of the line. A `;` ends the code part.
pub(crate) fn strip_comments(text: &str) -> Stripped {
    let mut out = Stripped {
        code: String::with_capacity(text.len()),
        ..Default::default()
    };
    let mut rest = text;

    loop {
        let Some(start) = rest.find(['(', ';']) else {
            out.code.push_str(rest);
            break;
        };
        out.code.push_str(&rest[..start]);

        let (style, body, consumed) = if rest[start..].starts_with(';') {
            (CommentStyle::Semicolon, &rest[start + 1..], rest.len() - start)
        } else {
            match rest[start + 1..].find(')') {
                Some(end) => (
                    CommentStyle::Parenthesis,
                    &rest[start + 1..start + 1 + end],
                    end + 2,
                ),
                None => (
                    CommentStyle::Parenthesis,
                    &rest[start + 1..],
                    rest.len() - start,
                ),
            }
        };

        out.style.get_or_insert(style);
        let body = body.trim();
        if !body.is_empty() {
            out.comments.push(body.to_string());
        }
        out.code.push_str(&" ".repeat(consumed));
        rest = &rest[start + consumed..];
    }

    out
}

fn word_regex() -> &'static Regex {
    static WORD_REGEX: OnceLock<Regex> = OnceLock::new();
    WORD_REGEX.get_or_init(|| {
        Regex::new(r"^([A-Za-z])\s*([+-]?(?:\d+(?:\.\d*)?|\.\d+))").expect("invalid regex pattern")
    })
}

/// A token the lexer could not read
#[derive(Debug, PartialEq)]
pub(crate) struct BadToken {
    pub text: String,
    pub column: usize,
}

/// Tokenize blanked code into words
///
/// Stops at the first unreadable token and returns the words read so far
/// together with the token.
pub(crate) fn tokenize(code: &str) -> (Vec<Word>, Option<BadToken>) {
    let mut words = Vec::new();

    // Program delimiter lines carry no words
    if code.trim() == "%" {
        return (words, None);
    }

    let mut pos = 0;
    while pos < code.len() {
        let rest = &code[pos..];
        let trimmed = rest.trim_start();
        if trimmed.is_empty() {
            break;
        }
        pos += rest.len() - trimmed.len();

        let Some(caps) = word_regex().captures(trimmed) else {
            let end = trimmed
                .find(char::is_whitespace)
                .unwrap_or(trimmed.len());
            return (
                words,
                Some(BadToken {
                    text: trimmed[..end].to_string(),
                    column: pos,
                }),
            );
        };

        let letter = caps[1].chars().next().unwrap_or('?');
        match caps[2].parse::<f64>() {
            Ok(value) => words.push(Word::new(letter, value)),
            Err(_) => {
                return (
                    words,
                    Some(BadToken {
                        text: caps[0].to_string(),
                        column: pos,
                    }),
                )
            }
        }
        pos += caps[0].len();
    }

    (words, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_parenthesis_comments() {
        let s = strip_comments("G1 (first) X1 (second)");
        assert_eq!(s.comments, vec!["first", "second"]);
        assert_eq!(s.style, Some(CommentStyle::Parenthesis));
        assert_eq!(s.code.len(), "G1 (first) X1 (second)".len());
        assert_eq!(s.code.trim(), "G1         X1");
    }

    #[test]
    fn test_strip_semicolon_comment() {
        let s = strip_comments("G0 X5 ; rapid (fast)");
        assert_eq!(s.comments, vec!["rapid (fast)"]);
        assert_eq!(s.style, Some(CommentStyle::Semicolon));
        assert_eq!(s.code.trim_end(), "G0 X5");
    }

    #[test]
    fn test_strip_unclosed_parenthesis() {
        let s = strip_comments("G1 X1 (never closed");
        assert_eq!(s.comments, vec!["never closed"]);
        assert_eq!(s.code.trim_end(), "G1 X1");
    }

    #[test]
    fn test_tokenize_words() {
        let (words, bad) = tokenize("G1 X10.5 Y-2 z+.5 F1500.");
        assert!(bad.is_none());
        assert_eq!(
            words,
            vec![
                Word::new('G', 1.0),
                Word::new('X', 10.5),
                Word::new('Y', -2.0),
                Word::new('Z', 0.5),
                Word::new('F', 1500.0),
            ]
        );
    }

    #[test]
    fn test_tokenize_compact_and_spaced_forms() {
        let (words, bad) = tokenize("G01X1Y2");
        assert!(bad.is_none());
        assert_eq!(words.len(), 3);

        let (words, bad) = tokenize("G 1 X 3");
        assert!(bad.is_none());
        assert_eq!(words, vec![Word::new('G', 1.0), Word::new('X', 3.0)]);
    }

    #[test]
    fn test_tokenize_reports_bad_token() {
        let (words, bad) = tokenize("G1 Xabc Y2");
        assert_eq!(words, vec![Word::new('G', 1.0)]);
        assert_eq!(
            bad,
            Some(BadToken {
                text: "Xabc".to_string(),
                column: 3
            })
        );

        let (_, bad) = tokenize("$H");
        assert_eq!(bad.map(|b| b.text), Some("$H".to_string()));
    }

    #[test]
    fn test_percent_line() {
        let (words, bad) = tokenize("%");
        assert!(words.is_empty());
        assert!(bad.is_none());
    }
}
