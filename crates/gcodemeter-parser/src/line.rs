//! Parsed G-code lines
//!
//! A [`Line`] keeps its words in source order, one merged comment and the
//! original text. Unmodified lines write back their original text byte for
//! byte; modified lines are rebuilt from their words.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{LineError, LineResult, ParseError};
use crate::format::FormatOptions;
use crate::lexer::{strip_comments, tokenize};
use crate::modal::{ModalGroup, ModalGroupTable};
use crate::word::Word;

/// Axis letters returned by [`Line::coords`] by default
pub const DEFAULT_COORD_AXES: [char; 6] = ['X', 'Y', 'Z', 'A', 'B', 'C'];

/// Canonical order used when inserting coordinate words
const COORD_ORDER: [char; 9] = ['X', 'Y', 'Z', 'A', 'B', 'C', 'I', 'J', 'K'];

/// Separator used when several comments are merged
const COMMENT_SEPARATOR: &str = "; ";

/// How a comment is written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CommentStyle {
    /// `(comment)`
    #[default]
    Parenthesis,
    /// `; comment`
    Semicolon,
}

/// Comment text with its style
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub text: String,
    pub style: CommentStyle,
}

impl Comment {
    pub fn new(text: impl Into<String>, style: CommentStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }
}

impl fmt::Display for Comment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Parentheses cannot nest, fall back to a semicolon comment
        let nested = self.text.contains(['(', ')']);
        match self.style {
            CommentStyle::Parenthesis if !nested => write!(f, "({})", self.text),
            _ => write!(f, "; {}", self.text),
        }
    }
}

/// A modal group given directly or through one of its codes (`"G1"`)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GroupRef<'a> {
    Group(ModalGroup),
    Code(&'a str),
}

impl From<ModalGroup> for GroupRef<'_> {
    fn from(group: ModalGroup) -> Self {
        GroupRef::Group(group)
    }
}

impl<'a> From<&'a str> for GroupRef<'a> {
    fn from(code: &'a str) -> Self {
        GroupRef::Code(code)
    }
}

impl GroupRef<'_> {
    fn resolve(self) -> LineResult<ModalGroup> {
        match self {
            GroupRef::Group(group) => Ok(group),
            GroupRef::Code(code) => ModalGroupTable::global().group_of_code(code),
        }
    }
}

/// One line of G-code
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Line {
    words: Vec<Word>,
    comment: Option<Comment>,
    raw: Option<String>,
    modified: bool,
}

impl Line {
    /// Create an empty line with no source text
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a line from words; it has no source text
    pub fn from_words(words: impl IntoIterator<Item = Word>) -> Self {
        Self {
            words: words.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Parse one line of text
    ///
    /// Comments are merged with `"; "`. An unreadable token yields a
    /// [`ParseError`] holding the words read before it.
    pub fn parse(text: &str) -> Result<Line, ParseError> {
        let stripped = strip_comments(text);
        let (words, bad) = tokenize(&stripped.code);

        let comment = (!stripped.comments.is_empty()).then(|| {
            Comment::new(
                stripped.comments.join(COMMENT_SEPARATOR),
                stripped.style.unwrap_or_default(),
            )
        });

        let line = Line {
            words,
            comment,
            raw: Some(text.to_string()),
            modified: false,
        };

        match bad {
            None => Ok(line),
            Some(bad) => {
                tracing::trace!("Unparseable token '{}' at column {}", bad.text, bad.column);
                Err(ParseError::new(bad.text, bad.column, line))
            }
        }
    }

    /// Words in line order
    pub fn words(&self) -> &[Word] {
        &self.words
    }

    /// Merged comment, if any
    pub fn comment(&self) -> Option<&Comment> {
        self.comment.as_ref()
    }

    /// Original source text, if the line was parsed
    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }

    /// Whether the line changed since parsing
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// True when the line has neither words nor comment
    pub fn is_empty(&self) -> bool {
        self.words.is_empty() && self.comment.is_none()
    }

    fn matching(
        &self,
        letter: char,
        group: Option<ModalGroup>,
    ) -> impl Iterator<Item = (usize, &Word)> + '_ {
        let letter = letter.to_ascii_uppercase();
        let table = ModalGroupTable::global();
        self.words.iter().enumerate().filter(move |(_, w)| {
            w.letter == letter
                && group.is_none_or(|g| table.group_of(w.letter, w.value) == Some(g))
        })
    }

    fn single(&self, letter: char, group: Option<ModalGroup>) -> LineResult<Option<f64>> {
        let mut found = self.matching(letter, group);
        let Some((_, first)) = found.next() else {
            return Ok(None);
        };
        let extra = found.count();
        if extra > 0 {
            return Err(LineError::AmbiguousWord {
                letter: letter.to_ascii_uppercase(),
                count: extra + 1,
            });
        }
        Ok(Some(first.value))
    }

    /// Value of the only word with this letter
    ///
    /// Returns `Ok(None)` when absent and [`LineError::AmbiguousWord`] when
    /// several words share the letter.
    pub fn get(&self, letter: char) -> LineResult<Option<f64>> {
        self.single(letter, None)
    }

    /// Like [`get`](Self::get) but only counts words of a modal group
    ///
    /// ```
    /// use gcodemeter_parser::Line;
    ///
    /// let line = Line::parse("G1 G90 X10").unwrap();
    /// assert_eq!(line.get_in('G', "G0"), Ok(Some(1.0)));
    /// ```
    pub fn get_in<'a>(&self, letter: char, group: impl Into<GroupRef<'a>>) -> LineResult<Option<f64>> {
        let group = group.into().resolve()?;
        self.single(letter, Some(group))
    }

    /// Every value with this letter, in line order
    pub fn get_all(&self, letter: char) -> Vec<f64> {
        self.matching(letter, None).map(|(_, w)| w.value).collect()
    }

    /// Every value with this letter within a modal group, in line order
    pub fn get_all_in<'a>(&self, letter: char, group: impl Into<GroupRef<'a>>) -> LineResult<Vec<f64>> {
        let group = group.into().resolve()?;
        Ok(self
            .matching(letter, Some(group))
            .map(|(_, w)| w.value)
            .collect())
    }

    /// Presence test for a letter (`"X"`) or a full code (`"G1"`)
    pub fn has(&self, query: &str) -> bool {
        let query = query.trim();
        let mut chars = query.chars();
        match (chars.next(), chars.as_str()) {
            (None, _) => false,
            (Some(letter), "") => self.matching(letter, None).next().is_some(),
            (Some(_), _) => Word::from_code(query)
                .is_some_and(|code| self.words.iter().any(|w| w.matches(&code))),
        }
    }

    /// Presence test for a letter restricted to a modal group
    pub fn has_in<'a>(&self, letter: char, group: impl Into<GroupRef<'a>>) -> LineResult<bool> {
        let group = group.into().resolve()?;
        Ok(self.matching(letter, Some(group)).next().is_some())
    }

    /// Set, update or (with `None`) remove the word with this letter
    ///
    /// New words go to the position chosen by the placement rule. The line
    /// is marked modified only when its word list changes, so removing an
    /// absent letter leaves the flag untouched.
    pub fn set(&mut self, letter: char, value: Option<f64>) -> LineResult<()> {
        self.set_word(letter, value, None)
    }

    /// Like [`set`](Self::set) but inserts a new word at `pos`
    pub fn set_at(&mut self, letter: char, value: Option<f64>, pos: usize) -> LineResult<()> {
        self.set_word(letter, value, Some(pos))
    }

    /// Remove the word with this letter
    pub fn remove(&mut self, letter: char) -> LineResult<()> {
        self.set(letter, None)
    }

    fn set_word(&mut self, letter: char, value: Option<f64>, pos: Option<usize>) -> LineResult<()> {
        if !letter.is_ascii_alphabetic() {
            return Err(LineError::InvalidLetter { letter });
        }
        let letter = letter.to_ascii_uppercase();
        if value.is_some_and(|v| !v.is_finite()) {
            return Err(LineError::NonFiniteValue { letter });
        }

        let positions: Vec<usize> = self.matching(letter, None).map(|(i, _)| i).collect();
        if positions.len() > 1 {
            return Err(LineError::AmbiguousWord {
                letter,
                count: positions.len(),
            });
        }

        match (positions.first().copied(), value) {
            (Some(index), None) => {
                self.words.remove(index);
                self.modified = true;
            }
            (None, None) => {}
            (Some(index), Some(value)) => {
                self.words[index].value = value;
                self.modified = true;
            }
            (None, Some(value)) => {
                let index = match pos {
                    Some(pos) => pos.min(self.words.len()),
                    None => self.insertion_index(letter),
                };
                self.words.insert(index, Word::new(letter, value));
                self.modified = true;
            }
        }
        Ok(())
    }

    /// Placement rule for a new word
    ///
    /// `N` first, `G`/`M` next (after a leading `N`), coordinates in
    /// canonical order, everything else at the end.
    fn insertion_index(&self, letter: char) -> usize {
        let rank = |c: char| COORD_ORDER.iter().position(|&o| o == c);
        match letter {
            'N' => 0,
            'G' | 'M' => match self.words.first() {
                Some(w) if w.letter == 'N' => 1,
                _ => 0,
            },
            _ => {
                let Some(own) = rank(letter) else {
                    return self.words.len();
                };
                if let Some(i) = self
                    .words
                    .iter()
                    .position(|w| rank(w.letter).is_some_and(|r| r > own))
                {
                    return i;
                }
                self.words
                    .iter()
                    .rposition(|w| rank(w.letter).is_some())
                    .map_or(self.words.len(), |i| i + 1)
            }
        }
    }

    /// Append to the comment, joining with `"; "`
    ///
    /// Blank text is ignored.
    pub fn add_comment(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        match &mut self.comment {
            Some(comment) => {
                comment.text.push_str(COMMENT_SEPARATOR);
                comment.text.push_str(text);
            }
            None => self.comment = Some(Comment::new(text, CommentStyle::default())),
        }
        self.modified = true;
    }

    /// Positional snapshot of axis words, `None` where absent
    pub fn coords(&self, axes: &[char]) -> LineResult<Vec<Option<f64>>> {
        axes.iter().map(|&axis| self.get(axis)).collect()
    }

    /// Snapshot of the default `X Y Z A B C` axes
    pub fn default_coords(&self) -> LineResult<Vec<Option<f64>>> {
        self.coords(&DEFAULT_COORD_AXES)
    }

    /// Write the line as text
    ///
    /// An unmodified parsed line in non-compact mode returns its source
    /// text verbatim.
    pub fn format(&self, opts: &FormatOptions) -> String {
        if !opts.compact && !self.modified {
            if let Some(raw) = &self.raw {
                return raw.clone();
            }
        }

        let separator = if opts.compact { "" } else { " " };
        let mut out = self
            .words
            .iter()
            .map(|w| w.format(opts))
            .collect::<Vec<_>>()
            .join(separator);

        if !opts.compact {
            if let Some(comment) = &self.comment {
                if !out.is_empty() {
                    out.push(' ');
                }
                out.push_str(&comment.to_string());
            }
        }
        out
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(&FormatOptions::default()))
    }
}

impl std::str::FromStr for Line {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Line::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Line {
        Line::parse(text).expect("line should parse")
    }

    #[test]
    fn test_parse_words_and_comment() {
        let line = parse("G1 X1 (move to start)");
        assert_eq!(line.words(), &[Word::new('G', 1.0), Word::new('X', 1.0)]);
        let comment = line.comment().unwrap();
        assert_eq!(comment.text, "move to start");
        assert_eq!(comment.style, CommentStyle::Parenthesis);
        assert!(!line.is_modified());
    }

    #[test]
    fn test_multiple_comments_are_merged() {
        let line = parse("(one) G0 X1 (two) ; three");
        assert_eq!(line.comment().unwrap().text, "one; two; three");
        assert_eq!(line.comment().unwrap().style, CommentStyle::Parenthesis);

        let line = parse("M5 ; stop");
        assert_eq!(line.comment().unwrap().style, CommentStyle::Semicolon);
    }

    #[test]
    fn test_unmodified_line_is_byte_stable() {
        for text in ["g1x1   y2 ;odd spacing", "N10 G01 X1.50000", "", "%", "  (only)  "] {
            assert_eq!(parse(text).to_string(), text);
        }
    }

    #[test]
    fn test_compact_omits_comment_and_spaces() {
        let line = parse("G1 X1 (move to start)");
        assert_eq!(line.format(&FormatOptions::compact()), "G01X1");
    }

    #[test]
    fn test_rebuilt_line_after_modification() {
        let mut line = parse("G1 X1 (move to start)");
        line.set('Y', Some(2.0)).unwrap();
        assert_eq!(line.to_string(), "G01 X1 Y2 (move to start)");

        let mut line = parse("g0 x1.123456 ; fast");
        line.set('F', Some(100.0)).unwrap();
        assert_eq!(line.to_string(), "G00 X1.1234 F100 ; fast");
    }

    #[test]
    fn test_get_set_remove() {
        let mut line = parse("G1 X10 Y5");
        line.set('x', Some(12.5)).unwrap();
        assert_eq!(line.get('X'), Ok(Some(12.5)));
        assert!(line.is_modified());

        line.set('X', None).unwrap();
        assert!(!line.has("X"));
        assert_eq!(line.get('X'), Ok(None));

        line.remove('Y').unwrap();
        assert_eq!(line.words(), &[Word::new('G', 1.0)]);

        // Removing an absent word is a no-op
        line.remove('Z').unwrap();
        assert_eq!(line.words().len(), 1);
    }

    #[test]
    fn test_ambiguous_words() {
        let mut line = parse("G1 X1 X2");
        assert_eq!(
            line.get('X'),
            Err(LineError::AmbiguousWord {
                letter: 'X',
                count: 2
            })
        );
        assert_eq!(line.get_all('x'), vec![1.0, 2.0]);
        assert!(line.set('X', Some(3.0)).is_err());
        assert!(!line.is_modified());
        assert_eq!(line.get('G'), Ok(Some(1.0)));
    }

    #[test]
    fn test_modal_group_queries() {
        let line = parse("G90 G1 X10");
        assert_eq!(line.get('G'), Err(LineError::AmbiguousWord { letter: 'G', count: 2 }));
        assert_eq!(line.get_in('G', "G1"), Ok(Some(1.0)));
        assert_eq!(line.get_in('G', ModalGroup::Distance), Ok(Some(90.0)));
        assert_eq!(line.get_in('G', ModalGroup::Units), Ok(None));
        assert_eq!(
            line.get_in('G', "G4"),
            Err(LineError::UnknownModalGroup {
                code: "G4".to_string()
            })
        );
        assert_eq!(line.get_all_in('G', ModalGroup::Motion), Ok(vec![1.0]));
        assert_eq!(line.has_in('G', "G91"), Ok(true));
        assert_eq!(line.has_in('G', ModalGroup::Plane), Ok(false));
    }

    #[test]
    fn test_group_query_ignores_legality() {
        // Two motion codes on one line are illegal but still queryable
        let line = parse("G0 G1 X1");
        assert_eq!(line.get_all_in('G', "G1"), Ok(vec![0.0, 1.0]));
        assert!(line.get_in('G', "G1").is_err());
    }

    #[test]
    fn test_has_letter_and_code() {
        let line = parse("G01 X10 M3");
        assert!(line.has("G"));
        assert!(line.has("x"));
        assert!(line.has("G1"));
        assert!(line.has("M3"));
        assert!(!line.has("G0"));
        assert!(!line.has("Y"));
        assert!(!line.has(""));
        assert!(!line.has("G?"));
    }

    #[test]
    fn test_placement_rule() {
        let mut line = parse("X1 F100");
        line.set('G', Some(1.0)).unwrap();
        line.set('N', Some(20.0)).unwrap();
        line.set('Z', Some(3.0)).unwrap();
        line.set('Y', Some(2.0)).unwrap();
        line.set('S', Some(1000.0)).unwrap();
        assert_eq!(line.to_string(), "N20 G01 X1 Y2 Z3 F100 S1000");

        let mut line = parse("N5 X1");
        line.set('M', Some(3.0)).unwrap();
        assert_eq!(line.to_string(), "N5 M03 X1");

        let mut line = parse("G2 X1 J2");
        line.set('I', Some(0.5)).unwrap();
        assert_eq!(line.to_string(), "G02 X1 I0.5 J2");

        let mut line = parse("G0 F100");
        line.set('X', Some(1.0)).unwrap();
        assert_eq!(line.to_string(), "G00 F100 X1");
    }

    #[test]
    fn test_set_at_position() {
        let mut line = parse("G1 X1");
        line.set_at('F', Some(300.0), 0).unwrap();
        assert_eq!(line.to_string(), "F300 G01 X1");
        line.set_at('S', Some(1.0), 99).unwrap();
        assert_eq!(line.to_string(), "F300 G01 X1 S1");
    }

    #[test]
    fn test_set_rejects_bad_input() {
        let mut line = Line::new();
        assert_eq!(
            line.set('?', Some(1.0)),
            Err(LineError::InvalidLetter { letter: '?' })
        );
        assert_eq!(
            line.set('X', Some(f64::NAN)),
            Err(LineError::NonFiniteValue { letter: 'X' })
        );
    }

    #[test]
    fn test_add_comment() {
        let mut line = parse("G0 X1 (a)");
        line.add_comment("b");
        assert_eq!(line.comment().unwrap().text, "a; b");
        assert_eq!(line.to_string(), "G00 X1 (a; b)");

        let mut line = Line::from_words([Word::new('M', 5.0)]);
        line.add_comment("spindle off");
        assert_eq!(line.to_string(), "M05 (spindle off)");
    }

    #[test]
    fn test_blank_comment_is_ignored() {
        let mut line = parse("G1 X1");
        line.add_comment("   ");
        assert!(line.comment().is_none());
        assert!(!line.is_modified());
        assert_eq!(line.to_string(), "G1 X1");

        let mut line = parse("G1 X1 (keep)");
        line.add_comment("");
        assert_eq!(line.comment().unwrap().text, "keep");
    }

    #[test]
    fn test_removing_absent_word_keeps_line_unmodified() {
        let mut line = parse("G1 X1");
        line.set('Y', None).unwrap();
        assert!(!line.is_modified());
        assert_eq!(line.to_string(), "G1 X1");

        line.set('X', None).unwrap();
        assert!(line.is_modified());
    }

    #[test]
    fn test_nested_parenthesis_comment_falls_back_to_semicolon() {
        let mut line = parse("G0 X1");
        line.add_comment("f(x)");
        assert_eq!(line.to_string(), "G00 X1 ; f(x)");
        let reparsed = parse(&line.to_string());
        assert_eq!(reparsed.comment().unwrap().text, "f(x)");
        assert_eq!(reparsed.comment().unwrap().style, CommentStyle::Semicolon);
    }

    #[test]
    fn test_coords() {
        let line = parse("G1 X1 Z3 A90");
        assert_eq!(
            line.default_coords(),
            Ok(vec![Some(1.0), None, Some(3.0), Some(90.0), None, None])
        );
        assert_eq!(line.coords(&['Z', 'X']), Ok(vec![Some(3.0), Some(1.0)]));
    }

    #[test]
    fn test_clone_is_independent() {
        let original = parse("G1 X1");
        let mut copy = original.clone();
        copy.set('X', Some(5.0)).unwrap();
        assert_eq!(original.get('X'), Ok(Some(1.0)));
        assert_eq!(copy.get('X'), Ok(Some(5.0)));
        assert!(!original.is_modified());
    }

    #[test]
    fn test_from_words_has_no_raw_text() {
        let line = Line::from_words([Word::new('G', 0.0), Word::new('X', -0.0)]);
        assert_eq!(line.raw(), None);
        assert_eq!(line.to_string(), "G00 X0");
    }
}
