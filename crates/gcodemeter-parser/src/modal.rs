//! Modal group table
//!
//! Classifies G and M codes into mutually exclusive modal groups. Group
//! numbers follow RS274/NGC, so a few slots are empty. Non-modal one-shot
//! codes (dwell, offsets, homing) are kept apart and never belong to a group.
//!
//! The table is built once on first use and shared by reference.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use crate::error::LineError;
use crate::word::Word;

/// A modal group
///
/// Only one member of a group can be in effect at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModalGroup {
    /// G group 1 (G0, G1, G2, G3, probing, canned cycles)
    Motion,
    /// G group 2 (G17, G18, G19)
    Plane,
    /// G group 3 (G90, G91)
    Distance,
    /// G group 4 (G90.1, G91.1)
    ArcDistance,
    /// G group 5 (G93, G94, G95)
    FeedRateMode,
    /// G group 6 (G20, G21)
    Units,
    /// G group 7 (G40, G41, G42)
    CutterCompensation,
    /// G group 8 (G43, G49)
    ToolLengthOffset,
    /// G group 10 (G98, G99)
    CannedCycleReturn,
    /// G group 12 (G54 to G59.3)
    CoordinateSystem,
    /// G group 13 (G61, G61.1, G64)
    PathControl,
    /// G group 14 (G96, G97)
    SpindleSpeedMode,
    /// G group 15 (G7, G8)
    LatheDiameter,
    /// M group 4 (M0, M1, M2, M30, M60)
    ProgramFlow,
    /// M group 6 (M6)
    ToolChange,
    /// M group 7 (M3, M4, M5)
    Spindle,
    /// M group 8 (M7, M8, M9)
    Coolant,
    /// M group 9 (M48 to M53)
    Override,
}

impl ModalGroup {
    /// Letter of the codes in this group
    pub fn letter(self) -> char {
        match self {
            Self::ProgramFlow | Self::ToolChange | Self::Spindle | Self::Coolant | Self::Override => {
                'M'
            }
            _ => 'G',
        }
    }

    /// RS274/NGC group number (unique per letter)
    pub fn number(self) -> u8 {
        match self {
            Self::Motion => 1,
            Self::Plane => 2,
            Self::Distance => 3,
            Self::ArcDistance => 4,
            Self::FeedRateMode => 5,
            Self::Units => 6,
            Self::CutterCompensation => 7,
            Self::ToolLengthOffset => 8,
            Self::CannedCycleReturn => 10,
            Self::CoordinateSystem => 12,
            Self::PathControl => 13,
            Self::SpindleSpeedMode => 14,
            Self::LatheDiameter => 15,
            Self::ProgramFlow => 4,
            Self::ToolChange => 6,
            Self::Spindle => 7,
            Self::Coolant => 8,
            Self::Override => 9,
        }
    }

    /// Human readable name
    pub fn name(self) -> &'static str {
        match self {
            Self::Motion => "motion",
            Self::Plane => "plane selection",
            Self::Distance => "distance mode",
            Self::ArcDistance => "arc distance mode",
            Self::FeedRateMode => "feed rate mode",
            Self::Units => "units",
            Self::CutterCompensation => "cutter compensation",
            Self::ToolLengthOffset => "tool length offset",
            Self::CannedCycleReturn => "canned cycle return mode",
            Self::CoordinateSystem => "coordinate system",
            Self::PathControl => "path control mode",
            Self::SpindleSpeedMode => "spindle speed mode",
            Self::LatheDiameter => "lathe diameter mode",
            Self::ProgramFlow => "program flow",
            Self::ToolChange => "tool change",
            Self::Spindle => "spindle control",
            Self::Coolant => "coolant control",
            Self::Override => "override control",
        }
    }
}

impl std::fmt::Display for ModalGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{} ({})", self.letter(), self.number(), self.name())
    }
}

type GroupSlot = (u8, Option<ModalGroup>, &'static [&'static str]);

/// G-code groups; slot 9 is reserved and unused
const G_GROUPS: [GroupSlot; 14] = [
    (
        1,
        Some(ModalGroup::Motion),
        &[
            "G0", "G1", "G2", "G3", "G38.2", "G38.3", "G38.4", "G38.5", "G80", "G81", "G82",
            "G83", "G84", "G85", "G86", "G87", "G88", "G89",
        ],
    ),
    (2, Some(ModalGroup::Plane), &["G17", "G18", "G19"]),
    (3, Some(ModalGroup::Distance), &["G90", "G91"]),
    (4, Some(ModalGroup::ArcDistance), &["G90.1", "G91.1"]),
    (5, Some(ModalGroup::FeedRateMode), &["G93", "G94", "G95"]),
    (6, Some(ModalGroup::Units), &["G20", "G21"]),
    (
        7,
        Some(ModalGroup::CutterCompensation),
        &["G40", "G41", "G42", "G41.1", "G42.1"],
    ),
    (8, Some(ModalGroup::ToolLengthOffset), &["G43", "G43.1", "G49"]),
    (9, None, &[]),
    (10, Some(ModalGroup::CannedCycleReturn), &["G98", "G99"]),
    (
        12,
        Some(ModalGroup::CoordinateSystem),
        &[
            "G54", "G55", "G56", "G57", "G58", "G59", "G59.1", "G59.2", "G59.3",
        ],
    ),
    (13, Some(ModalGroup::PathControl), &["G61", "G61.1", "G64"]),
    (14, Some(ModalGroup::SpindleSpeedMode), &["G96", "G97"]),
    (15, Some(ModalGroup::LatheDiameter), &["G7", "G8"]),
];

/// M-code groups; slots 1, 2, 3, 5 and 10 are unused
const M_GROUPS: [GroupSlot; 10] = [
    (1, None, &[]),
    (2, None, &[]),
    (3, None, &[]),
    (
        4,
        Some(ModalGroup::ProgramFlow),
        &["M0", "M1", "M2", "M30", "M60"],
    ),
    (5, None, &[]),
    (6, Some(ModalGroup::ToolChange), &["M6"]),
    (7, Some(ModalGroup::Spindle), &["M3", "M4", "M5"]),
    (8, Some(ModalGroup::Coolant), &["M7", "M8", "M9"]),
    (
        9,
        Some(ModalGroup::Override),
        &["M48", "M49", "M50", "M51", "M52", "M53"],
    ),
    (10, None, &[]),
];

/// One-shot codes outside every modal group
const NON_MODAL: &[&str] = &[
    "G4", "G10", "G28", "G28.1", "G30", "G30.1", "G53", "G92", "G92.1", "G92.2", "G92.3",
];

/// Lookup key: letter plus the code value in tenths (`G38.2` -> `('G', 382)`)
type CodeKey = (char, i64);

fn code_key(letter: char, value: f64) -> Option<CodeKey> {
    let tenths = value * 10.0;
    let rounded = tenths.round();
    if !tenths.is_finite() || (tenths - rounded).abs() > 1e-6 {
        return None;
    }
    Some((letter.to_ascii_uppercase(), rounded as i64))
}

fn key_of_code(code: &str) -> Option<CodeKey> {
    let word = Word::from_code(code)?;
    code_key(word.letter, word.value)
}

/// Immutable code-to-group lookup
#[derive(Debug)]
pub struct ModalGroupTable {
    by_code: HashMap<CodeKey, ModalGroup>,
    non_modal: HashSet<CodeKey>,
}

impl ModalGroupTable {
    /// The process-wide table, built on first use
    pub fn global() -> &'static ModalGroupTable {
        static TABLE: OnceLock<ModalGroupTable> = OnceLock::new();
        TABLE.get_or_init(Self::build)
    }

    fn build() -> Self {
        let mut by_code = HashMap::new();
        for (_, group, codes) in G_GROUPS.iter().chain(M_GROUPS.iter()) {
            let Some(group) = group else {
                continue;
            };
            for code in codes.iter() {
                if let Some(key) = key_of_code(code) {
                    by_code.insert(key, *group);
                }
            }
        }
        let non_modal = NON_MODAL.iter().filter_map(|c| key_of_code(c)).collect();
        Self { by_code, non_modal }
    }

    /// Group of a code given as letter and value, if it is modal
    pub fn group_of(&self, letter: char, value: f64) -> Option<ModalGroup> {
        code_key(letter, value).and_then(|key| self.by_code.get(&key).copied())
    }

    /// Group of a full code such as `"G1"` or `"m03"`
    pub fn group_of_code(&self, code: &str) -> Result<ModalGroup, LineError> {
        let word = Word::from_code(code).ok_or_else(|| LineError::InvalidCode {
            code: code.to_string(),
        })?;
        self.group_of(word.letter, word.value)
            .ok_or_else(|| LineError::UnknownModalGroup {
                code: code.to_string(),
            })
    }

    /// Codes belonging to a group
    pub fn codes_in(&self, group: ModalGroup) -> &'static [&'static str] {
        let slots: &[GroupSlot] = if group.letter() == 'M' {
            &M_GROUPS
        } else {
            &G_GROUPS
        };
        slots
            .iter()
            .find(|(_, g, _)| *g == Some(group))
            .map(|(_, _, codes)| *codes)
            .unwrap_or(&[])
    }

    /// Group occupying a numbered slot, `None` for reserved slots
    pub fn group_by_number(&self, letter: char, number: u8) -> Option<ModalGroup> {
        let slots: &[GroupSlot] = match letter.to_ascii_uppercase() {
            'G' => &G_GROUPS,
            'M' => &M_GROUPS,
            _ => return None,
        };
        slots
            .iter()
            .find(|(n, _, _)| *n == number)
            .and_then(|(_, g, _)| *g)
    }

    /// Whether a code is one of the non-modal one-shot codes
    pub fn is_non_modal(&self, letter: char, value: f64) -> bool {
        code_key(letter, value).is_some_and(|key| self.non_modal.contains(&key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_of_motion_codes() {
        let table = ModalGroupTable::global();
        assert_eq!(table.group_of('G', 0.0), Some(ModalGroup::Motion));
        assert_eq!(table.group_of('g', 1.0), Some(ModalGroup::Motion));
        assert_eq!(table.group_of('G', 38.2), Some(ModalGroup::Motion));
        assert_eq!(table.group_of('G', 17.0), Some(ModalGroup::Plane));
        assert_eq!(table.group_of('G', 90.1), Some(ModalGroup::ArcDistance));
        assert_eq!(table.group_of('G', 61.1), Some(ModalGroup::PathControl));
        assert_eq!(table.group_of('M', 3.0), Some(ModalGroup::Spindle));
        assert_eq!(table.group_of('M', 8.0), Some(ModalGroup::Coolant));
    }

    #[test]
    fn test_fractional_values_do_not_alias() {
        let table = ModalGroupTable::global();
        assert_eq!(table.group_of('G', 0.95), None);
        assert_eq!(table.group_of('G', 1.05), None);
        assert_eq!(table.group_of('G', 38.1), None);
    }

    #[test]
    fn test_non_modal_codes_have_no_group() {
        let table = ModalGroupTable::global();
        for code in ["G4", "G10", "G28", "G53", "G92", "G92.1"] {
            let word = Word::from_code(code).unwrap();
            assert!(table.is_non_modal(word.letter, word.value), "{}", code);
            assert_eq!(table.group_of(word.letter, word.value), None, "{}", code);
        }
        assert!(!table.is_non_modal('G', 1.0));
    }

    #[test]
    fn test_group_of_code() {
        let table = ModalGroupTable::global();
        assert_eq!(table.group_of_code("G01"), Ok(ModalGroup::Motion));
        assert_eq!(table.group_of_code("m5"), Ok(ModalGroup::Spindle));
        assert_eq!(
            table.group_of_code("G4"),
            Err(LineError::UnknownModalGroup {
                code: "G4".to_string()
            })
        );
        assert!(matches!(
            table.group_of_code("bogus"),
            Err(LineError::InvalidCode { .. })
        ));
    }

    #[test]
    fn test_slots_and_reverse_lookup() {
        let table = ModalGroupTable::global();
        assert_eq!(G_GROUPS.len(), 14);
        assert_eq!(M_GROUPS.len(), 10);
        assert_eq!(table.group_by_number('G', 9), None);
        assert_eq!(table.group_by_number('G', 6), Some(ModalGroup::Units));
        assert_eq!(table.group_by_number('M', 7), Some(ModalGroup::Spindle));
        assert_eq!(table.group_by_number('M', 1), None);
        assert_eq!(table.codes_in(ModalGroup::Units), &["G20", "G21"]);

        for (_, group, codes) in G_GROUPS.iter().chain(M_GROUPS.iter()) {
            for code in codes.iter() {
                assert_eq!(table.group_of_code(code).ok(), *group, "{}", code);
            }
        }
    }

    #[test]
    fn test_group_numbers_match_slots() {
        for (number, group, _) in G_GROUPS.iter().chain(M_GROUPS.iter()) {
            if let Some(group) = group {
                assert_eq!(group.number(), *number);
            }
        }
        assert_eq!(ModalGroup::Spindle.to_string(), "M7 (spindle control)");
    }
}
