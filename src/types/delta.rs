//! Field deltas: the parser's output and the aggregator's input

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which side of the scoreboard a field belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    Home,
    Guest,
}

impl Team {
    pub fn as_str(self) -> &'static str {
        match self {
            Team::Home => "home",
            Team::Guest => "guest",
        }
    }
}

/// The three values a penalty slot carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PenaltyField {
    Player,
    Active,
    Time,
}

/// Address of a single match-state field.
///
/// Displays as the dotted path used in logs and the unknowns log, e.g.
/// `score.home`, `clock.period`, `penalties.home[1].active`, `unknown.7`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldPath {
    ScoreHome,
    ScoreGuest,
    ClockTime,
    ClockPeriod,
    /// `slot` is 1-based, matching the `Player<N>` keys of the JSON output.
    Penalty { team: Team, slot: u8, field: PenaltyField },
    /// Whole payload did not match any layout.
    Unknown,
    /// One field at the given payload offset could not be decoded.
    UnknownAt(usize),
}

impl FieldPath {
    pub fn is_unknown(&self) -> bool {
        matches!(self, FieldPath::Unknown | FieldPath::UnknownAt(_))
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldPath::ScoreHome => f.write_str("score.home"),
            FieldPath::ScoreGuest => f.write_str("score.guest"),
            FieldPath::ClockTime => f.write_str("clock.time"),
            FieldPath::ClockPeriod => f.write_str("clock.period"),
            FieldPath::Penalty { team, slot, field } => {
                let field = match field {
                    PenaltyField::Player => "player",
                    PenaltyField::Active => "active",
                    PenaltyField::Time => "time",
                };
                write!(f, "penalties.{}[{}].{}", team.as_str(), slot, field)
            }
            FieldPath::Unknown => f.write_str("unknown"),
            FieldPath::UnknownAt(offset) => write!(f, "unknown.{offset}"),
        }
    }
}

/// A decoded field value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldValue {
    Int(u32),
    Bool(bool),
    /// Clock-style value, always formatted `MM:SS`
    Time(String),
    /// Hex-encoded bytes that could not be interpreted
    Raw(String),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Int(v) => write!(f, "{v}"),
            FieldValue::Bool(v) => write!(f, "{v}"),
            FieldValue::Time(v) => f.write_str(v),
            FieldValue::Raw(v) => write!(f, "0x{v}"),
        }
    }
}

/// Ordered set of field updates derived from one validated frame.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDelta {
    entries: Vec<(FieldPath, FieldValue)>,
}

impl FieldDelta {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-entry delta for a payload that matched no layout.
    pub fn unknown(payload: &[u8]) -> Self {
        Self { entries: vec![(FieldPath::Unknown, FieldValue::Raw(hex::encode(payload)))] }
    }

    pub fn push(&mut self, path: FieldPath, value: FieldValue) {
        self.entries.push((path, value));
    }

    pub fn iter(&self) -> impl Iterator<Item = &(FieldPath, FieldValue)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when the whole payload was unrecognized.
    pub fn is_unknown(&self) -> bool {
        matches!(self.entries.as_slice(), [(FieldPath::Unknown, _)])
    }

    /// Value of the last entry for `path`, if any.
    pub fn get(&self, path: FieldPath) -> Option<&FieldValue> {
        self.entries.iter().rev().find(|(p, _)| *p == path).map(|(_, v)| v)
    }
}

impl FromIterator<(FieldPath, FieldValue)> for FieldDelta {
    fn from_iter<I: IntoIterator<Item = (FieldPath, FieldValue)>>(iter: I) -> Self {
        Self { entries: iter.into_iter().collect() }
    }
}

impl<'a> IntoIterator for &'a FieldDelta {
    type Item = &'a (FieldPath, FieldValue);
    type IntoIter = std::slice::Iter<'a, (FieldPath, FieldValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
