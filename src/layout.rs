//! Message layout table
//!
//! Each known payload shape is a [`Layout`]: a signature (type marker plus
//! minimum length) and an ordered list of [`FieldSpec`]s saying which bytes
//! decode to which field. Supporting a new message is adding a table entry.
//!
//! Known layouts (offsets are into the payload, between STX and ETX):
//!
//! | Layout    | Marker @1 | Min len | Fields                                              |
//! |-----------|-----------|---------|-----------------------------------------------------|
//! | score     | `'6'`     | 10      | home `5..7`, guest `7..9`                           |
//! | clock     | `'7'`     | 9       | time `5..9` (MMSS), period `9`                      |
//! | penalties | `'8'`     | 30      | 4 slots of 7 bytes from `2`: player(2) flag(1) MMSS |
//!
//! The penalties layout is provisional: it has not been confirmed against a
//! scorepad capture. Payloads that do not fit it degrade to `unknown` fields.

use crate::types::{FieldPath, FieldValue, PenaltyField, Team};

/// How a byte range decodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// ASCII decimal digits, leading spaces read as blanks
    AsciiNumber { len: usize },
    /// Four ASCII digits `MMSS`, rendered `MM:SS`
    AsciiClock,
    /// `'0'`/`'1'` or raw `0x00`/`0x01`. Off the wire only the raw `0x00`
    /// form can arrive, since the decoder reads `0x01` in a payload as a
    /// new heading.
    Flag,
}

impl FieldKind {
    /// Bytes this kind occupies.
    pub const fn size(&self) -> usize {
        match self {
            FieldKind::AsciiNumber { len } => *len,
            FieldKind::AsciiClock => 4,
            FieldKind::Flag => 1,
        }
    }

    /// Decode exactly [`size`](Self::size) bytes, `None` if they are not valid.
    pub fn decode(&self, bytes: &[u8]) -> Option<FieldValue> {
        if bytes.len() != self.size() {
            return None;
        }
        match self {
            FieldKind::AsciiNumber { .. } => ascii_number(bytes).map(FieldValue::Int),
            FieldKind::AsciiClock => {
                let minutes = ascii_number(&bytes[..2])?;
                let seconds = ascii_number(&bytes[2..]).filter(|&s| s < 60)?;
                Some(FieldValue::Time(format!("{minutes:02}:{seconds:02}")))
            }
            FieldKind::Flag => match bytes[0] {
                b'0' | 0x00 => Some(FieldValue::Bool(false)),
                b'1' | 0x01 => Some(FieldValue::Bool(true)),
                _ => None,
            },
        }
    }
}

fn ascii_number(bytes: &[u8]) -> Option<u32> {
    let start = bytes.iter().position(|&b| b != b' ').unwrap_or(bytes.len());
    bytes[start..].iter().try_fold(0u32, |acc, &b| {
        if !b.is_ascii_digit() {
            return None;
        }
        acc.checked_mul(10)?.checked_add(u32::from(b - b'0'))
    })
}

/// One decodable field within a layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub offset: usize,
    pub kind: FieldKind,
    pub path: FieldPath,
}

impl FieldSpec {
    pub const fn new(offset: usize, kind: FieldKind, path: FieldPath) -> Self {
        Self { offset, kind, path }
    }

    /// Byte range within the payload, `None` if the payload is too short.
    pub fn slice<'a>(&self, payload: &'a [u8]) -> Option<&'a [u8]> {
        payload.get(self.offset..self.offset + self.kind.size())
    }
}

/// What identifies a payload as a given layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutSignature {
    pub marker_offset: usize,
    pub marker: u8,
    pub min_len: usize,
}

/// A known payload shape.
#[derive(Debug, Clone, Copy)]
pub struct Layout {
    pub name: &'static str,
    pub signature: LayoutSignature,
    pub fields: &'static [FieldSpec],
}

impl Layout {
    pub fn matches(&self, payload: &[u8]) -> bool {
        payload.len() >= self.signature.min_len
            && payload.get(self.signature.marker_offset) == Some(&self.signature.marker)
    }
}

const fn number(offset: usize, len: usize, path: FieldPath) -> FieldSpec {
    FieldSpec::new(offset, FieldKind::AsciiNumber { len }, path)
}

const fn penalty(
    offset: usize,
    kind: FieldKind,
    team: Team,
    slot: u8,
    field: PenaltyField,
) -> FieldSpec {
    FieldSpec::new(offset, kind, FieldPath::Penalty { team, slot, field })
}

const PLAYER: FieldKind = FieldKind::AsciiNumber { len: 2 };

pub const SCORE: Layout = Layout {
    name: "score",
    signature: LayoutSignature { marker_offset: 1, marker: b'6', min_len: 10 },
    fields: &[number(5, 2, FieldPath::ScoreHome), number(7, 2, FieldPath::ScoreGuest)],
};

pub const CLOCK: Layout = Layout {
    name: "clock",
    signature: LayoutSignature { marker_offset: 1, marker: b'7', min_len: 9 },
    fields: &[
        FieldSpec::new(5, FieldKind::AsciiClock, FieldPath::ClockTime),
        number(9, 1, FieldPath::ClockPeriod),
    ],
};

pub const PENALTIES: Layout = Layout {
    name: "penalties",
    signature: LayoutSignature { marker_offset: 1, marker: b'8', min_len: 30 },
    fields: &[
        penalty(2, PLAYER, Team::Home, 1, PenaltyField::Player),
        penalty(4, FieldKind::Flag, Team::Home, 1, PenaltyField::Active),
        penalty(5, FieldKind::AsciiClock, Team::Home, 1, PenaltyField::Time),
        penalty(9, PLAYER, Team::Home, 2, PenaltyField::Player),
        penalty(11, FieldKind::Flag, Team::Home, 2, PenaltyField::Active),
        penalty(12, FieldKind::AsciiClock, Team::Home, 2, PenaltyField::Time),
        penalty(16, PLAYER, Team::Guest, 1, PenaltyField::Player),
        penalty(18, FieldKind::Flag, Team::Guest, 1, PenaltyField::Active),
        penalty(19, FieldKind::AsciiClock, Team::Guest, 1, PenaltyField::Time),
        penalty(23, PLAYER, Team::Guest, 2, PenaltyField::Player),
        penalty(25, FieldKind::Flag, Team::Guest, 2, PenaltyField::Active),
        penalty(26, FieldKind::AsciiClock, Team::Guest, 2, PenaltyField::Time),
    ],
};

/// Every layout the parser knows, checked in order.
pub const KNOWN_LAYOUTS: &[Layout] = &[SCORE, CLOCK, PENALTIES];

/// First layout in `layouts` whose signature matches `payload`.
pub fn find_layout<'a>(layouts: &'a [Layout], payload: &[u8]) -> Option<&'a Layout> {
    layouts.iter().find(|layout| layout.matches(payload))
}
