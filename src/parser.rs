//! Message parser: validated payload bytes to field deltas

use tracing::{debug, trace};

use crate::layout::{KNOWN_LAYOUTS, Layout, find_layout};
use crate::types::{FieldDelta, FieldPath, FieldValue, ValidatedFrame};

/// Maps validated payloads to [`FieldDelta`]s using a layout table.
///
/// Never fails: an unrecognized payload becomes a single `unknown` entry and an
/// undecodable field becomes an `unknown.<offset>` entry next to the fields
/// that did decode.
#[derive(Debug, Clone, Copy)]
pub struct MessageParser {
    layouts: &'static [Layout],
}

impl Default for MessageParser {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageParser {
    /// Parser over the built-in scorepad layouts.
    pub fn new() -> Self {
        Self { layouts: KNOWN_LAYOUTS }
    }

    /// Parser over a caller-supplied layout table.
    pub fn with_layouts(layouts: &'static [Layout]) -> Self {
        Self { layouts }
    }

    pub fn parse(&self, frame: &ValidatedFrame) -> FieldDelta {
        self.parse_payload(frame.payload())
    }

    pub fn parse_payload(&self, payload: &[u8]) -> FieldDelta {
        let Some(layout) = find_layout(self.layouts, payload) else {
            let hex = hex::encode(payload);
            debug!(len = payload.len(), payload = %hex, "no layout matches payload");
            return FieldDelta::unknown(payload);
        };

        let mut delta = FieldDelta::new();
        for spec in layout.fields {
            // Trailing fields beyond the payload are optional
            let Some(bytes) = spec.slice(payload) else {
                continue;
            };
            match spec.kind.decode(bytes) {
                Some(value) => delta.push(spec.path, value),
                None => {
                    trace!(
                        layout = layout.name,
                        offset = spec.offset,
                        path = %spec.path,
                        "field did not decode"
                    );
                    let raw = FieldValue::Raw(hex::encode(bytes));
                    delta.push(FieldPath::UnknownAt(spec.offset), raw);
                }
            }
        }

        debug!(layout = layout.name, fields = delta.len(), "parsed payload");
        delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{clock_payload, penalties_payload, score_payload};
    use crate::types::{PenaltyField, Team};

    #[test]
    fn score_message_yields_both_scores() {
        let delta = MessageParser::new().parse_payload(&score_payload(3, 12));
        assert_eq!(delta.get(FieldPath::ScoreHome), Some(&FieldValue::Int(3)));
        assert_eq!(delta.get(FieldPath::ScoreGuest), Some(&FieldValue::Int(12)));
        assert_eq!(delta.len(), 2);
    }

    #[test]
    fn clock_message_with_and_without_period() {
        let parser = MessageParser::new();

        let with_period = parser.parse_payload(&clock_payload(8, 5, Some(2)));
        assert_eq!(with_period.get(FieldPath::ClockTime), Some(&FieldValue::Time("08:05".into())));
        assert_eq!(with_period.get(FieldPath::ClockPeriod), Some(&FieldValue::Int(2)));

        let without = parser.parse_payload(&clock_payload(19, 59, None));
        assert_eq!(without.get(FieldPath::ClockTime), Some(&FieldValue::Time("19:59".into())));
        assert_eq!(without.get(FieldPath::ClockPeriod), None);
    }

    #[test]
    fn penalties_message_fills_every_slot() {
        let payload = penalties_payload([
            (7, true, 1, 30),
            (0, false, 0, 0),
            (11, true, 0, 45),
            (4, false, 2, 0),
        ]);
        let delta = MessageParser::new().parse_payload(&payload);

        assert_eq!(delta.len(), 12);
        let home1 = |field| FieldPath::Penalty { team: Team::Home, slot: 1, field };
        let guest1 = |field| FieldPath::Penalty { team: Team::Guest, slot: 1, field };
        assert_eq!(delta.get(home1(PenaltyField::Player)), Some(&FieldValue::Int(7)));
        assert_eq!(delta.get(home1(PenaltyField::Active)), Some(&FieldValue::Bool(true)));
        assert_eq!(delta.get(home1(PenaltyField::Time)), Some(&FieldValue::Time("01:30".into())));
        assert_eq!(delta.get(guest1(PenaltyField::Time)), Some(&FieldValue::Time("00:45".into())));
    }

    #[test]
    fn unmatched_payload_is_single_unknown_entry() {
        let delta = MessageParser::new().parse_payload(&[0x47, 0x31, 0x31]);
        assert!(delta.is_unknown());
        assert_eq!(delta.get(FieldPath::Unknown), Some(&FieldValue::Raw("473131".into())));

        // Sample payload shipped with the scorepad test sender
        let sample = [0x47, 0x31, 0x31, 0x80, 0x37, 0x20, 0x34, 0x30, 0x37, 0x20, 0x30, 0x31];
        assert!(MessageParser::new().parse_payload(&sample).is_unknown());
    }

    #[test]
    fn bad_field_degrades_without_losing_others() {
        let mut payload = score_payload(5, 6);
        payload[7] = b'X';
        let delta = MessageParser::new().parse_payload(&payload);

        assert_eq!(delta.get(FieldPath::ScoreHome), Some(&FieldValue::Int(5)));
        assert_eq!(delta.get(FieldPath::ScoreGuest), None);
        assert_eq!(delta.get(FieldPath::UnknownAt(7)), Some(&FieldValue::Raw("5836".into())));
        assert!(!delta.is_unknown());
    }

    #[test]
    fn out_of_range_seconds_degrade_to_unknown() {
        let payload = clock_payload(9, 75, Some(2));
        let delta = MessageParser::new().parse_payload(&payload);

        assert_eq!(delta.get(FieldPath::ClockTime), None);
        assert_eq!(delta.get(FieldPath::ClockPeriod), Some(&FieldValue::Int(2)));
        assert_eq!(delta.get(FieldPath::UnknownAt(5)), Some(&FieldValue::Raw("30393735".into())));
    }

    #[test]
    fn custom_layout_table_is_consulted() {
        use crate::layout::{FieldKind, FieldSpec, LayoutSignature};

        static CUSTOM: &[Layout] = &[Layout {
            name: "shot-clock",
            signature: LayoutSignature { marker_offset: 0, marker: b'S', min_len: 3 },
            fields: &[FieldSpec::new(1, FieldKind::AsciiNumber { len: 2 }, FieldPath::ClockPeriod)],
        }];

        let parser = MessageParser::with_layouts(CUSTOM);
        let delta = parser.parse_payload(b"S24");
        assert_eq!(delta.get(FieldPath::ClockPeriod), Some(&FieldValue::Int(24)));
        assert!(parser.parse_payload(&score_payload(1, 1)).is_unknown());
    }
}
