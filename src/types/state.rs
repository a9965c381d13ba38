//! Canonical match state and its JSON shape
//!
//! The serialized form is consumed by overlay tooling (OBS, vMix) and its key
//! names are fixed:
//!
//! ```json
//! {
//!   "score": {"home": 0, "guest": 0},
//!   "MatchClock": {"time": "00:00", "period": 0},
//!   "Penalties": {
//!     "HomeTeam": {"Player1": {"HPP1-active": 0, "HPP1-Time": "00:00"}, ...},
//!     "GuestTeam": {"Player1": {"GPP1-active": 0, "GPP1-Time": "00:00"}, ...}
//!   }
//! }
//! ```

use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};

use super::delta::{FieldDelta, FieldPath, FieldValue, PenaltyField, Team};

/// Penalty slots tracked per team.
pub const PENALTY_SLOTS: usize = 2;

/// Clock value used for every time field before the first update.
pub const ZERO_TIME: &str = "00:00";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Score {
    pub home: u32,
    pub guest: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchClock {
    pub time: String,
    pub period: u32,
}

impl Default for MatchClock {
    fn default() -> Self {
        Self { time: ZERO_TIME.to_string(), period: 0 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PenaltySlot {
    pub player: u32,
    pub active: bool,
    pub time: String,
}

impl Default for PenaltySlot {
    fn default() -> Self {
        Self { player: 0, active: false, time: ZERO_TIME.to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Penalties {
    pub home: Vec<PenaltySlot>,
    pub guest: Vec<PenaltySlot>,
}

impl Default for Penalties {
    fn default() -> Self {
        Self {
            home: vec![PenaltySlot::default(); PENALTY_SLOTS],
            guest: vec![PenaltySlot::default(); PENALTY_SLOTS],
        }
    }
}

impl Penalties {
    pub fn team(&self, team: Team) -> &[PenaltySlot] {
        match team {
            Team::Home => &self.home,
            Team::Guest => &self.guest,
        }
    }

    fn slot_mut(&mut self, team: Team, slot: u8) -> Option<&mut PenaltySlot> {
        let slots = match team {
            Team::Home => &mut self.home,
            Team::Guest => &mut self.guest,
        };
        slots.get_mut(usize::from(slot).checked_sub(1)?)
    }
}

/// Full, always-populated representation of the current match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchState {
    pub score: Score,
    pub clock: MatchClock,
    pub penalties: Penalties,
}

impl MatchState {
    /// Overwrite the typed fields named in `delta`.
    ///
    /// Unknown entries and entries whose value type does not fit the path are
    /// skipped. Returns the number of fields written.
    pub fn apply(&mut self, delta: &FieldDelta) -> usize {
        delta.iter().filter(|(path, value)| self.apply_field(*path, value)).count()
    }

    fn apply_field(&mut self, path: FieldPath, value: &FieldValue) -> bool {
        match (path, value) {
            (FieldPath::ScoreHome, FieldValue::Int(v)) => self.score.home = *v,
            (FieldPath::ScoreGuest, FieldValue::Int(v)) => self.score.guest = *v,
            (FieldPath::ClockTime, FieldValue::Time(t)) => self.clock.time.clone_from(t),
            (FieldPath::ClockPeriod, FieldValue::Int(v)) => self.clock.period = *v,
            (FieldPath::Penalty { team, slot, field }, value) => {
                let Some(target) = self.penalties.slot_mut(team, slot) else {
                    return false;
                };
                match (field, value) {
                    (PenaltyField::Player, FieldValue::Int(v)) => target.player = *v,
                    (PenaltyField::Active, FieldValue::Bool(v)) => target.active = *v,
                    (PenaltyField::Time, FieldValue::Time(t)) => target.time.clone_from(t),
                    _ => return false,
                }
            }
            _ => return false,
        }
        true
    }
}

impl Serialize for MatchState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("MatchState", 3)?;
        state.serialize_field("score", &self.score)?;
        state.serialize_field("MatchClock", &self.clock)?;
        state.serialize_field("Penalties", &PenaltiesJson(&self.penalties))?;
        state.end()
    }
}

struct PenaltiesJson<'a>(&'a Penalties);

impl Serialize for PenaltiesJson<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("HomeTeam", &TeamJson { prefix: "HPP", slots: &self.0.home })?;
        map.serialize_entry("GuestTeam", &TeamJson { prefix: "GPP", slots: &self.0.guest })?;
        map.end()
    }
}

struct TeamJson<'a> {
    prefix: &'static str,
    slots: &'a [PenaltySlot],
}

impl Serialize for TeamJson<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.slots.len()))?;
        for (index, slot) in self.slots.iter().enumerate() {
            let n = index + 1;
            map.serialize_entry(
                &format!("Player{n}"),
                &SlotJson { key: format!("{}{n}", self.prefix), slot },
            )?;
        }
        map.end()
    }
}

struct SlotJson<'a> {
    key: String,
    slot: &'a PenaltySlot,
}

impl Serialize for SlotJson<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry(&format!("{}-active", self.key), &u8::from(self.slot.active))?;
        map.serialize_entry(&format!("{}-Time", self.key), &self.slot.time)?;
        map.end()
    }
}
