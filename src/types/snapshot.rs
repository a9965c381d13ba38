//! Immutable, versioned copies of the match state

use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

use super::MatchState;

/// Point-in-time copy of [`MatchState`] handed to readers.
///
/// Serializes to the overlay JSON shape; sequence and capture time are
/// bookkeeping for the reader and are not part of that shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Number of deltas applied since the state was created
    pub sequence: u64,
    /// When this copy was taken
    pub captured_at: SystemTime,
    pub state: MatchState,
}

impl Snapshot {
    pub fn new(state: MatchState, sequence: u64) -> Self {
        Self { sequence, captured_at: SystemTime::now(), state }
    }

    /// Capture time as milliseconds since the Unix epoch.
    pub fn captured_at_millis(&self) -> u128 {
        self.captured_at.duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
    }
}

impl Serialize for Snapshot {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.state.serialize(serializer)
    }
}
