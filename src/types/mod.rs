//! Core types flowing through the capture pipeline.
//!
//! ## Architecture
//!
//! Each stage hands the next one a stronger type:
//! - [`RawFrame`] is a delimited wire message, checksum not yet checked
//! - [`ValidatedFrame`] is a frame whose LRC matched
//! - [`FieldDelta`] is the ordered list of field updates parsed from one frame
//! - [`MatchState`] is the canonical, always fully populated match picture
//! - [`Snapshot`] is an immutable, sequenced copy of that picture for readers
//!
//! ## Usage Example
//!
//! ```rust
//! use scorepad::types::{FieldDelta, FieldPath, FieldValue, MatchState};
//!
//! let mut state = MatchState::default();
//! let delta: FieldDelta = [
//!     (FieldPath::ScoreHome, FieldValue::Int(2)),
//!     (FieldPath::ClockTime, FieldValue::Time("12:34".into())),
//! ]
//! .into_iter()
//! .collect();
//!
//! state.apply(&delta);
//! assert_eq!(state.score.home, 2);
//! assert_eq!(state.clock.time, "12:34");
//! ```

mod delta;
mod frame;
mod snapshot;
mod state;
mod update_rate;

pub use delta::{FieldDelta, FieldPath, FieldValue, PenaltyField, Team};
pub use frame::{DEFAULT_ADDRESS, ETX, MAX_PAYLOAD_LEN, RawFrame, SOH, STX, ValidatedFrame};
pub use snapshot::Snapshot;
pub use state::{MatchClock, MatchState, PENALTY_SLOTS, Penalties, PenaltySlot, Score, ZERO_TIME};
pub use update_rate::UpdateRate;
