//! Human-readable console sink

use std::io::Write;

use super::SnapshotSink;
use crate::types::{MatchState, PenaltySlot, Snapshot};
use crate::{Result, ScorepadError};

/// Prints one summary line per snapshot to stdout.
#[derive(Debug, Default)]
pub struct ConsoleSink {
    last_line: Option<String>,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self::default()
    }
}

/// One-line summary, e.g. `[12] 3-1 | P2 07:45 | H #9 01:30 | G -`.
pub fn summary_line(sequence: u64, state: &MatchState) -> String {
    format!(
        "[{sequence}] {}-{} | P{} {} | H {} | G {}",
        state.score.home,
        state.score.guest,
        state.clock.period,
        state.clock.time,
        active_penalties(&state.penalties.home),
        active_penalties(&state.penalties.guest),
    )
}

fn active_penalties(slots: &[PenaltySlot]) -> String {
    let active: Vec<String> = slots
        .iter()
        .filter(|slot| slot.active)
        .map(|slot| format!("#{} {}", slot.player, slot.time))
        .collect();
    if active.is_empty() { "-".to_string() } else { active.join(", ") }
}

#[async_trait::async_trait]
impl SnapshotSink for ConsoleSink {
    async fn publish(&mut self, snapshot: &Snapshot) -> Result<()> {
        // Sequence alone changing (unknown payloads) is not worth a line
        let line = summary_line(snapshot.sequence, &snapshot.state);
        let body = line.split_once(' ').map_or(line.as_str(), |(_, rest)| rest);
        if self.last_line.as_deref() == Some(body) {
            return Ok(());
        }

        writeln!(std::io::stdout().lock(), "{line}")
            .map_err(|e| ScorepadError::io_error("console output", e))?;
        self.last_line = Some(body.to_string());
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}
