//! Match state aggregator
//!
//! Single writer, many readers. The [`StateWriter`] owns the canonical
//! [`MatchState`] and, after each delta, publishes an immutable copy through a
//! `tokio::sync::watch` channel. Readers hold a [`SnapshotHandle`] and only
//! ever see whole published values, so a torn read cannot be constructed.

use futures::StreamExt;
use futures::stream::BoxStream;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::SystemTime;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, trace};

use crate::stream::ThrottleExt;
use crate::types::{FieldDelta, MatchState, Snapshot, UpdateRate};

/// Unknown entries kept for diagnostics.
pub const RECENT_UNKNOWNS_CAPACITY: usize = 16;

/// An `unknown` delta entry retained for offline analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnknownRecord {
    /// Sequence number the delta was applied at
    pub sequence: u64,
    #[serde(skip)]
    pub captured_at: SystemTime,
    /// `unknown` or `unknown.<offset>`
    pub path: String,
    /// Hex-encoded bytes
    pub raw: String,
}

#[derive(Debug, Default)]
struct Published {
    state: MatchState,
    sequence: u64,
    recent_unknowns: VecDeque<UnknownRecord>,
}

/// Exclusive owner of the canonical match state.
///
/// Not `Clone`: there is exactly one writer. It is moved into the pipeline for
/// the life of a connection and handed back afterwards, so state carries over
/// reconnects.
#[derive(Debug)]
pub struct StateWriter {
    state: MatchState,
    sequence: u64,
    recent_unknowns: VecDeque<UnknownRecord>,
    tx: watch::Sender<Arc<Published>>,
}

impl Default for StateWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl StateWriter {
    /// Writer starting from the all-default match state.
    pub fn new() -> Self {
        Self::with_state(MatchState::default())
    }

    /// Writer starting from a known state (sequence 0).
    pub fn with_state(state: MatchState) -> Self {
        let (tx, _rx) = watch::channel(Arc::new(Published {
            state: state.clone(),
            sequence: 0,
            recent_unknowns: VecDeque::new(),
        }));
        Self { state, sequence: 0, recent_unknowns: VecDeque::new(), tx }
    }

    /// New reader handle; any number may exist.
    pub fn handle(&self) -> SnapshotHandle {
        SnapshotHandle { rx: self.tx.subscribe() }
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Merge `delta` (last write wins per field), bump the sequence and publish.
    ///
    /// Returns the new sequence number.
    pub fn apply(&mut self, delta: &FieldDelta) -> u64 {
        let written = self.state.apply(delta);
        self.sequence += 1;

        for (path, value) in delta.iter().filter(|(path, _)| path.is_unknown()) {
            if self.recent_unknowns.len() == RECENT_UNKNOWNS_CAPACITY {
                self.recent_unknowns.pop_front();
            }
            self.recent_unknowns.push_back(UnknownRecord {
                sequence: self.sequence,
                captured_at: SystemTime::now(),
                path: path.to_string(),
                raw: value.to_string(),
            });
        }

        trace!(sequence = self.sequence, written, entries = delta.len(), "applied delta");

        self.tx.send_replace(Arc::new(Published {
            state: self.state.clone(),
            sequence: self.sequence,
            recent_unknowns: self.recent_unknowns.clone(),
        }));
        self.sequence
    }
}

/// Cheap, cloneable read access to the latest published state.
#[derive(Debug, Clone)]
pub struct SnapshotHandle {
    rx: watch::Receiver<Arc<Published>>,
}

impl SnapshotHandle {
    fn latest(&self) -> Arc<Published> {
        Arc::clone(&self.rx.borrow())
    }

    /// Independent copy of the current state with its sequence number.
    pub fn snapshot(&self) -> Snapshot {
        let published = self.latest();
        Snapshot::new(published.state.clone(), published.sequence)
    }

    pub fn sequence(&self) -> u64 {
        self.rx.borrow().sequence
    }

    /// Most recent unknown entries, oldest first.
    pub fn recent_unknowns(&self) -> Vec<UnknownRecord> {
        self.latest().recent_unknowns.iter().cloned().collect()
    }

    /// Stream of snapshots: the current one immediately, then one per change.
    ///
    /// With [`UpdateRate::Max`] intermediate snapshots are dropped, latest
    /// wins. The stream ends when the writer is dropped.
    pub fn subscribe(&self, rate: UpdateRate) -> BoxStream<'static, Snapshot> {
        let snapshots = WatchStream::new(self.rx.clone())
            .map(|published| Snapshot::new(published.state.clone(), published.sequence));

        match rate.throttle_interval() {
            None => snapshots.boxed(),
            Some(interval) => {
                debug!(?interval, "throttling snapshot subscription");
                snapshots.throttle(interval).boxed()
            }
        }
    }
}
