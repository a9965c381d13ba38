//! Snapshot publishing to overlay consumers
//!
//! A [`Publisher`] follows a [`SnapshotHandle`] subscription and hands every
//! snapshot it yields to each configured [`SnapshotSink`]. Sinks never see the
//! writer; a slow sink only delays publication, never decoding.

mod console;
mod json_file;

pub use console::ConsoleSink;
pub use json_file::JsonFileSink;

use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::Result;
use crate::aggregator::SnapshotHandle;
use crate::types::{Snapshot, UpdateRate};

/// Destination for published snapshots
#[async_trait::async_trait]
pub trait SnapshotSink: Send {
    /// Publish one snapshot. Errors are logged by the publisher and the sink
    /// is tried again on the next snapshot.
    async fn publish(&mut self, snapshot: &Snapshot) -> Result<()>;

    /// Short name for logs
    fn name(&self) -> &str;
}

/// Drives sinks from a snapshot subscription.
pub struct Publisher {
    handle: SnapshotHandle,
    rate: UpdateRate,
    sinks: Vec<Box<dyn SnapshotSink>>,
}

impl Publisher {
    pub fn new(handle: SnapshotHandle, rate: UpdateRate) -> Self {
        Self { handle, rate, sinks: Vec::new() }
    }

    pub fn with_sink(mut self, sink: impl SnapshotSink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    /// Publish until cancelled or the writer goes away.
    ///
    /// Returns the number of snapshots published.
    pub async fn run(mut self, cancel: CancellationToken) -> u64 {
        let mut snapshots = self.handle.subscribe(self.rate);
        let mut published = 0u64;
        info!(sinks = self.sinks.len(), rate = ?self.rate, "publisher started");

        loop {
            let snapshot = tokio::select! {
                _ = cancel.cancelled() => break,
                next = snapshots.next() => match next {
                    Some(snapshot) => snapshot,
                    None => {
                        debug!("snapshot stream ended");
                        break;
                    }
                },
            };

            for sink in self.sinks.iter_mut() {
                if let Err(e) = sink.publish(&snapshot).await {
                    let sequence = snapshot.sequence;
                    warn!(sink = sink.name(), sequence, error = %e, "publish failed");
                }
            }
            published += 1;
        }

        info!(published, "publisher stopped");
        published
    }
}
