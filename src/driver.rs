//! Driver spawns and manages one capture pipeline task

use std::fmt;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::aggregator::StateWriter;
use crate::diagnostics::Diagnostics;
use crate::pipeline::Pipeline;
use crate::source::ByteSource;
use crate::{Result, ScorepadError};

/// Why a driver task stopped.
#[derive(Debug)]
pub enum ExitReason {
    /// Source reported disconnect or end of data
    Disconnected,
    /// Cancellation token fired
    Cancelled,
    /// Source read failed
    Failed(ScorepadError),
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitReason::Disconnected => f.write_str("disconnected"),
            ExitReason::Cancelled => f.write_str("cancelled"),
            ExitReason::Failed(e) => write!(f, "failed: {e}"),
        }
    }
}

/// Everything a finished driver hands back.
#[derive(Debug)]
pub struct DriverExit {
    /// The writer, with all state applied so far
    pub writer: StateWriter,
    pub reason: ExitReason,
    /// Chunks read from the source
    pub chunks: u64,
}

/// Handle to a running driver task
pub struct DriverTask {
    handle: JoinHandle<DriverExit>,
    cancel: CancellationToken,
}

impl DriverTask {
    /// Ask the task to stop after the chunk in progress.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait for the task and take the writer back.
    pub async fn join(self) -> Result<DriverExit> {
        self.handle
            .await
            .map_err(|e| ScorepadError::Capture { details: format!("driver task: {e}") })
    }
}

/// Driver spawns a task that owns the source and the writer for one connection
///
/// Each spawn builds a fresh [`Pipeline`], so decoding restarts in `Idle`
/// while the match state in the writer carries over.
pub struct Driver;

impl Driver {
    /// Spawn a pipeline task for `source`.
    ///
    /// `cancel` is usually a child token of the capture supervisor's.
    pub fn spawn<S>(
        source: S,
        writer: StateWriter,
        diagnostics: Arc<Diagnostics>,
        cancel: CancellationToken,
    ) -> DriverTask
    where
        S: ByteSource,
    {
        let task_cancel = cancel.clone();
        let handle =
            tokio::spawn(async move { Self::run(source, writer, diagnostics, task_cancel).await });
        DriverTask { handle, cancel }
    }

    /// Run the pipeline on the current task until the source ends.
    pub async fn run<S>(
        mut source: S,
        mut writer: StateWriter,
        diagnostics: Arc<Diagnostics>,
        cancel: CancellationToken,
    ) -> DriverExit
    where
        S: ByteSource,
    {
        let label = source.describe();
        info!(source = %label, "pipeline started");

        let mut pipeline = Pipeline::new(diagnostics);
        let mut chunks = 0u64;

        let reason = loop {
            let result = tokio::select! {
                _ = cancel.cancelled() => {
                    debug!(source = %label, "pipeline cancelled during read");
                    break ExitReason::Cancelled;
                }
                result = source.next_chunk() => result,
            };

            match result {
                Ok(Some(chunk)) => {
                    chunks += 1;
                    let summary = pipeline.process_chunk(&chunk, &mut writer);
                    if summary.applied > 0 {
                        let sequence = writer.sequence();
                        debug!(applied = summary.applied, sequence, "chunk applied");
                    }
                }
                Ok(None) => break ExitReason::Disconnected,
                Err(e) => {
                    warn!(source = %label, error = %e, "source read failed");
                    break ExitReason::Failed(e);
                }
            }
        };

        if pipeline.decoder().buffered_len() > 0 {
            debug!(
                source = %label,
                buffered = pipeline.decoder().buffered_len(),
                "dropping partial frame"
            );
        }
        info!(source = %label, %reason, chunks, sequence = writer.sequence(), "pipeline ended");

        DriverExit { writer, reason, chunks }
    }
}
