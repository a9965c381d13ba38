//! Decode → validate → parse → apply, for one connection
//!
//! Every stage returns an explicit outcome; the pipeline decides what to do
//! with it (count and continue) so one bad byte never stalls the frames
//! behind it.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::aggregator::StateWriter;
use crate::checksum::{self, ChecksumMismatch};
use crate::decoder::{FrameDecoder, FramingError};
use crate::diagnostics::Diagnostics;
use crate::parser::MessageParser;
use crate::types::DEFAULT_ADDRESS;

/// What happened to one decoder event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Frame validated, parsed and applied at `sequence`
    Applied { sequence: u64, unknown: bool },
    /// Decoder resynchronized
    Framing(FramingError),
    /// Frame dropped on LRC mismatch
    Checksum(ChecksumMismatch),
}

/// Per-chunk tally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChunkSummary {
    pub applied: usize,
    pub unknown: usize,
    pub framing_errors: usize,
    pub checksum_failures: usize,
}

impl ChunkSummary {
    fn record(&mut self, outcome: &FrameOutcome) {
        match outcome {
            FrameOutcome::Applied { unknown, .. } => {
                self.applied += 1;
                if *unknown {
                    self.unknown += 1;
                }
            }
            FrameOutcome::Framing(_) => self.framing_errors += 1,
            FrameOutcome::Checksum(_) => self.checksum_failures += 1,
        }
    }
}

/// Sequential processing state for one live connection.
///
/// Owns a fresh [`FrameDecoder`]; build a new `Pipeline` per connection so a
/// reconnect always starts decoding in `Idle`.
#[derive(Debug)]
pub struct Pipeline {
    decoder: FrameDecoder,
    parser: MessageParser,
    diagnostics: Arc<Diagnostics>,
}

impl Pipeline {
    pub fn new(diagnostics: Arc<Diagnostics>) -> Self {
        Self::with_parts(FrameDecoder::new(), MessageParser::new(), diagnostics)
    }

    pub fn with_parts(
        decoder: FrameDecoder,
        parser: MessageParser,
        diagnostics: Arc<Diagnostics>,
    ) -> Self {
        Self { decoder, parser, diagnostics }
    }

    pub fn decoder(&self) -> &FrameDecoder {
        &self.decoder
    }

    /// Run every frame completed by `chunk` through to `writer`, in order.
    pub fn process_chunk(&mut self, chunk: &[u8], writer: &mut StateWriter) -> ChunkSummary {
        self.diagnostics.record_bytes(chunk.len());

        let mut summary = ChunkSummary::default();
        for event in self.decoder.decode(chunk) {
            let outcome = match event {
                Err(err) => {
                    self.diagnostics.record_framing_error();
                    warn!(%err, "framing error");
                    FrameOutcome::Framing(err)
                }
                Ok(frame) => {
                    self.diagnostics.record_frame();
                    if frame.address != DEFAULT_ADDRESS {
                        debug!(address = frame.address, "frame from non-default address");
                    }
                    match checksum::validate(frame) {
                        Err(mismatch) => {
                            self.diagnostics.record_checksum_failure();
                            warn!(
                                received = mismatch.received,
                                calculated = mismatch.calculated,
                                frame = %mismatch.frame,
                                "dropping frame with bad LRC"
                            );
                            FrameOutcome::Checksum(mismatch)
                        }
                        Ok(validated) => {
                            let delta = self.parser.parse(&validated);
                            let unknown = delta.is_unknown();
                            if unknown {
                                self.diagnostics.record_unknown_payload();
                            }
                            let sequence = writer.apply(&delta);
                            self.diagnostics.record_delta();
                            FrameOutcome::Applied { sequence, unknown }
                        }
                    }
                }
            };
            summary.record(&outcome);
        }

        self.diagnostics.record_discarded(self.decoder.take_discarded());
        summary
    }
}
