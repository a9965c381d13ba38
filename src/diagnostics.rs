//! Pipeline counters for operator visibility
//!
//! Shared between the pipeline (writer) and anything that wants to report on
//! it. All counters are monotonic for the life of the process and survive
//! reconnections.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

#[derive(Debug, Default)]
pub struct Diagnostics {
    bytes_received: AtomicU64,
    bytes_discarded: AtomicU64,
    frames_decoded: AtomicU64,
    framing_errors: AtomicU64,
    checksum_failures: AtomicU64,
    unknown_payloads: AtomicU64,
    deltas_applied: AtomicU64,
    connections: AtomicU64,
}

/// Point-in-time copy of every counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiagnosticsReport {
    pub bytes_received: u64,
    pub bytes_discarded: u64,
    pub frames_decoded: u64,
    pub framing_errors: u64,
    pub checksum_failures: u64,
    pub unknown_payloads: u64,
    pub deltas_applied: u64,
    pub connections: u64,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_bytes(&self, count: usize) {
        self.bytes_received.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn record_discarded(&self, count: u64) {
        if count > 0 {
            self.bytes_discarded.fetch_add(count, Ordering::Relaxed);
        }
    }

    pub fn record_frame(&self) {
        self.frames_decoded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_framing_error(&self) {
        self.framing_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_checksum_failure(&self) {
        self.checksum_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_unknown_payload(&self) {
        self.unknown_payloads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_delta(&self) {
        self.deltas_applied.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_connection(&self) {
        self.connections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn frames_decoded(&self) -> u64 {
        self.frames_decoded.load(Ordering::Relaxed)
    }

    pub fn checksum_failures(&self) -> u64 {
        self.checksum_failures.load(Ordering::Relaxed)
    }

    pub fn unknown_payloads(&self) -> u64 {
        self.unknown_payloads.load(Ordering::Relaxed)
    }

    pub fn report(&self) -> DiagnosticsReport {
        DiagnosticsReport {
            bytes_received: self.bytes_received.load(Ordering::Relaxed),
            bytes_discarded: self.bytes_discarded.load(Ordering::Relaxed),
            frames_decoded: self.frames_decoded.load(Ordering::Relaxed),
            framing_errors: self.framing_errors.load(Ordering::Relaxed),
            checksum_failures: self.checksum_failures.load(Ordering::Relaxed),
            unknown_payloads: self.unknown_payloads.load(Ordering::Relaxed),
            deltas_applied: self.deltas_applied.load(Ordering::Relaxed),
            connections: self.connections.load(Ordering::Relaxed),
        }
    }

    pub fn log_summary(&self) {
        let r = self.report();
        info!(
            bytes_received = r.bytes_received,
            bytes_discarded = r.bytes_discarded,
            frames_decoded = r.frames_decoded,
            framing_errors = r.framing_errors,
            checksum_failures = r.checksum_failures,
            unknown_payloads = r.unknown_payloads,
            deltas_applied = r.deltas_applied,
            connections = r.connections,
            "capture diagnostics"
        );
    }
}
