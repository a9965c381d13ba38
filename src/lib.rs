//! Frame decoding, LRC validation and match-state aggregation for Bodet
//! Scorepad TCP feeds.
//!
//! A Bodet scorepad streams framed binary messages over TCP. This crate
//! turns that byte stream into a live, always-complete picture of the match
//! (score, clock, penalties) that overlay software can read at any time.
//!
//! # Pipeline
//!
//! - [`FrameDecoder`] reassembles `SOH addr STX payload ETX lrc` frames from
//!   arbitrarily chunked bytes and resynchronizes on malformed input
//! - [`checksum::validate`] checks the XOR LRC over address and payload
//! - [`MessageParser`] maps payloads to field updates via a declarative
//!   layout table; anything it does not recognize is kept as `unknown`
//! - [`StateWriter`] merges updates (last write wins) and publishes immutable
//!   [`Snapshot`]s that any number of [`SnapshotHandle`]s can read
//!
//! Around it: [`Capture`] supervises the TCP link in server or client mode,
//! and a [`Publisher`](publish::Publisher) feeds snapshots to the overlay
//! JSON file and the console.
//!
//! # Quick Start
//!
//! ```rust
//! use scorepad::{Pipeline, StateWriter, Diagnostics};
//! use std::sync::Arc;
//!
//! let diagnostics = Arc::new(Diagnostics::new());
//! let mut writer = StateWriter::new();
//! let handle = writer.handle();
//! let mut pipeline = Pipeline::new(Arc::clone(&diagnostics));
//!
//! // Score 2-1, split across two reads
//! let mut frame = vec![0x01, 0x7F, 0x02];
//! frame.extend_from_slice(b"G6 S00201 ");
//! frame.extend_from_slice(&[0x03, 0x6E]);
//! pipeline.process_chunk(&frame[..6], &mut writer);
//! pipeline.process_chunk(&frame[6..], &mut writer);
//!
//! let snapshot = handle.snapshot();
//! assert_eq!(snapshot.state.score.home, 2);
//! assert_eq!(snapshot.state.score.guest, 1);
//! ```

// Core types and error handling
mod error;
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;
pub mod types;

// Byte-level pipeline
pub mod checksum;
pub mod decoder;
pub mod layout;
pub mod parser;
pub mod pipeline;

// State and readers
pub mod aggregator;
pub mod diagnostics;
pub mod stream;

// Sources, supervision, output
pub mod config;
pub mod connection;
pub mod driver;
pub mod publish;
pub mod source;
pub mod sources;

pub use error::*;
pub use types::*;

pub use aggregator::{SnapshotHandle, StateWriter, UnknownRecord};
pub use checksum::ChecksumMismatch;
pub use config::Config;
pub use connection::{Capture, CaptureMode};
pub use decoder::{DecoderState, FrameDecoder, FramingError};
pub use diagnostics::{Diagnostics, DiagnosticsReport};
pub use driver::Driver;
pub use parser::MessageParser;
pub use pipeline::Pipeline;
pub use source::ByteSource;
