//! Byte-stream frame decoder
//!
//! Turns an unbounded, arbitrarily chunked byte stream into [`RawFrame`]s:
//!
//! ```text
//! SOH(0x01) ADDR STX(0x02) PAYLOAD... ETX(0x03) LRC
//! ```
//!
//! The decoder is a five-state machine that keeps its position across calls,
//! so chunk boundaries never affect the frames produced. Malformed input
//! yields a [`FramingError`] and the machine resynchronizes on the next
//! start-of-heading.

use thiserror::Error;
use tracing::trace;

use crate::types::{ETX, MAX_PAYLOAD_LEN, RawFrame, SOH, STX};

/// Position of the decoder within a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderState {
    /// Between frames, waiting for start-of-heading
    Idle,
    /// Heading seen, next byte is the address
    AwaitAddress,
    /// Address seen, waiting for start-of-text
    AwaitStart,
    /// Collecting payload until end-of-text
    InPayload,
    /// End-of-text seen, next byte is the LRC
    AwaitChecksum,
}

/// Malformed or out-of-sequence control bytes.
///
/// Always recovered locally; the decoder is already resynchronized when one
/// of these is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FramingError {
    #[error("expected start-of-text after address {address:#04x}, found {found:#04x}")]
    MissingStart { address: u8, found: u8 },

    #[error("start-of-heading inside payload, dropped {discarded} buffered bytes")]
    Interrupted { discarded: usize },

    #[error("payload exceeded {limit} bytes without end-of-text")]
    Oversized { limit: usize },
}

/// Outcome of feeding one byte (or one chunk's worth of bytes).
pub type DecodeResult = Result<RawFrame, FramingError>;

/// Incremental frame decoder; one instance per connection.
#[derive(Debug, Clone)]
pub struct FrameDecoder {
    state: DecoderState,
    address: u8,
    payload: Vec<u8>,
    max_payload: usize,
    discarded: u64,
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::with_max_payload(MAX_PAYLOAD_LEN)
    }

    /// Decoder with a custom payload sanity ceiling.
    pub fn with_max_payload(max_payload: usize) -> Self {
        Self {
            state: DecoderState::Idle,
            address: 0,
            payload: Vec::with_capacity(64),
            max_payload,
            discarded: 0,
        }
    }

    pub fn state(&self) -> DecoderState {
        self.state
    }

    /// Payload bytes buffered for the frame in progress.
    pub fn buffered_len(&self) -> usize {
        self.payload.len()
    }

    /// Bytes skipped while idle since the last call; resets the count.
    pub fn take_discarded(&mut self) -> u64 {
        std::mem::take(&mut self.discarded)
    }

    /// Drop any partial frame and return to [`DecoderState::Idle`].
    pub fn reset(&mut self) {
        self.state = DecoderState::Idle;
        self.payload.clear();
    }

    /// Feed a chunk, lazily yielding every frame or framing error it completes.
    ///
    /// Bytes the iterator has not reached yet are not consumed; drop the
    /// iterator only after exhausting it if every byte must be seen.
    pub fn decode<'a>(&'a mut self, chunk: &'a [u8]) -> Frames<'a> {
        Frames { decoder: self, bytes: chunk.iter() }
    }

    /// Advance the state machine by a single byte.
    pub fn push(&mut self, byte: u8) -> Option<DecodeResult> {
        match self.state {
            DecoderState::Idle => {
                if byte == SOH {
                    self.state = DecoderState::AwaitAddress;
                } else {
                    self.discarded += 1;
                }
                None
            }
            DecoderState::AwaitAddress => {
                self.address = byte;
                self.state = DecoderState::AwaitStart;
                None
            }
            DecoderState::AwaitStart => {
                if byte == STX {
                    self.payload.clear();
                    self.state = DecoderState::InPayload;
                    return None;
                }
                let err = FramingError::MissingStart { address: self.address, found: byte };
                // A heading in this position starts the next frame
                self.state =
                    if byte == SOH { DecoderState::AwaitAddress } else { DecoderState::Idle };
                trace!(%err, "resynchronizing");
                Some(Err(err))
            }
            DecoderState::InPayload => match byte {
                ETX => {
                    self.state = DecoderState::AwaitChecksum;
                    None
                }
                SOH => {
                    let err = FramingError::Interrupted { discarded: self.payload.len() };
                    self.payload.clear();
                    self.state = DecoderState::AwaitAddress;
                    trace!(%err, "resynchronizing");
                    Some(Err(err))
                }
                _ if self.payload.len() >= self.max_payload => {
                    self.reset();
                    Some(Err(FramingError::Oversized { limit: self.max_payload }))
                }
                _ => {
                    self.payload.push(byte);
                    None
                }
            },
            DecoderState::AwaitChecksum => {
                self.state = DecoderState::Idle;
                let payload = std::mem::replace(&mut self.payload, Vec::with_capacity(64));
                Some(Ok(RawFrame::new(self.address, payload, byte)))
            }
        }
    }
}

/// Lazy iterator over the frames completed by one chunk.
pub struct Frames<'a> {
    decoder: &'a mut FrameDecoder,
    bytes: std::slice::Iter<'a, u8>,
}

impl Iterator for Frames<'_> {
    type Item = DecodeResult;

    fn next(&mut self) -> Option<Self::Item> {
        for &byte in self.bytes.by_ref() {
            if let Some(result) = self.decoder.push(byte) {
                return Some(result);
            }
        }
        None
    }
}
