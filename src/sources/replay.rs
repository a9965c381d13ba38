//! Replay source for recorded scorepad captures

use std::path::Path;
use tokio::time::{Duration, Interval, MissedTickBehavior, interval};
use tracing::{debug, info};

use crate::source::ByteSource;
use crate::{Result, ScorepadError};

/// Default replay chunk size.
pub const DEFAULT_CHUNK_SIZE: usize = 64;

/// Replays a byte capture in fixed-size chunks.
///
/// Captures are either raw bytes as read off the socket or hex text (pairs of
/// hex digits, whitespace ignored), the form traffic dumps are usually shared
/// in.
pub struct ReplaySource {
    data: Vec<u8>,
    position: usize,
    chunk_size: usize,
    /// Pacing between chunks; `None` replays as fast as consumed
    pacing: Option<Interval>,
    label: String,
}

impl ReplaySource {
    pub fn from_bytes(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: data.into(),
            position: 0,
            chunk_size: DEFAULT_CHUNK_SIZE,
            pacing: None,
            label: "memory".to_string(),
        }
    }

    /// Open a capture file, detecting hex text.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw =
            std::fs::read(path).map_err(|e| ScorepadError::file_error(path.to_path_buf(), e))?;

        let data = if looks_like_hex(&raw) {
            decode_hex_text(&raw)?
        } else {
            raw
        };

        info!(path = %path.display(), bytes = data.len(), "opened capture");

        let mut source = Self::from_bytes(data);
        source.label = path.display().to_string();
        Ok(source)
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Wait `period` between chunks. Requires a tokio runtime.
    pub fn with_pacing(mut self, period: Duration) -> Self {
        let mut pacing = interval(period);
        pacing.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.pacing = Some(pacing);
        self
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }
}

#[async_trait::async_trait]
impl ByteSource for ReplaySource {
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>> {
        if self.position >= self.data.len() {
            debug!(source = %self.label, "reached end of capture");
            return Ok(None);
        }

        if let Some(pacing) = self.pacing.as_mut() {
            pacing.tick().await;
        }

        let end = (self.position + self.chunk_size).min(self.data.len());
        let chunk = self.data[self.position..end].to_vec();
        self.position = end;
        Ok(Some(chunk))
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}

fn looks_like_hex(raw: &[u8]) -> bool {
    let mut digits = 0usize;
    for &b in raw {
        if b.is_ascii_hexdigit() {
            digits += 1;
        } else if !b.is_ascii_whitespace() {
            return false;
        }
    }
    digits > 0 && digits % 2 == 0
}

fn decode_hex_text(raw: &[u8]) -> Result<Vec<u8>> {
    let compact: Vec<u8> = raw.iter().copied().filter(|b| !b.is_ascii_whitespace()).collect();
    hex::decode(compact).map_err(|e| ScorepadError::Capture { details: e.to_string() })
}
