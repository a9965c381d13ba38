//! Test utilities for building scorepad wire data
//!
//! Builders for well-formed frames and for payloads matching each known
//! layout. Used by unit tests and benchmarks.

#![cfg(any(test, feature = "benchmark"))]

use crate::checksum::lrc;
use crate::types::{DEFAULT_ADDRESS, ETX, SOH, STX};

/// Encode `SOH addr STX payload ETX lrc` with a correct LRC.
pub fn build_frame(address: u8, payload: &[u8]) -> Vec<u8> {
    build_frame_with_lrc(address, payload, lrc(address, payload))
}

/// Encode a frame with an arbitrary trailing checksum byte.
pub fn build_frame_with_lrc(address: u8, payload: &[u8], checksum: u8) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(payload.len() + 5);
    bytes.extend_from_slice(&[SOH, address, STX]);
    bytes.extend_from_slice(payload);
    bytes.extend_from_slice(&[ETX, checksum]);
    bytes
}

/// Frame addressed from the default scorepad address.
pub fn scorepad_frame(payload: &[u8]) -> Vec<u8> {
    build_frame(DEFAULT_ADDRESS, payload)
}

/// Score payload (`'6'` marker), scores as two ASCII digits each.
pub fn score_payload(home: u32, guest: u32) -> Vec<u8> {
    format!("G6 S0{home:02}{guest:02} ").into_bytes()
}

/// Clock payload (`'7'` marker), optionally with a period digit.
pub fn clock_payload(minutes: u32, seconds: u32, period: Option<u8>) -> Vec<u8> {
    let mut payload = format!("G7 S0{minutes:02}{seconds:02}").into_bytes();
    if let Some(period) = period {
        payload.push(b'0' + period);
    }
    payload
}

/// Penalties payload (`'8'` marker): home 1, home 2, guest 1, guest 2 as
/// `(player, active, minutes, seconds)`.
pub fn penalties_payload(slots: [(u32, bool, u32, u32); 4]) -> Vec<u8> {
    let mut payload = b"G8".to_vec();
    for (player, active, minutes, seconds) in slots {
        payload.extend(format!("{player:02}{}{minutes:02}{seconds:02}", u8::from(active)).bytes());
    }
    payload
}

/// A mixed stream of score, clock and unknown frames, `rounds` times over.
pub fn sample_stream(rounds: u32) -> Vec<u8> {
    let mut stream = Vec::new();
    for i in 0..rounds {
        stream.extend(scorepad_frame(&score_payload(i % 100, (i * 3) % 100)));
        let period = Some((i % 4) as u8 + 1);
        stream.extend(scorepad_frame(&clock_payload(i % 60, (i * 7) % 60, period)));
        stream.extend(scorepad_frame(&[0x47, 0x31, 0x31]));
    }
    stream
}
