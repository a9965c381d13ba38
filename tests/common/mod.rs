//! Shared helpers for integration tests

#![allow(dead_code)]

use std::time::Duration;

use futures::StreamExt;
use scorepad::checksum::lrc;
use scorepad::types::{DEFAULT_ADDRESS, ETX, SOH, STX};
use scorepad::{SnapshotHandle, UpdateRate};

pub fn frame(payload: &[u8]) -> Vec<u8> {
    frame_with_lrc(payload, lrc(DEFAULT_ADDRESS, payload))
}

pub fn frame_with_lrc(payload: &[u8], checksum: u8) -> Vec<u8> {
    let mut bytes = vec![SOH, DEFAULT_ADDRESS, STX];
    bytes.extend_from_slice(payload);
    bytes.extend([ETX, checksum]);
    bytes
}

pub fn score(home: u32, guest: u32) -> Vec<u8> {
    frame(format!("G6 S0{home:02}{guest:02} ").as_bytes())
}

pub fn clock(minutes: u32, seconds: u32, period: u32) -> Vec<u8> {
    frame(format!("G7 S0{minutes:02}{seconds:02}{period}").as_bytes())
}

/// Four slots, home 1, home 2, guest 1, guest 2: `(player, active, mm, ss)`.
pub fn penalties(slots: [(u32, bool, u32, u32); 4]) -> Vec<u8> {
    let mut payload = b"G8".to_vec();
    for (player, active, minutes, seconds) in slots {
        payload.extend(format!("{player:02}{}{minutes:02}{seconds:02}", u8::from(active)).bytes());
    }
    frame(&payload)
}

pub async fn wait_for_sequence(handle: &SnapshotHandle, sequence: u64) {
    let mut updates = handle.subscribe(UpdateRate::Native);
    tokio::time::timeout(Duration::from_secs(5), async {
        while let Some(snapshot) = updates.next().await {
            if snapshot.sequence >= sequence {
                return;
            }
        }
    })
    .await
    .expect("sequence not reached in time");
}
