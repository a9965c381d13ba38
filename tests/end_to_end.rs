//! End-to-end behavior of the capture pipeline
//!
//! Bytes go in through the public API exactly as a scorepad connection would
//! deliver them; assertions are made on snapshots, diagnostics and the
//! overlay JSON.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{clock, frame, frame_with_lrc, penalties, score, wait_for_sequence};
use scorepad::publish::{JsonFileSink, Publisher, SnapshotSink};
use scorepad::sources::ReplaySource;
use scorepad::{
    Capture, CaptureMode, Diagnostics, Driver, MatchState, Pipeline, StateWriter, UpdateRate,
};
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;

fn setup() -> (Pipeline, StateWriter, Arc<Diagnostics>) {
    let diagnostics = Arc::new(Diagnostics::new());
    (Pipeline::new(Arc::clone(&diagnostics)), StateWriter::new(), diagnostics)
}

#[test]
fn scenario_documented_frame_checksum() {
    let (mut pipeline, mut writer, diagnostics) = setup();
    let handle = writer.handle();

    // 0x7F ^ 0x47 ^ 0x31 ^ 0x31 == 0x38, so 0x2D is rejected
    pipeline.process_chunk(&[0x01, 0x7F, 0x02, 0x47, 0x31, 0x31, 0x03, 0x2D], &mut writer);

    let report = diagnostics.report();
    assert_eq!(report.frames_decoded, 1);
    assert_eq!(report.checksum_failures, 1);
    assert_eq!(report.deltas_applied, 0);
    assert_eq!(handle.snapshot().sequence, 0);
}

#[test]
fn scenario_missing_end_of_text_keeps_second_frame() {
    let (mut pipeline, mut writer, diagnostics) = setup();
    let handle = writer.handle();

    let mut stream = vec![0x01, 0x7F, 0x02, b'G', b'6', b' '];
    stream.extend(score(5, 4));
    pipeline.process_chunk(&stream, &mut writer);

    let report = diagnostics.report();
    assert_eq!(report.framing_errors, 1);
    assert_eq!(report.frames_decoded, 1);
    assert_eq!(report.deltas_applied, 1);
    assert_eq!(handle.snapshot().state.score.home, 5);
    assert_eq!(handle.snapshot().state.score.guest, 4);
}

#[test]
fn scenario_unknown_payload_leaves_typed_state() {
    let (mut pipeline, mut writer, diagnostics) = setup();
    let handle = writer.handle();
    pipeline.process_chunk(&clock(8, 15, 1), &mut writer);
    let before = handle.snapshot().state;

    pipeline.process_chunk(&frame(&[0x47, 0x31, 0x31]), &mut writer);

    let after = handle.snapshot();
    assert_eq!(after.state, before);
    assert_eq!(after.sequence, 2);
    assert_eq!(diagnostics.unknown_payloads(), 1);

    let unknowns = handle.recent_unknowns();
    assert_eq!(unknowns.len(), 1);
    assert_eq!(unknowns[0].path, "unknown");
    assert_eq!(unknowns[0].raw, "0x473131");
}

#[test]
fn any_chunking_gives_the_same_state() {
    let mut stream = score(2, 1);
    stream.extend(frame_with_lrc(b"G6 S00909 ", 0x00));
    stream.extend(clock(17, 42, 2));
    stream.extend([0xFF, 0x00, 0x55]);
    stream.extend(penalties([
        (7, true, 2, 0),
        (0, false, 0, 0),
        (11, true, 0, 30),
        (3, false, 0, 0),
    ]));

    let reference = {
        let (mut pipeline, mut writer, _) = setup();
        pipeline.process_chunk(&stream, &mut writer);
        writer.handle().snapshot()
    };

    for size in [1, 2, 3, 7, 13, 64] {
        let (mut pipeline, mut writer, _) = setup();
        for chunk in stream.chunks(size) {
            pipeline.process_chunk(chunk, &mut writer);
        }
        let snapshot = writer.handle().snapshot();
        assert_eq!(snapshot.state, reference.state, "chunk size {size}");
        assert_eq!(snapshot.sequence, reference.sequence, "chunk size {size}");
    }

    let state = reference.state;
    assert_eq!((state.score.home, state.score.guest), (2, 1));
    assert_eq!(state.clock.time, "17:42");
    assert_eq!(state.clock.period, 2);
    assert!(state.penalties.home[0].active);
    assert_eq!(state.penalties.home[0].player, 7);
    assert_eq!(state.penalties.home[0].time, "02:00");
    assert!(!state.penalties.home[1].active);
    assert_eq!(state.penalties.guest[0].time, "00:30");
    assert_eq!(state.penalties.guest[1].player, 3);
}

#[tokio::test]
async fn replayed_capture_drives_overlay_json() {
    let dir = tempfile::tempdir().unwrap();
    let json_path = dir.path().join("matchfacts.json");

    let mut bytes = score(3, 2);
    bytes.extend(clock(4, 5, 3));
    bytes.extend(penalties([
        (0, false, 0, 0),
        (9, true, 1, 15),
        (0, false, 0, 0),
        (0, false, 0, 0),
    ]));

    let diagnostics = Arc::new(Diagnostics::new());
    let writer = StateWriter::new();
    let publisher = Publisher::new(writer.handle(), UpdateRate::Native)
        .with_sink(JsonFileSink::new(&json_path));
    let publisher = tokio::spawn(publisher.run(CancellationToken::new()));

    let exit = Driver::run(
        ReplaySource::from_bytes(bytes).with_chunk_size(5),
        writer,
        Arc::clone(&diagnostics),
        CancellationToken::new(),
    )
    .await;
    assert_eq!(exit.writer.sequence(), 3);
    drop(exit);

    publisher.await.unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(json["score"]["home"], 3);
    assert_eq!(json["score"]["guest"], 2);
    assert_eq!(json["MatchClock"]["time"], "04:05");
    assert_eq!(json["MatchClock"]["period"], 3);
    assert_eq!(json["Penalties"]["HomeTeam"]["Player2"]["HPP2-active"], 1);
    assert_eq!(json["Penalties"]["HomeTeam"]["Player2"]["HPP2-Time"], "01:15");
    assert_eq!(json["Penalties"]["GuestTeam"]["Player1"]["GPP1-Time"], "00:00");
}

#[tokio::test]
async fn default_state_json_has_every_overlay_key() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = JsonFileSink::new(dir.path().join("matchfacts.json"));
    sink.publish(&scorepad::Snapshot::new(MatchState::default(), 0)).await.unwrap();

    let json: serde_json::Value =
        serde_json::from_slice(&std::fs::read(sink.path()).unwrap()).unwrap();
    let expected = serde_json::json!({
        "score": {"home": 0, "guest": 0},
        "MatchClock": {"time": "00:00", "period": 0},
        "Penalties": {
            "HomeTeam": {
                "Player1": {"HPP1-active": 0, "HPP1-Time": "00:00"},
                "Player2": {"HPP2-active": 0, "HPP2-Time": "00:00"}
            },
            "GuestTeam": {
                "Player1": {"GPP1-active": 0, "GPP1-Time": "00:00"},
                "Player2": {"GPP2-active": 0, "GPP2-Time": "00:00"}
            }
        }
    });
    assert_eq!(json, expected);
}

#[tokio::test]
async fn reconnection_preserves_state_over_tcp() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let diagnostics = Arc::new(Diagnostics::new());
    let writer = StateWriter::new();
    let handle = writer.handle();
    let cancel = CancellationToken::new();
    let capture = Capture::new(
        CaptureMode::Server { bind: addr.to_string(), idle_timeout: None },
        Arc::clone(&diagnostics),
    );
    let task = tokio::spawn(capture.run(writer, cancel.clone()));

    // Wait for the listener to come up
    let mut stream = loop {
        match TcpStream::connect(addr).await {
            Ok(stream) => break stream,
            Err(_) => tokio::time::sleep(Duration::from_millis(10)).await,
        }
    };
    let mut first = score(6, 6);
    first.extend(clock(1, 0, 4));
    first.extend([0x01, 0x7F, 0x02, b'G']);
    stream.write_all(&first).await.unwrap();
    wait_for_sequence(&handle, 2).await;
    drop(stream);

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(&score(7, 6)).await.unwrap();
    wait_for_sequence(&handle, 3).await;

    let state = handle.snapshot().state;
    assert_eq!(state.score.home, 7);
    assert_eq!(state.clock.time, "01:00");
    assert_eq!(state.clock.period, 4);

    cancel.cancel();
    let writer = task.await.unwrap().unwrap();
    assert_eq!(writer.sequence(), 3);
    assert_eq!(diagnostics.report().connections, 2);
    assert_eq!(diagnostics.report().framing_errors, 0);
}
