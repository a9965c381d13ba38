//! Overlay JSON file sink

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::SnapshotSink;
use crate::types::Snapshot;
use crate::{Result, ScorepadError};

/// Writes each snapshot as pretty JSON, replacing the file atomically.
///
/// Overlay software polls this file; writing a sibling temp file and renaming
/// it over the target means a reader never sees a half-written document.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
    temp_path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut temp_name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        temp_name.push(".tmp");
        let temp_path = path.with_file_name(temp_name);
        Self { path, temp_path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Overlay JSON with a 4-space indent and trailing newline.
pub fn to_overlay_json(snapshot: &Snapshot) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(512);
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = Serializer::with_formatter(&mut out, formatter);
    snapshot.serialize(&mut serializer)?;
    out.push(b'\n');
    Ok(out)
}

#[async_trait::async_trait]
impl SnapshotSink for JsonFileSink {
    async fn publish(&mut self, snapshot: &Snapshot) -> Result<()> {
        let body = to_overlay_json(snapshot)?;

        tokio::fs::write(&self.temp_path, &body)
            .await
            .map_err(|e| ScorepadError::file_error(self.temp_path.clone(), e))?;
        tokio::fs::rename(&self.temp_path, &self.path)
            .await
            .map_err(|e| ScorepadError::file_error(self.path.clone(), e))?;

        debug!(path = %self.path.display(), sequence = snapshot.sequence, "wrote overlay JSON");
        Ok(())
    }

    fn name(&self) -> &str {
        "json-file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MatchState;

    #[tokio::test]
    async fn writes_overlay_document() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = JsonFileSink::new(dir.path().join("matchfacts.json"));

        let mut state = MatchState::default();
        state.score.home = 3;
        state.clock.time = "07:45".to_string();
        state.penalties.home[0].active = true;
        state.penalties.home[0].time = "01:30".to_string();
        sink.publish(&Snapshot::new(state, 4)).await.unwrap();

        let text = std::fs::read_to_string(sink.path()).unwrap();
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["score"]["home"], 3);
        assert_eq!(json["MatchClock"]["time"], "07:45");
        assert_eq!(json["Penalties"]["HomeTeam"]["Player1"]["HPP1-active"], 1);
        assert_eq!(json["Penalties"]["HomeTeam"]["Player1"]["HPP1-Time"], "01:30");
        assert_eq!(json["Penalties"]["GuestTeam"]["Player2"]["GPP2-active"], 0);
        assert!(text.contains("\n    \"score\": {\n        \"home\": 3,"));
        assert!(!dir.path().join("matchfacts.json.tmp").exists());
    }

    #[tokio::test]
    async fn overwrites_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = JsonFileSink::new(dir.path().join("out.json"));

        let mut state = MatchState::default();
        sink.publish(&Snapshot::new(state.clone(), 1)).await.unwrap();
        state.penalties.guest[1].active = true;
        sink.publish(&Snapshot::new(state, 2)).await.unwrap();

        let json: serde_json::Value =
            serde_json::from_slice(&std::fs::read(sink.path()).unwrap()).unwrap();
        assert_eq!(json["Penalties"]["GuestTeam"]["Player2"]["GPP2-active"], 1);
    }

    #[tokio::test]
    async fn missing_directory_is_a_file_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = JsonFileSink::new(dir.path().join("missing").join("out.json"));
        let err = sink.publish(&Snapshot::new(MatchState::default(), 0)).await.unwrap_err();
        assert!(matches!(err, ScorepadError::File { .. }));
    }
}
