//! Capture configuration
//!
//! Loaded from a YAML file; every field has a default so a partial file (or
//! none at all) is valid. Command-line flags are applied on top by the
//! binary.
//!
//! ```yaml
//! mode: client
//! client:
//!   target_host: 192.168.1.50
//!   target_port: 4001
//! output:
//!   json_path: /var/www/overlay/matchfacts.json
//!   publish_hz: 10
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

use crate::types::UpdateRate;
use crate::{Result, ScorepadError};

/// Scorepad TCP port.
pub const DEFAULT_PORT: u16 = 4001;

/// Which side opens the TCP connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Listen; the scorepad connects to us
    #[default]
    Server,
    /// Connect out to a scorepad that listens
    Client,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Drop a connection after this long without data
    pub idle_timeout_secs: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "0.0.0.0".to_string(), port: DEFAULT_PORT, idle_timeout_secs: None }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub target_host: String,
    pub target_port: u16,
    pub connect_timeout_secs: u64,
    pub retry_delay_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            target_host: String::new(),
            target_port: DEFAULT_PORT,
            connect_timeout_secs: 10,
            retry_delay_secs: 5,
        }
    }
}

impl ClientConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub json_path: PathBuf,
    pub console: bool,
    /// Cap on snapshot publications per second; unset publishes every change
    pub publish_hz: Option<u32>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { json_path: PathBuf::from("matchfacts.json"), console: true, publish_hz: None }
    }
}

impl OutputConfig {
    pub fn update_rate(&self) -> UpdateRate {
        UpdateRate::from_hz(self.publish_hz)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub mode: Mode,
    pub server: ServerConfig,
    pub client: ClientConfig,
    pub output: OutputConfig,
}

impl Config {
    /// Parse YAML text.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml_ng::from_str(yaml)?)
    }

    /// Load from `path`, falling back to defaults when the file is missing.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "config file not found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ScorepadError::file_error(path.to_path_buf(), e)),
        };

        let config = Self::from_yaml(&text)?;
        debug!(path = %path.display(), ?config, "loaded config");
        Ok(config)
    }

    /// Check the settings the selected mode depends on.
    pub fn validate(&self) -> Result<()> {
        match self.mode {
            Mode::Server => {
                if self.server.port == 0 {
                    return Err(ScorepadError::config_error("server.port must be non-zero"));
                }
            }
            Mode::Client => {
                if self.client.target_host.trim().is_empty() {
                    return Err(ScorepadError::config_error(
                        "client mode requires client.target_host",
                    ));
                }
                if self.client.target_port == 0 {
                    return Err(ScorepadError::config_error("client.target_port must be non-zero"));
                }
            }
        }
        if self.output.publish_hz == Some(0) {
            return Err(ScorepadError::config_error("output.publish_hz must be non-zero"));
        }
        Ok(())
    }
}
