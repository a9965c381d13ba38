//! Capture supervisor: owns the TCP side of the scorepad link
//!
//! One connection is processed at a time. Each connection gets a fresh
//! decoder through [`Driver`](crate::driver::Driver); the single
//! [`StateWriter`] is moved from connection to connection so the match state
//! outlives any disconnect.

mod client;
mod server;


pub use client::{ClientSettings, connect_loop};
pub use server::serve;

use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::aggregator::StateWriter;
use crate::config::{Config, Mode};
use crate::diagnostics::Diagnostics;
use crate::{Result, ScorepadError};

/// How the capture reaches the scorepad.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureMode {
    /// Listen on `bind` and accept the scorepad's connections
    Server { bind: String, idle_timeout: Option<Duration> },
    /// Connect out, retrying after `retry_delay`
    Client { host: String, port: u16, connect_timeout: Duration, retry_delay: Duration },
}

impl CaptureMode {
    pub fn from_config(config: &Config) -> Self {
        match config.mode {
            Mode::Server => CaptureMode::Server {
                bind: config.server.bind_address(),
                idle_timeout: config.server.idle_timeout_secs.map(Duration::from_secs),
            },
            Mode::Client => CaptureMode::Client {
                host: config.client.target_host.clone(),
                port: config.client.target_port,
                connect_timeout: config.client.connect_timeout(),
                retry_delay: config.client.retry_delay(),
            },
        }
    }
}

/// Long-running capture over TCP.
pub struct Capture {
    mode: CaptureMode,
    diagnostics: Arc<Diagnostics>,
}

impl Capture {
    pub fn new(mode: CaptureMode, diagnostics: Arc<Diagnostics>) -> Self {
        Self { mode, diagnostics }
    }

    pub fn mode(&self) -> &CaptureMode {
        &self.mode
    }

    /// Run until `cancel` fires, then return the writer.
    ///
    /// Only a failure to bind the listening socket is returned as an error;
    /// connection-level problems are logged and retried.
    pub async fn run(self, writer: StateWriter, cancel: CancellationToken) -> Result<StateWriter> {
        match self.mode {
            CaptureMode::Server { bind, idle_timeout } => {
                let listener = TcpListener::bind(&bind).await.map_err(|e| {
                    let reason = format!("bind {bind}");
                    ScorepadError::connection_failed_with_source(reason, Box::new(e))
                })?;
                info!(%bind, "scorepad capture server listening");
                Ok(serve(listener, idle_timeout, writer, self.diagnostics, cancel).await)
            }
            CaptureMode::Client { host, port, connect_timeout, retry_delay } => {
                info!(%host, port, "scorepad capture client starting");
                let settings = ClientSettings { host, port, connect_timeout, retry_delay };
                Ok(connect_loop(settings, writer, self.diagnostics, cancel).await)
            }
        }
    }
}
