//! scorepad - Bodet Scorepad capture for broadcast overlays.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use scorepad::config::{Config, Mode};
use scorepad::driver::Driver;
use scorepad::publish::{ConsoleSink, JsonFileSink, Publisher};
use scorepad::sources::ReplaySource;
use scorepad::{Capture, CaptureMode, Diagnostics, ScorepadError, StateWriter};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Debug, Parser)]
#[command(version, about = "Capture Bodet Scorepad data and publish overlay JSON")]
struct Args {
    /// YAML configuration file
    #[arg(long, short, env = "SCOREPAD_CONFIG", default_value = "scorepad.yaml")]
    config: PathBuf,

    /// Override connection mode
    #[arg(long, value_enum)]
    mode: Option<Mode>,

    /// Server mode: address to bind
    #[arg(long)]
    host: Option<String>,

    /// Server mode: port to listen on
    #[arg(long)]
    port: Option<u16>,

    /// Client mode: scorepad address
    #[arg(long)]
    target_host: Option<String>,

    /// Client mode: scorepad port
    #[arg(long)]
    target_port: Option<u16>,

    /// Overlay JSON output path
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Maximum overlay updates per second
    #[arg(long)]
    publish_hz: Option<u32>,

    /// Disable the console summary
    #[arg(long)]
    no_console: bool,

    /// Replay a recorded capture (raw or hex text) instead of using TCP
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Replay pacing between chunks, in milliseconds
    #[arg(long, default_value_t = 0)]
    replay_interval_ms: u64,
}

impl Args {
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(target_host) = &self.target_host {
            config.client.target_host = target_host.clone();
        }
        if let Some(target_port) = self.target_port {
            config.client.target_port = target_port;
        }
        if let Some(output) = &self.output {
            config.output.json_path = output.clone();
        }
        if self.publish_hz.is_some() {
            config.output.publish_hz = self.publish_hz;
        }
        if self.no_console {
            config.output.console = false;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let args = Args::parse();
    let mut config = Config::load(&args.config).context("failed to load configuration")?;
    args.apply_overrides(&mut config);
    config.validate().context("invalid configuration")?;

    info!(
        mode = ?config.mode,
        json_path = %config.output.json_path.display(),
        publish_hz = ?config.output.publish_hz,
        "starting scorepad capture"
    );

    let diagnostics = Arc::new(Diagnostics::new());
    let writer = StateWriter::new();
    let cancel = CancellationToken::new();

    let mut publisher = Publisher::new(writer.handle(), config.output.update_rate())
        .with_sink(JsonFileSink::new(&config.output.json_path));
    if config.output.console {
        publisher = publisher.with_sink(ConsoleSink::new());
    }
    let publisher = tokio::spawn(publisher.run(cancel.clone()));

    let capture_cancel = cancel.clone();
    let capture_diagnostics = Arc::clone(&diagnostics);
    let mut capture = match &args.replay {
        Some(path) => {
            let mut source = ReplaySource::open(path)
                .with_context(|| format!("failed to open capture {}", path.display()))?;
            if args.replay_interval_ms > 0 {
                source = source.with_pacing(Duration::from_millis(args.replay_interval_ms));
            }
            tokio::spawn(async move {
                let exit = Driver::run(source, writer, capture_diagnostics, capture_cancel).await;
                Ok::<_, ScorepadError>(exit.writer)
            })
        }
        None => {
            let capture = Capture::new(CaptureMode::from_config(&config), capture_diagnostics);
            tokio::spawn(capture.run(writer, capture_cancel))
        }
    };

    let mut failure = None;
    tokio::select! {
        result = &mut capture => {
            // Replay finished or the capture could not start. The writer is
            // dropped here, which ends the publisher after its last snapshot.
            if let Err(err) = finish_capture(result.context("capture task panicked")?) {
                failure = Some(err);
            }
        }
        signal = tokio::signal::ctrl_c() => {
            if let Err(err) = signal {
                error!(error = %err, "failed to listen for shutdown signal");
            }
            info!("shutting down");
            cancel.cancel();
            if let Ok(Ok(writer)) = capture.await {
                info!(sequence = writer.sequence(), "capture stopped");
            }
        }
    }

    let published = publisher.await.context("publisher task panicked")?;
    info!(published, "publisher finished");
    diagnostics.log_summary();

    match failure {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Log how the capture ended; a capture error becomes the process error.
fn finish_capture(result: scorepad::Result<StateWriter>) -> Result<StateWriter> {
    match result {
        Ok(writer) => {
            info!(sequence = writer.sequence(), "capture finished");
            Ok(writer)
        }
        Err(err) => {
            error!(error = %err, "capture failed");
            for suggestion in err.recovery_suggestions() {
                info!("  - {suggestion}");
            }
            Err(err).context("capture failed")
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry().with(filter).with(tracing_subscriber::fmt::layer()).init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_error_fails_the_process() {
        let err = finish_capture(Err(ScorepadError::connection_failed("address in use")))
            .unwrap_err();
        assert_eq!(err.to_string(), "capture failed");
        assert!(err.root_cause().to_string().contains("address in use"));

        let writer = finish_capture(Ok(StateWriter::new())).unwrap();
        assert_eq!(writer.sequence(), 0);
    }

    #[test]
    fn mode_flag_parses_as_value_enum() {
        let args = Args::try_parse_from(["scorepad", "--mode", "client"]).unwrap();
        assert_eq!(args.mode, Some(Mode::Client));
        assert!(Args::try_parse_from(["scorepad", "--mode", "relay"]).is_err());

        let mut config = Config::default();
        args.apply_overrides(&mut config);
        assert_eq!(config.mode, Mode::Client);
    }
}
