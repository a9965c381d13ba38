//! Client mode: we connect to a listening scorepad

use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::aggregator::StateWriter;
use crate::diagnostics::Diagnostics;
use crate::driver::{Driver, ExitReason};
use crate::sources::TcpSource;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub host: String,
    pub port: u16,
    pub connect_timeout: Duration,
    pub retry_delay: Duration,
}

/// Connect, run to disconnect, wait, repeat, until cancelled.
pub async fn connect_loop(
    settings: ClientSettings,
    mut writer: StateWriter,
    diagnostics: Arc<Diagnostics>,
    cancel: CancellationToken,
) -> StateWriter {
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        let connect =
            TcpSource::connect(&settings.host, settings.port, settings.connect_timeout);
        let connected = tokio::select! {
            _ = cancel.cancelled() => break,
            connected = connect => connected,
        };

        match connected {
            Ok(source) => {
                attempt = 0;
                diagnostics.record_connection();

                let exit =
                    Driver::run(source, writer, Arc::clone(&diagnostics), cancel.child_token())
                        .await;
                writer = exit.writer;

                if matches!(exit.reason, ExitReason::Cancelled) {
                    break;
                }
                info!(
                    reason = %exit.reason,
                    retry_in = ?settings.retry_delay,
                    "scorepad connection lost"
                );
            }
            Err(e) => {
                warn!(
                    host = %settings.host,
                    port = settings.port,
                    attempt,
                    error = %e,
                    retry_in = ?settings.retry_delay,
                    "connect failed"
                );
            }
        }

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(settings.retry_delay) => {}
        }
    }

    info!("capture client stopped");
    writer
}
