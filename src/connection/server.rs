//! Server mode: the scorepad connects to us

use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::aggregator::StateWriter;
use crate::diagnostics::Diagnostics;
use crate::driver::{Driver, ExitReason};
use crate::sources::TcpSource;

/// Pause after a failed accept before trying again.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(200);

/// Accept connections one at a time until cancelled.
///
/// A second scorepad connecting while one is active waits in the listen
/// backlog until the first disconnects.
pub async fn serve(
    listener: TcpListener,
    idle_timeout: Option<Duration>,
    mut writer: StateWriter,
    diagnostics: Arc<Diagnostics>,
    cancel: CancellationToken,
) -> StateWriter {
    loop {
        let accepted = tokio::select! {
            _ = cancel.cancelled() => break,
            accepted = listener.accept() => accepted,
        };

        let (stream, peer) = match accepted {
            Ok(pair) => pair,
            Err(e) => {
                warn!(error = %e, "accept failed");
                tokio::time::sleep(ACCEPT_BACKOFF).await;
                continue;
            }
        };

        diagnostics.record_connection();
        info!(%peer, "scorepad connected");

        let mut source = TcpSource::new(stream);
        if let Some(timeout) = idle_timeout {
            source = source.with_idle_timeout(timeout);
        }

        let exit =
            Driver::run(source, writer, Arc::clone(&diagnostics), cancel.child_token()).await;
        writer = exit.writer;

        match exit.reason {
            ExitReason::Cancelled => break,
            reason => info!(%peer, %reason, "scorepad connection closed"),
        }
    }

    info!("capture server stopped");
    writer
}
