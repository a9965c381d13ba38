//! TCP byte source for a single scorepad connection

use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tracing::{debug, info, trace};

use crate::source::ByteSource;
use crate::{Result, ScorepadError};

/// Read buffer size per `next_chunk` call.
pub const READ_BUFFER_SIZE: usize = 4096;

/// One accepted or connected TCP stream.
pub struct TcpSource {
    stream: TcpStream,
    peer: Option<SocketAddr>,
    buffer: Box<[u8]>,
    /// No data for this long counts as a disconnect
    idle_timeout: Option<Duration>,
}

impl TcpSource {
    pub fn new(stream: TcpStream) -> Self {
        let peer = stream.peer_addr().ok();
        let buffer = vec![0u8; READ_BUFFER_SIZE].into_boxed_slice();
        Self { stream, peer, buffer, idle_timeout: None }
    }

    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = Some(timeout);
        self
    }

    /// Connect to a scorepad acting as server.
    pub async fn connect(host: &str, port: u16, timeout: Duration) -> Result<Self> {
        let target = format!("{host}:{port}");
        debug!(%target, ?timeout, "connecting");

        let stream = tokio::time::timeout(timeout, TcpStream::connect(&target))
            .await
            .map_err(|_| ScorepadError::Timeout { duration: timeout })?
            .map_err(|e| {
                let reason = format!("connect to {target}");
                ScorepadError::connection_failed_with_source(reason, Box::new(e))
            })?;

        info!(%target, "connected to scorepad");
        Ok(Self::new(stream))
    }

    pub fn peer(&self) -> Option<SocketAddr> {
        self.peer
    }
}

#[async_trait::async_trait]
impl ByteSource for TcpSource {
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>> {
        let read = self.stream.read(&mut self.buffer);
        let n = match self.idle_timeout {
            Some(limit) => match tokio::time::timeout(limit, read).await {
                Ok(result) => result,
                Err(_) => {
                    info!(peer = ?self.peer, ?limit, "connection idle, treating as disconnect");
                    return Ok(None);
                }
            },
            None => read.await,
        }
        .map_err(|e| ScorepadError::io_error(format!("read from {:?}", self.peer), e))?;

        if n == 0 {
            debug!(peer = ?self.peer, "peer closed connection");
            return Ok(None);
        }

        trace!(bytes = n, "received chunk");
        Ok(Some(self.buffer[..n].to_vec()))
    }

    fn describe(&self) -> String {
        self.peer.map_or_else(|| "tcp".to_string(), |peer| peer.to_string())
    }
}
