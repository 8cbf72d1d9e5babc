//! TCP connection to the sync server.
//!
//! Every blocking step (connect, each write, the response read) runs under
//! its own deadline.

use crate::error::{SessionError, Stage};
use bytes::Bytes;
use std::future::Future;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;

/// Default deadline for each network operation
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub connect: Duration,
    pub io: Duration,
}

impl Timeouts {
    pub fn uniform(timeout: Duration) -> Self {
        Self {
            connect: timeout,
            io: timeout,
        }
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        Self::uniform(DEFAULT_TIMEOUT)
    }
}

async fn with_deadline<T, F>(stage: Stage, limit: Duration, fut: F) -> Result<T, SessionError>
where
    F: Future<Output = Result<T, SessionError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(SessionError::Timeout { stage, limit }),
    }
}

/// Owns one stream for the length of one session.
///
/// Generic over the stream so a session can also run over an in-memory pipe.
pub struct Connection<S> {
    stream: S,
    timeouts: Timeouts,
}

impl Connection<TcpStream> {
    /// Connect to `host:port`, resolving the host name if needed.
    pub async fn connect_tcp(host: &str, port: u16, timeouts: Timeouts) -> Result<Self, SessionError> {
        let addr = format!("{}:{}", host, port);
        tracing::debug!("connecting to {}", addr);

        let stream = with_deadline(Stage::Connect, timeouts.connect, async {
            TcpStream::connect(&addr)
                .await
                .map_err(|source| SessionError::Connect {
                    addr: addr.clone(),
                    source,
                })
        })
        .await?;

        // Records are tiny; don't let Nagle coalesce them behind the path.
        if let Err(e) = stream.set_nodelay(true) {
            tracing::debug!("set_nodelay failed: {}", e);
        }

        Ok(Self::new(stream, timeouts))
    }
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, timeouts: Timeouts) -> Self {
        Self { stream, timeouts }
    }

    /// Write one message in full.
    pub async fn send(&mut self, bytes: &Bytes) -> Result<(), SessionError> {
        let stream = &mut self.stream;
        with_deadline(Stage::Send, self.timeouts.io, async move {
            stream.write_all(bytes).await.map_err(SessionError::Send)?;
            stream.flush().await.map_err(SessionError::Send)
        })
        .await
    }

    /// Exactly one read of at most `capacity` bytes. No draining loop.
    pub async fn recv_once(&mut self, capacity: usize) -> Result<Vec<u8>, SessionError> {
        let stream = &mut self.stream;
        with_deadline(Stage::Receive, self.timeouts.io, async move {
            let mut buf = vec![0u8; capacity];
            let n = stream.read(&mut buf).await.map_err(SessionError::Receive)?;
            buf.truncate(n);
            Ok(buf)
        })
        .await
    }

    /// Shut down the write half and drop the stream.
    pub async fn close(mut self) {
        if let Err(e) = self.stream.shutdown().await {
            tracing::debug!("shutdown failed: {}", e);
        }
    }
}
