//! One synchronization session: connect, report, read the reply, close.
//!
//! Sessions share nothing. Each one opens its own socket, walks the folder
//! from scratch and drops the socket before returning.

use std::fmt;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::sync::CancellationToken;

use crate::config::ClientConfig;
use crate::error::{SessionError, SyncError};
use crate::protocol::{
    decode_response, encode_path, encode_record, encode_record_count, ServerResponse, WireMode,
    DEFAULT_PORT, RESPONSE_CAPACITY,
};
use crate::sync::scanner::{scan_records, FileRecord};
use crate::transport::{Connection, Timeouts};

/// Knobs that are not part of the config file's identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    pub port: u16,
    pub timeouts: Timeouts,
    pub mode: WireMode,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            timeouts: Timeouts::default(),
            mode: WireMode::Legacy,
        }
    }
}

pub struct SyncSession<'a> {
    config: &'a ClientConfig,
    options: SessionOptions,
}

impl<'a> SyncSession<'a> {
    pub fn new(config: &'a ClientConfig, options: SessionOptions) -> Self {
        Self { config, options }
    }

    /// Run the whole exchange against the configured server.
    ///
    /// Cancelling the token drops the in-flight connection.
    pub async fn run(&self, cancel: &CancellationToken) -> Result<ServerResponse, SessionError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(SessionError::Cancelled),
            result = self.connect_and_exchange() => result,
        }
    }

    async fn connect_and_exchange(&self) -> Result<ServerResponse, SessionError> {
        let conn = Connection::connect_tcp(
            &self.config.server_address,
            self.options.port,
            self.options.timeouts,
        )
        .await?;
        self.exchange(conn).await
    }

    /// Report over an already-open stream, then close it on every path.
    pub async fn exchange<S>(&self, mut conn: Connection<S>) -> Result<ServerResponse, SessionError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let result = self.report(&mut conn).await;
        conn.close().await;
        result
    }

    async fn report<S>(&self, conn: &mut Connection<S>) -> Result<ServerResponse, SessionError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let mode = self.options.mode;

        // 1. Declare the folder, exactly as configured
        let path = self.config.sync_folder.to_string_lossy();
        let hello = encode_path(&path, mode).map_err(SessionError::Encode)?;
        conn.send(&hello).await?;

        // 2. Walk and report
        let records = self.collect_records().await?;
        if mode.is_framed() {
            let count = encode_record_count(records.len()).map_err(SessionError::Encode)?;
            conn.send(&count).await?;
        }
        for record in &records {
            conn.send(&encode_record(record.mtime)).await?;
        }
        tracing::debug!("sent {} records for {}", records.len(), path);

        // 3. One bounded read
        let buf = conn.recv_once(RESPONSE_CAPACITY).await?;
        let response = decode_response(&buf).map_err(SessionError::Decode)?;
        if response.truncated_utf8 {
            tracing::debug!("response ended mid-character after {} bytes", response.bytes_read);
        }
        Ok(response)
    }

    /// A sync folder that doesn't exist yet, or is a plain file, reports zero files.
    async fn collect_records(&self) -> Result<Vec<FileRecord>, SessionError> {
        match scan_records(&self.config.sync_folder).await {
            Ok(records) => Ok(records),
            Err(e @ (SyncError::SourceNotFound { .. } | SyncError::NotADirectory { .. })) => {
                tracing::warn!("{}, reporting no files", e);
                Ok(Vec::new())
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Outcome of one session as shown to the operator.
#[derive(Debug)]
pub struct SessionReport {
    pub iteration: u64,
    pub outcome: Result<ServerResponse, SessionError>,
}

impl SessionReport {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

impl fmt::Display for SessionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            Ok(response) => write!(f, "Server Response: {}", response.text),
            Err(e) => write!(f, "Error: {}", e),
        }
    }
}
