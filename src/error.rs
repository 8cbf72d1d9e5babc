use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while loading or preparing a sync run.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Sync folder not found: {path}\nCheck that the folderPath in the config file exists.")]
    SourceNotFound { path: PathBuf },

    #[error("Sync folder is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("Scan task failed: {0}")]
    ScanTask(String),
}

/// Errors from reading the client configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors from decoding what the server sent back.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("response is not valid UTF-8 (invalid byte at offset {offset})")]
    InvalidUtf8 { offset: usize },

    #[error("path is {len} bytes, framed mode allows at most {max}")]
    PathTooLong { len: usize, max: usize },

    #[error("{count} records exceed the framed record count limit")]
    TooManyRecords { count: usize },
}

/// Stage of a session, used to say where a timeout hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Connect,
    Send,
    Receive,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Stage::Connect => "connect",
            Stage::Send => "send",
            Stage::Receive => "receive",
        };
        f.write_str(s)
    }
}

/// Failure of a single synchronization session.
///
/// Every variant is local to the session: the loop reports it and moves on
/// to the next interval.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("cannot connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("send failed: {0}")]
    Send(#[source] io::Error),

    #[error("receive failed: {0}")]
    Receive(#[source] io::Error),

    #[error("cannot encode report: {0}")]
    Encode(#[source] ProtocolError),

    #[error("cannot decode server response: {0}")]
    Decode(#[source] ProtocolError),

    #[error("cannot enumerate sync folder: {0}")]
    Scan(#[from] SyncError),

    #[error("{stage} timed out after {limit:?}")]
    Timeout { stage: Stage, limit: Duration },

    #[error("session cancelled")]
    Cancelled,
}

impl SessionError {
    /// True for failures that happened before the socket was open.
    pub fn is_connect_failure(&self) -> bool {
        matches!(
            self,
            SessionError::Connect { .. }
                | SessionError::Timeout {
                    stage: Stage::Connect,
                    ..
                }
        )
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
