//! mtsync - reports a folder's file modification times to a sync server.
//!
//! Every interval the client opens a TCP connection, sends the sync folder
//! path followed by one big-endian `u64` timestamp per regular file, reads
//! a single text reply and closes the connection.

pub mod cli;
pub mod config;
pub mod error;
pub mod protocol;
pub mod sync;
pub mod transport;

pub use config::ClientConfig;
pub use error::{Result, SessionError, SyncError};
pub use protocol::{ServerResponse, WireMode};
pub use sync::{SessionOptions, SessionReport, SyncLoop, SyncSession};
