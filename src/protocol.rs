//! Wire format for the modification-time report.
//!
//! Client -> server, legacy mode (the default):
//!
//! ```text
//! path bytes (UTF-8, no length, no terminator)
//! mtime:u64 BE      (one write per regular file)
//! mtime:u64 BE
//! ...               (no count, no end marker)
//! ```
//!
//! Framed mode prepends `len:u16` to the path and sends `count:u32` before
//! the records. It is not understood by legacy servers.
//!
//! Server -> client: one read of at most [`RESPONSE_CAPACITY`] bytes, UTF-8.
//!
//! Records carry no file name, so a server cannot tell which timestamp
//! belongs to which file.

use crate::error::ProtocolError;
use bytes::{BufMut, Bytes, BytesMut};

/// Well-known server port
pub const DEFAULT_PORT: u16 = 12345;

/// Upper bound of the single response read
pub const RESPONSE_CAPACITY: usize = 1024;

/// Size of one timestamp record on the wire
pub const RECORD_SIZE: usize = 8;

/// Longest path the framed mode can announce
pub const MAX_FRAMED_PATH: usize = u16::MAX as usize;

// =============================================================================
// Wire Mode
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum WireMode {
    /// Raw path followed by bare records
    #[default]
    Legacy,
    /// Length-prefixed path and a record count
    Framed,
}

impl WireMode {
    pub fn is_framed(&self) -> bool {
        matches!(self, WireMode::Framed)
    }
}

// =============================================================================
// Client -> Server
// =============================================================================

/// Encode the opening "which folder" message.
pub fn encode_path(path: &str, mode: WireMode) -> Result<Bytes, ProtocolError> {
    let path_bytes = path.as_bytes();
    match mode {
        WireMode::Legacy => Ok(Bytes::copy_from_slice(path_bytes)),
        WireMode::Framed => {
            if path_bytes.len() > MAX_FRAMED_PATH {
                return Err(ProtocolError::PathTooLong {
                    len: path_bytes.len(),
                    max: MAX_FRAMED_PATH,
                });
            }
            let mut buf = BytesMut::with_capacity(2 + path_bytes.len());
            buf.put_u16(path_bytes.len() as u16);
            buf.put_slice(path_bytes);
            Ok(buf.freeze())
        }
    }
}

/// Encode the record count announced in framed mode.
pub fn encode_record_count(count: usize) -> Result<Bytes, ProtocolError> {
    let count = u32::try_from(count).map_err(|_| ProtocolError::TooManyRecords { count })?;
    let mut buf = BytesMut::with_capacity(4);
    buf.put_u32(count);
    Ok(buf.freeze())
}

/// Encode one modification time as 8 big-endian bytes.
pub fn encode_record(mtime: u64) -> Bytes {
    let mut buf = BytesMut::with_capacity(RECORD_SIZE);
    buf.put_u64(mtime);
    buf.freeze()
}

/// Decode a single record. Returns `None` unless `buf` is exactly 8 bytes.
pub fn decode_record(buf: &[u8]) -> Option<u64> {
    let bytes: [u8; RECORD_SIZE] = buf.try_into().ok()?;
    Some(u64::from_be_bytes(bytes))
}

/// Split a run of concatenated records. Trailing partial bytes are dropped.
pub fn decode_records(buf: &[u8]) -> Vec<u64> {
    buf.chunks_exact(RECORD_SIZE)
        .filter_map(decode_record)
        .collect()
}

// =============================================================================
// Server -> Client
// =============================================================================

/// Text reply from the server, as received by one bounded read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerResponse {
    pub text: String,
    pub bytes_read: usize,
    /// The read ended inside a multi-byte character; the partial tail was dropped.
    pub truncated_utf8: bool,
}

/// Decode a response buffer.
///
/// A multi-byte sequence cut off at the end of the buffer is truncation, not
/// corruption: the valid prefix is kept. Invalid bytes anywhere else fail.
pub fn decode_response(buf: &[u8]) -> Result<ServerResponse, ProtocolError> {
    match std::str::from_utf8(buf) {
        Ok(text) => Ok(ServerResponse {
            text: text.to_string(),
            bytes_read: buf.len(),
            truncated_utf8: false,
        }),
        Err(e) if e.error_len().is_none() => {
            let valid = &buf[..e.valid_up_to()];
            Ok(ServerResponse {
                // valid_up_to guarantees this prefix is UTF-8
                text: String::from_utf8_lossy(valid).into_owned(),
                bytes_read: buf.len(),
                truncated_utf8: true,
            })
        }
        Err(e) => Err(ProtocolError::InvalidUtf8 {
            offset: e.valid_up_to(),
        }),
    }
}

// =============================================================================
// Tests
// =============================================================================
