//! Client side of the modification-time report.
//!
//! ```text
//! SyncLoop --(every interval)--> SyncSession --> Scanner
//!                                     |
//!                                     +--> Connection (TCP) --> server
//! ```

pub mod scanner;
pub mod schedule;
pub mod session;

pub use scanner::{scan_records, FileRecord, Scanner};
pub use schedule::{LoopStats, SyncLoop, DEFAULT_INTERVAL};
pub use session::{SessionOptions, SessionReport, SyncSession};
