pub mod tcp;

pub use tcp::{Connection, Timeouts, DEFAULT_TIMEOUT};
