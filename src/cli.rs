use clap::{ArgAction, Parser};
use std::path::PathBuf;
use std::time::Duration;

use crate::config::ClientConfig;
use crate::protocol::{WireMode, DEFAULT_PORT};
use crate::sync::{SessionOptions, DEFAULT_INTERVAL};
use crate::transport::{Timeouts, DEFAULT_TIMEOUT};

#[derive(Parser, Debug)]
#[command(name = "mtsync")]
#[command(about = "Report a folder's file modification times to a sync server", long_about = None)]
#[command(version)]
#[command(after_help = "EXAMPLES:
    mtsync client.json                  Report every second, forever
    mtsync client.json --once           Run a single session and exit
    mtsync client.json --interval 30    Report every 30 seconds

CONFIG FILE (JSON, all fields optional):
    {\"serverIp\": \"127.0.0.1\", \"folderPath\": \"./default_sync_folder\"}")]
pub struct Cli {
    /// Path to the JSON config file (defaults are used if it doesn't exist)
    pub config: PathBuf,

    /// Server port [default: 12345]
    #[arg(long, env = "MTSYNC_PORT")]
    pub port: Option<u16>,

    /// Seconds to wait between sessions [default: 1]
    #[arg(long, env = "MTSYNC_INTERVAL", value_name = "SECS")]
    pub interval: Option<u64>,

    /// Deadline in seconds for connect, each send, and the reply [default: 10]
    #[arg(long, env = "MTSYNC_TIMEOUT", value_name = "SECS",
          value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Wire format; `framed` needs a server that understands it
    #[arg(long, value_enum, default_value = "legacy")]
    pub protocol: WireMode,

    /// Run one session and exit (non-zero status if it failed)
    #[arg(long)]
    pub once: bool,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (only show errors)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Cli {
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            return tracing::Level::ERROR;
        }

        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }

    /// Merge flags over config-file values over built-in defaults.
    pub fn session_options(&self, config: &ClientConfig) -> SessionOptions {
        let port = self.port.or(config.port).unwrap_or(DEFAULT_PORT);
        let timeout = self
            .timeout
            .or(config.timeout_secs)
            .map(|secs| Duration::from_secs(secs.max(1)))
            .unwrap_or(DEFAULT_TIMEOUT);

        SessionOptions {
            port,
            timeouts: Timeouts::uniform(timeout),
            mode: self.protocol,
        }
    }

    pub fn interval(&self, config: &ClientConfig) -> Duration {
        self.interval
            .or(config.interval_secs)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_INTERVAL)
    }
}
