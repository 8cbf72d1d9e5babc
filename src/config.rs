//! Client configuration file (JSON).
//!
//! ```json
//! { "serverIp": "10.0.0.5", "folderPath": "/srv/sync" }
//! ```
//!
//! Both fields are optional and default independently. A missing file yields
//! the defaults. A malformed file is an error from [`ClientConfig::load`];
//! [`ClientConfig::load_or_default`] logs it and falls back to the defaults.

use crate::error::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1";
pub const DEFAULT_SYNC_FOLDER: &str = "./default_sync_folder";

/// Resolved client configuration. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub server_address: String,
    pub sync_folder: PathBuf,
    /// Optional overrides carried by the file; CLI flags win over these.
    pub port: Option<u16>,
    pub interval_secs: Option<u64>,
    pub timeout_secs: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_address: DEFAULT_SERVER_ADDRESS.to_string(),
            sync_folder: PathBuf::from(DEFAULT_SYNC_FOLDER),
            port: None,
            interval_secs: None,
            timeout_secs: None,
        }
    }
}

/// On-disk shape. Unknown keys are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ConfigFile {
    #[serde(alias = "serverAddress")]
    server_ip: Option<String>,
    #[serde(alias = "syncFolder")]
    folder_path: Option<String>,
    port: Option<u16>,
    interval_secs: Option<u64>,
    timeout_secs: Option<u64>,
}

impl From<ConfigFile> for ClientConfig {
    fn from(file: ConfigFile) -> Self {
        let defaults = ClientConfig::default();
        Self {
            server_address: file.server_ip.unwrap_or(defaults.server_address),
            sync_folder: file
                .folder_path
                .map(PathBuf::from)
                .unwrap_or(defaults.sync_folder),
            port: file.port,
            interval_secs: file.interval_secs,
            timeout_secs: file.timeout_secs,
        }
    }
}

impl ClientConfig {
    /// Load config from `path`.
    ///
    /// Returns the defaults if the file doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("config file {} not found, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let file: ConfigFile =
            serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(file.into())
    }

    /// Total variant of [`load`](Self::load): never fails.
    ///
    /// A malformed file is logged at warn level and replaced by the defaults.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("{}; falling back to defaults", e);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("client.json");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("does-not-exist.json");

        for _ in 0..3 {
            let config = ClientConfig::load(&path).unwrap();
            assert_eq!(config.server_address, "127.0.0.1");
            assert_eq!(config.sync_folder, PathBuf::from("./default_sync_folder"));
        }
    }

    #[test]
    fn test_both_fields() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"{"serverIp": "10.1.2.3", "folderPath": "/tmp/sync"}"#,
        );

        let config = ClientConfig::load(&path).unwrap();
        assert_eq!(config.server_address, "10.1.2.3");
        assert_eq!(config.sync_folder, PathBuf::from("/tmp/sync"));
        assert_eq!(config.port, None);
    }

    #[test]
    fn test_fields_default_independently() {
        let dir = TempDir::new().unwrap();

        let path = write_config(&dir, r#"{"serverIp": "sync.local"}"#);
        let config = ClientConfig::load(&path).unwrap();
        assert_eq!(config.server_address, "sync.local");
        assert_eq!(config.sync_folder, PathBuf::from(DEFAULT_SYNC_FOLDER));

        let path = write_config(&dir, r#"{"folderPath": "data"}"#);
        let config = ClientConfig::load(&path).unwrap();
        assert_eq!(config.server_address, DEFAULT_SERVER_ADDRESS);
        assert_eq!(config.sync_folder, PathBuf::from("data"));

        let path = write_config(&dir, r#"{"folderPath": "~/docs"}"#);
        let config = ClientConfig::load(&path).unwrap();
        assert_eq!(config.sync_folder, PathBuf::from("~/docs"));
    }

    #[test]
    fn test_aliases_and_overrides() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"{"serverAddress": "host", "syncFolder": "f", "port": 2000, "intervalSecs": 5, "timeoutSecs": 3, "extra": true}"#,
        );

        let config = ClientConfig::load(&path).unwrap();
        assert_eq!(config.server_address, "host");
        assert_eq!(config.sync_folder, PathBuf::from("f"));
        assert_eq!(config.port, Some(2000));
        assert_eq!(config.interval_secs, Some(5));
        assert_eq!(config.timeout_secs, Some(3));
    }

    #[test]
    fn test_malformed_is_error() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "{ not json");

        let err = ClientConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));

        let path = write_config(&dir, r#"{"serverIp": 42}"#);
        assert!(ClientConfig::load(&path).is_err());

        let path = write_config(&dir, "42");
        assert!(ClientConfig::load(&path).is_err());
    }

    #[test]
    fn test_malformed_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "serverIp = 1");

        assert_eq!(ClientConfig::load_or_default(&path), ClientConfig::default());
    }
}
