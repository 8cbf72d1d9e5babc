use crate::error::{Result, SyncError};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// One regular file's modification time, as reported on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub path: PathBuf,
    /// Whole seconds since the UNIX epoch
    pub mtime: u64,
}

/// Convert a modification time to whole seconds, clamping pre-epoch to 0.
pub fn mtime_secs(modified: SystemTime) -> u64 {
    modified
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Walks the sync folder and collects every regular file.
///
/// Nothing is filtered: hidden files and gitignored files count.
/// Directories and symlinks are walked past but not reported.
pub struct Scanner {
    root: PathBuf,
}

impl Scanner {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Collect records in traversal order. Order is not stable across runs.
    pub fn scan(&self) -> Result<Vec<FileRecord>> {
        if !self.root.exists() {
            return Err(SyncError::SourceNotFound {
                path: self.root.clone(),
            });
        }
        // A file root has nothing beneath it to walk
        if !self.root.is_dir() {
            return Err(SyncError::NotADirectory {
                path: self.root.clone(),
            });
        }

        let walker = WalkBuilder::new(&self.root)
            .standard_filters(false)
            .follow_links(false)
            .build();

        let mut records = Vec::new();
        for result in walker {
            let entry = match result {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("skipping unreadable entry: {}", e);
                    continue;
                }
            };

            let is_file = entry.file_type().map(|ft| ft.is_file()).unwrap_or(false);
            if !is_file {
                continue;
            }

            let metadata = match entry.metadata() {
                Ok(m) => m,
                Err(e) => {
                    tracing::warn!("cannot stat {}: {}", entry.path().display(), e);
                    continue;
                }
            };

            let modified = match metadata.modified() {
                Ok(t) => t,
                Err(e) => {
                    tracing::warn!("no modification time for {}: {}", entry.path().display(), e);
                    continue;
                }
            };

            records.push(FileRecord {
                path: entry.into_path(),
                mtime: mtime_secs(modified),
            });
        }

        tracing::debug!(
            "scanned {} files under {}",
            records.len(),
            self.root.display()
        );
        Ok(records)
    }
}

/// Scan on the blocking pool so the runtime isn't stalled by a large tree.
pub async fn scan_records(root: &Path) -> Result<Vec<FileRecord>> {
    let scanner = Scanner::new(root);
    tokio::task::spawn_blocking(move || scanner.scan())
        .await
        .map_err(|e| SyncError::ScanTask(e.to_string()))?
}
