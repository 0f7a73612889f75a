//! Single-slot video reference store backed by a text file.

use std::io;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, error, info};

/// Errors from writing the stored reference.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// File-backed store for the current video's file id.
///
/// Reads and writes are serialized; concurrent writers resolve as
/// last-writer-wins.
#[derive(Debug)]
pub struct VideoStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl VideoStore {
    /// Create a store at the given path. The file need not exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored reference.
    ///
    /// Returns `None` when the file is missing, blank, or unreadable.
    pub fn load(&self) -> Option<String> {
        let _guard = self.lock.lock();

        let data = match std::fs::read_to_string(&self.path) {
            Ok(d) => d,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "video store file not found");
                return None;
            }
            Err(e) => {
                error!(path = %self.path.display(), error = %e, "video store read failed");
                return None;
            }
        };

        let value = data.trim();
        if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        }
    }

    /// Replace the stored reference.
    ///
    /// The value is written to a sibling temp file and renamed over the
    /// target so readers never observe a partial write.
    pub fn save(&self, reference: &str) -> Result<(), StoreError> {
        let _guard = self.lock.lock();

        let tmp = self.tmp_path();
        let result = std::fs::write(&tmp, reference).and_then(|()| std::fs::rename(&tmp, &self.path));

        match result {
            Ok(()) => {
                info!(path = %self.path.display(), "stored video reference updated");
                Ok(())
            }
            Err(source) => {
                let _ = std::fs::remove_file(&tmp);
                error!(path = %self.path.display(), error = %source, "video store write failed");
                Err(StoreError::Write {
                    path: self.path.clone(),
                    source,
                })
            }
        }
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
