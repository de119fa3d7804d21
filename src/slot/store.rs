//! Atomic single-record store for pending backup requests.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use thiserror::Error;

use super::fsync::{parent_dir, sync_dir, sync_file};
use crate::request::BackupRequest;

/// Distinguishes temp files of concurrent writes within this process.
static TEMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// Errors that can occur when writing the slot.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The storage medium rejected the write (permissions, disk full,
    /// missing directory, failed rename).
    #[error("failed to write {}: {source}", .path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The record could not be serialized.
    #[error("failed to encode backup request: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Result type for slot operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Returns the canonical on-disk encoding of a request (pretty-printed JSON).
pub fn encode(request: &BackupRequest) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(request)?)
}

/// The well-known location holding at most one pending [`BackupRequest`].
///
/// Cloning is cheap; every clone refers to the same slot file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotStore {
    path: PathBuf,
}

impl SlotStore {
    /// Creates a store for the slot file at `path`. Performs no I/O.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SlotStore { path: path.into() }
    }

    /// Returns the slot file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the directory holding the slot file.
    pub fn dir(&self) -> &Path {
        parent_dir(&self.path)
    }

    /// Creates the slot directory if it does not exist yet.
    ///
    /// Meant to run once at startup, before any `put`. An already existing
    /// directory is fine. Temp files left by writes interrupted in an earlier
    /// run are removed.
    pub fn bootstrap(&self) -> Result<()> {
        let dir = self.dir();
        std::fs::create_dir_all(dir).map_err(|source| StoreError::WriteFailed {
            path: dir.to_path_buf(),
            source,
        })?;

        // Leftovers only cost disk space; never fail startup over them.
        let _ = self.cleanup_temp_files();
        Ok(())
    }

    /// Removes `.<slot-file-name>.*.tmp` entries from the slot directory.
    fn cleanup_temp_files(&self) -> io::Result<()> {
        let prefix = format!(".{}.", self.file_name());

        for entry in std::fs::read_dir(self.dir())? {
            let entry = entry?;
            let name = entry.file_name();
            let name = name.to_string_lossy();

            if name.starts_with(&prefix) && name.ends_with(".tmp") {
                let _ = std::fs::remove_file(entry.path());
            }
        }

        Ok(())
    }

    fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "slot".to_string())
    }

    /// Replaces the slot content with `request`.
    ///
    /// The write goes to a temp file unique to this call and is renamed onto
    /// the slot path, so readers see the old record or the new one in full.
    /// The slot directory is not created here; a missing directory is a
    /// [`StoreError::WriteFailed`]. On failure the temp file is removed and
    /// the previous slot content is left as it was.
    pub fn put(&self, request: &BackupRequest) -> Result<()> {
        let bytes = encode(request)?;
        let temp_path = self.temp_path();

        if let Err(source) = self.write_and_rename(&temp_path, &bytes) {
            // Already gone if the rename went through.
            let _ = std::fs::remove_file(&temp_path);
            return Err(StoreError::WriteFailed {
                path: self.path.clone(),
                source,
            });
        }

        Ok(())
    }

    fn write_and_rename(&self, temp_path: &Path, bytes: &[u8]) -> io::Result<()> {
        {
            let mut file = OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(temp_path)?;
            file.write_all(bytes)?;
            sync_file(&file)?;
        }

        std::fs::rename(temp_path, &self.path)?;

        sync_dir(self.dir())
    }

    /// Builds `.<slot-file-name>.<pid>.<seq>.tmp` next to the slot file.
    ///
    /// The leading dot keeps the temp file out of naive `*.json` globs used
    /// by the backup worker.
    fn temp_path(&self) -> PathBuf {
        let name = self.file_name();
        let seq = TEMP_SEQ.fetch_add(1, Ordering::Relaxed);

        self.dir()
            .join(format!(".{name}.{}.{seq}.tmp", std::process::id()))
    }
}
