//! Durability helpers for slot writes.
//!
//! A rename is only durable once the directory holding the renamed entry has
//! been synced, so both the temp file and the slot directory are flushed.

use std::fs::File;
use std::io;
use std::path::Path;

/// Flushes a file's contents and metadata to stable storage.
pub fn sync_file(file: &File) -> io::Result<()> {
    file.sync_all()
}

/// Returns the directory that holds `path`.
///
/// A bare file name such as `backup_request.json` has an empty parent, which
/// means the current directory.
pub fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Flushes the directory entry table of `dir` so a completed rename survives
/// power loss.
#[cfg(unix)]
pub fn sync_dir(dir: &Path) -> io::Result<()> {
    File::open(dir)?.sync_all()
}

/// Directories cannot be opened as files on this platform; the rename itself
/// is the durability point.
#[cfg(not(unix))]
pub fn sync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}
