//! The backup request slot.
//!
//! The slot is a single well-known file holding zero or one pending
//! [`BackupRequest`](crate::request::BackupRequest). This process only ever
//! writes it; the external backup worker reads it, performs the backup, and
//! retires it however it likes (marking `processed` or deleting the file).
//!
//! ```text
//! <slot-dir>/backup_request.json                  - the pending request
//! <slot-dir>/.backup_request.json.<pid>.<n>.tmp   - in-flight write (never read)
//! ```
//!
//! # Crash Safety
//!
//! Writes use write-to-temp-then-rename:
//! 1. Write the encoded record to a temp file unique to this write
//! 2. fsync the temp file
//! 3. Rename it onto the slot path
//! 4. fsync the slot directory
//!
//! A reader sees either the previous record or the new one, never a torn file.
//! A crash mid-write can leave a temp file behind; startup bootstrap removes
//! those.
//!
//! # Concurrency
//!
//! Concurrent writers each own their temp file, so the only shared step is the
//! rename, which the filesystem performs atomically. The last rename to
//! complete wins. Earlier requests are overwritten, not queued.

pub mod fsync;
pub mod store;

pub use store::{SlotStore, StoreError, encode};
