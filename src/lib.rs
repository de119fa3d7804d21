//! Backup Hook - A webhook receiver that turns push events into a pending backup request.
//!
//! This library provides the request encoding, the atomic single-slot store
//! read by the external backup worker, and the HTTP server around them.

pub mod config;
pub mod logging;
pub mod request;
pub mod server;
pub mod slot;
pub mod webhooks;
