//! Inbound webhook payloads from the source-control host.
//!
//! Payloads are discriminated by their `object_kind` field. Only `push`
//! events carry meaning for backups; every other kind is ignored.

pub mod payload;

pub use payload::{PUSH_KIND, PayloadError, PushEvent, WebhookPayload};
