//! Webhook intake endpoint.
//!
//! Accepts webhook deliveries from the source-control host and turns push
//! events into a pending backup request in the slot.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{error, info};

use super::AppState;
use crate::request::BackupRequest;
use crate::slot::SlotStore;
use crate::webhooks::{PayloadError, WebhookPayload};

/// Header carrying the host's event name, recorded for audit only.
const HEADER_EVENT: &str = "x-gitlab-event";

/// Errors surfaced to the webhook sender.
///
/// Slot write failures are deliberately absent: they are logged and the
/// delivery is still acknowledged.
#[derive(Debug, Error)]
pub enum HookError {
    /// The body is not a JSON object.
    #[error("malformed payload: {0}")]
    MalformedPayload(#[from] PayloadError),
}

impl IntoResponse for HookError {
    fn into_response(self) -> Response {
        // No detail leaves the process.
        match self {
            HookError::MalformedPayload(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

/// Webhook handler.
///
/// # Response
///
/// - 200 OK (empty body): payload understood. This includes ignored event
///   kinds and push events whose slot write failed.
/// - 500 Internal Server Error (empty body): body is not a JSON object
///
/// # Example
///
/// ```ignore
/// POST /hook HTTP/1.1
/// X-Gitlab-Event: Push Hook
/// Content-Type: application/json
///
/// {"object_kind": "push", "project": {"name": "infra"}, "ref": "refs/heads/main"}
///
/// HTTP/1.1 200 OK
/// ```
pub async fn hook_handler(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, HookError> {
    let host_event = headers.get(HEADER_EVENT).and_then(|v| v.to_str().ok());

    let payload = match WebhookPayload::parse(&body) {
        Ok(payload) => payload,
        Err(e) => {
            error!(
                error = %e,
                host_event = ?host_event,
                body_len = body.len(),
                "Webhook processing error"
            );
            return Err(e.into());
        }
    };

    info!(
        host_event = ?host_event,
        payload = %payload.to_pretty_json(),
        "Webhook received"
    );

    let Some(push) = payload.push_event() else {
        info!(object_kind = ?payload.object_kind(), "Non-push event ignored");
        return Ok(StatusCode::OK);
    };

    let request = BackupRequest::encode_now(&push);
    info!(
        project = %request.project,
        branch = %request.branch,
        "Push event detected"
    );

    record_request(app_state.slot(), &request);

    Ok(StatusCode::OK)
}

/// Writes `request` to the slot, logging the outcome.
///
/// A failed write is dropped here. The sender still gets 200 and will not
/// redeliver; the next push produces a fresh request.
fn record_request(slot: &SlotStore, request: &BackupRequest) {
    match slot.put(request) {
        Ok(()) => info!(
            project = %request.project,
            branch = %request.branch,
            slot = %slot.path().display(),
            "Backup request created"
        ),
        Err(e) => error!(
            project = %request.project,
            branch = %request.branch,
            slot = %slot.path().display(),
            error = %e,
            "Failed to create backup request"
        ),
    }
}
