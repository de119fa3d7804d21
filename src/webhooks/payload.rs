//! Lenient view over inbound webhook payloads.
//!
//! Payloads are kept as raw JSON. Only the outer shape (an object) is
//! validated; individual fields are read on demand and a field with an
//! unexpected type is treated as absent.

use serde_json::{Map, Value};
use thiserror::Error;

/// The `object_kind` value of a push event.
pub const PUSH_KIND: &str = "push";

/// Errors that make a payload unusable.
#[derive(Debug, Error)]
pub enum PayloadError {
    /// The body is not valid JSON.
    #[error("invalid JSON body: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// The body is valid JSON but not an object.
    #[error("payload is not a JSON object")]
    NotAnObject,
}

/// A parsed webhook payload: always a JSON object.
#[derive(Debug, Clone, PartialEq)]
pub struct WebhookPayload {
    fields: Map<String, Value>,
}

impl WebhookPayload {
    /// Parses a request body.
    pub fn parse(body: &[u8]) -> Result<Self, PayloadError> {
        match serde_json::from_slice(body)? {
            Value::Object(fields) => Ok(WebhookPayload { fields }),
            _ => Err(PayloadError::NotAnObject),
        }
    }

    /// The event discriminator, if present and a string.
    pub fn object_kind(&self) -> Option<&str> {
        self.fields.get("object_kind").and_then(Value::as_str)
    }

    /// Whether this payload is a push event.
    pub fn is_push(&self) -> bool {
        self.object_kind() == Some(PUSH_KIND)
    }

    /// Extracts the push fields, or `None` if this is not a push event.
    pub fn push_event(&self) -> Option<PushEvent> {
        if !self.is_push() {
            return None;
        }

        let project_name = self
            .fields
            .get("project")
            .and_then(|p| p.get("name"))
            .and_then(Value::as_str)
            .map(str::to_string);
        let git_ref = self
            .fields
            .get("ref")
            .and_then(Value::as_str)
            .map(str::to_string);

        Some(PushEvent {
            project_name,
            git_ref,
        })
    }

    /// Pretty-printed JSON for audit logging.
    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(&self.fields).unwrap_or_default()
    }
}

/// The fields of a push event relevant to backup requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PushEvent {
    /// `project.name`.
    pub project_name: Option<String>,

    /// `ref`, usually `refs/heads/<branch>`.
    pub git_ref: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> WebhookPayload {
        WebhookPayload::parse(&serde_json::to_vec(&value).unwrap()).unwrap()
    }

    #[test]
    fn parse_rejects_invalid_json() {
        let result = WebhookPayload::parse(b"{not json");
        assert!(matches!(result, Err(PayloadError::InvalidJson(_))));
    }

    #[test]
    fn parse_rejects_empty_body() {
        let result = WebhookPayload::parse(b"");
        assert!(matches!(result, Err(PayloadError::InvalidJson(_))));
    }

    #[test]
    fn parse_rejects_non_objects() {
        for body in [&b"[]"[..], b"\"push\"", b"42", b"null", b"true"] {
            let result = WebhookPayload::parse(body);
            assert!(
                matches!(result, Err(PayloadError::NotAnObject)),
                "{:?} should be rejected",
                String::from_utf8_lossy(body)
            );
        }
    }

    #[test]
    fn object_kind_read_from_payload() {
        let payload = parse(json!({"object_kind": "tag_push"}));
        assert_eq!(payload.object_kind(), Some("tag_push"));
        assert!(!payload.is_push());
    }

    #[test]
    fn object_kind_missing_or_not_a_string() {
        assert_eq!(parse(json!({})).object_kind(), None);
        assert_eq!(parse(json!({"object_kind": 7})).object_kind(), None);
    }

    #[test]
    fn push_event_extracts_fields() {
        let payload = parse(json!({
            "object_kind": "push",
            "project": {"name": "infra"},
            "ref": "refs/heads/release-2.3"
        }));

        let event = payload.push_event().unwrap();
        assert_eq!(event.project_name.as_deref(), Some("infra"));
        assert_eq!(event.git_ref.as_deref(), Some("refs/heads/release-2.3"));
    }

    #[test]
    fn push_event_with_missing_fields() {
        let event = parse(json!({"object_kind": "push"})).push_event().unwrap();
        assert_eq!(event, PushEvent::default());
    }

    #[test]
    fn push_event_treats_wrongly_typed_fields_as_absent() {
        let payload = parse(json!({
            "object_kind": "push",
            "project": null,
            "ref": 12
        }));

        let event = payload.push_event().unwrap();
        assert_eq!(event, PushEvent::default());

        let payload = parse(json!({
            "object_kind": "push",
            "project": {"name": ["infra"]}
        }));
        assert_eq!(payload.push_event().unwrap().project_name, None);
    }

    #[test]
    fn push_event_none_for_other_kinds() {
        let payload = parse(json!({"object_kind": "merge_request", "ref": "refs/heads/main"}));
        assert!(payload.push_event().is_none());
    }

    #[test]
    fn pretty_json_contains_payload() {
        let payload = parse(json!({"object_kind": "push", "ref": "refs/heads/main"}));
        let text = payload.to_pretty_json();
        assert!(text.contains("\"object_kind\": \"push\""));
        assert!(text.contains('\n'));
    }
}
