//! Backup requests: the record handed to the backup worker.
//!
//! A request is built from a push event by a pure transform. It never fails:
//! a missing project name becomes [`UNKNOWN_PROJECT`] and a missing ref
//! becomes an empty branch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::webhooks::PushEvent;

/// Project name recorded when the push payload carries none.
pub const UNKNOWN_PROJECT: &str = "unknown";

/// The event that caused a backup request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestEvent {
    Push,
}

/// A pending backup request as stored in the slot.
///
/// The JSON shape is the contract with the backup worker:
///
/// ```json
/// {
///   "timestamp": "2024-05-01T12:00:00Z",
///   "project": "infra",
///   "branch": "release-2.3",
///   "event": "push",
///   "processed": false
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupRequest {
    /// When the request was created (RFC 3339, UTC).
    pub timestamp: DateTime<Utc>,

    /// Name of the project that was pushed to.
    pub project: String,

    /// Short branch name, e.g. `main` for `refs/heads/main`.
    pub branch: String,

    pub event: RequestEvent,

    /// Only the backup worker sets this to `true`.
    pub processed: bool,
}

impl BackupRequest {
    /// Builds a request for `push`, stamped with `now`.
    pub fn from_push(push: &PushEvent, now: DateTime<Utc>) -> Self {
        let project = match push.project_name.as_deref() {
            Some(name) => name.to_string(),
            None => UNKNOWN_PROJECT.to_string(),
        };
        let branch = push.git_ref.as_deref().map(branch_from_ref).unwrap_or("");

        BackupRequest {
            timestamp: now,
            project,
            branch: branch.to_string(),
            event: RequestEvent::Push,
            processed: false,
        }
    }

    /// Builds a request for `push`, stamped with the current time.
    pub fn encode_now(push: &PushEvent) -> Self {
        Self::from_push(push, Utc::now())
    }
}

/// Returns the text after the last `/` of a ref.
///
/// `refs/heads/main` gives `main`. A ref without `/` is returned whole. Note
/// that branch names containing `/` keep only their last segment
/// (`refs/heads/feature/login` gives `login`).
pub fn branch_from_ref(git_ref: &str) -> &str {
    git_ref.rsplit('/').next().unwrap_or(git_ref)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn push(project: Option<&str>, git_ref: Option<&str>) -> PushEvent {
        PushEvent {
            project_name: project.map(str::to_string),
            git_ref: git_ref.map(str::to_string),
        }
    }

    #[test]
    fn branch_from_heads_ref() {
        assert_eq!(branch_from_ref("refs/heads/main"), "main");
        assert_eq!(branch_from_ref("refs/heads/release-2.3"), "release-2.3");
    }

    #[test]
    fn branch_from_ref_edge_cases() {
        assert_eq!(branch_from_ref(""), "");
        assert_eq!(branch_from_ref("main"), "main");
        assert_eq!(branch_from_ref("refs/heads/"), "");
        assert_eq!(branch_from_ref("refs/heads/feature/login"), "login");
    }

    #[test]
    fn from_push_full_payload() {
        let request = BackupRequest::from_push(
            &push(Some("infra"), Some("refs/heads/release-2.3")),
            fixed_now(),
        );

        assert_eq!(
            request,
            BackupRequest {
                timestamp: fixed_now(),
                project: "infra".to_string(),
                branch: "release-2.3".to_string(),
                event: RequestEvent::Push,
                processed: false,
            }
        );
    }

    #[test]
    fn from_push_defaults_missing_project() {
        let request = BackupRequest::from_push(&push(None, Some("refs/heads/main")), fixed_now());
        assert_eq!(request.project, UNKNOWN_PROJECT);
    }

    #[test]
    fn from_push_missing_or_empty_ref_gives_empty_branch() {
        let missing = BackupRequest::from_push(&push(Some("infra"), None), fixed_now());
        let empty = BackupRequest::from_push(&push(Some("infra"), Some("")), fixed_now());

        assert_eq!(missing.branch, "");
        assert_eq!(empty.branch, "");
    }

    #[test]
    fn encode_now_uses_current_time() {
        let before = Utc::now();
        let request = BackupRequest::encode_now(&PushEvent::default());
        let after = Utc::now();

        assert!(request.timestamp >= before && request.timestamp <= after);
        assert!(!request.processed);
    }

    #[test]
    fn serialized_shape() {
        let request = BackupRequest::from_push(
            &push(Some("infra"), Some("refs/heads/main")),
            fixed_now(),
        );

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "timestamp": "2024-05-01T12:00:00Z",
                "project": "infra",
                "branch": "main",
                "event": "push",
                "processed": false
            })
        );
    }

    #[test]
    fn timestamp_is_rfc3339() {
        let request = BackupRequest::encode_now(&PushEvent::default());
        let value = serde_json::to_value(&request).unwrap();
        let text = value["timestamp"].as_str().unwrap();

        assert!(DateTime::parse_from_rfc3339(text).is_ok());
    }

    proptest! {
        #[test]
        fn branch_is_suffix_after_refs_heads(branch in "[a-zA-Z0-9._-]{1,40}") {
            let git_ref = format!("refs/heads/{branch}");
            let request = BackupRequest::from_push(&push(Some("p"), Some(&git_ref)), fixed_now());
            prop_assert_eq!(request.branch, branch);
        }

        #[test]
        fn missing_project_is_unknown(git_ref in proptest::option::of("[a-z/]{0,30}")) {
            let request = BackupRequest::from_push(&push(None, git_ref.as_deref()), fixed_now());
            prop_assert_eq!(request.project.as_str(), UNKNOWN_PROJECT);
            prop_assert!(!request.processed);
            prop_assert_eq!(request.event, RequestEvent::Push);
        }

        #[test]
        fn branch_never_contains_slash(git_ref in ".{0,60}") {
            prop_assert!(!branch_from_ref(&git_ref).contains('/'));
        }
    }
}
