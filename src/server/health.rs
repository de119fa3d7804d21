//! Health check endpoint for liveness probes.

use axum::Json;
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Body of a health response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
}

/// Health check handler.
///
/// Always returns 200 OK while the server is accepting connections.
///
/// # Example
///
/// ```ignore
/// GET /health HTTP/1.1
///
/// HTTP/1.1 200 OK
/// Content-Type: application/json
///
/// {"status":"healthy","timestamp":"2024-05-01T12:00:00.123456Z"}
/// ```
pub async fn health_handler() -> (StatusCode, Json<HealthStatus>) {
    let body = HealthStatus {
        status: "healthy",
        timestamp: Utc::now(),
    };
    (StatusCode::OK, Json(body))
}
