//! HTTP server for the backup webhook receiver.
//!
//! This module implements the HTTP server that:
//! - Accepts webhooks from the source-control host and records push events
//!   as a pending backup request in the slot
//! - Provides health checks for liveness probes
//!
//! # Endpoints
//!
//! - `POST /hook` - Accepts webhook deliveries (returns 200, or 500 if the body is not a JSON object)
//! - `GET /health` - Returns 200 with `{"status": "healthy", "timestamp": ...}`

use std::any::Any;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, error, info, warn};

use crate::config::Config;
use crate::slot::{SlotStore, StoreError};

pub mod health;
pub mod hook;

pub use health::health_handler;
pub use hook::hook_handler;

/// Shared application state.
///
/// This is passed to all handlers via Axum's `State` extractor. It is built
/// once from the startup configuration and never mutated.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Where pending backup requests are written.
    slot: SlotStore,
}

impl AppState {
    /// Creates a new `AppState` writing to `slot`.
    pub fn new(slot: SlotStore) -> Self {
        AppState {
            inner: Arc::new(AppStateInner { slot }),
        }
    }

    /// Returns the slot store.
    pub fn slot(&self) -> &SlotStore {
        &self.inner.slot
    }
}

/// Errors that stop the server from starting or running.
#[derive(Debug, Error)]
pub enum ServeError {
    /// The slot directory could not be created.
    #[error("failed to prepare slot directory: {0}")]
    Bootstrap(#[from] StoreError),

    /// The listen address could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    /// The server stopped with an I/O error.
    #[error("server error: {0}")]
    Serve(#[source] io::Error),
}

/// Builds the axum Router with all endpoints.
pub fn build_router(app_state: AppState) -> Router {
    use axum::routing::{get, post};

    with_boundary_layers(
        Router::new()
            .route("/hook", post(hook_handler))
            .route("/health", get(health_handler)),
    )
    .with_state(app_state)
}

/// Wraps routes with request tracing, panic recovery and an unbounded body.
///
/// A panicking handler yields an empty 500 and the server keeps serving.
/// Push payloads carry commit lists and may exceed axum's 2 MB default, so
/// no body limit is applied.
fn with_boundary_layers(router: Router<AppState>) -> Router<AppState> {
    router
        .layer(DefaultBodyLimit::disable())
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    error!(panic = %message, "Handler panicked");

    StatusCode::INTERNAL_SERVER_ERROR.into_response()
}

/// Prepares the slot directory, binds the listener and serves until a
/// shutdown signal arrives.
pub async fn serve(config: &Config) -> Result<(), ServeError> {
    let slot = SlotStore::new(&config.slot_path);
    slot.bootstrap()?;
    info!(slot = %slot.path().display(), "Slot directory ready");

    let listener = TcpListener::bind(config.bind)
        .await
        .map_err(|source| ServeError::Bind {
            addr: config.bind,
            source,
        })?;
    info!(addr = %config.bind, "Webhook receiver listening");

    axum::serve(listener, build_router(AppState::new(slot)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ServeError::Serve)?;

    info!("Webhook receiver stopped");
    Ok(())
}

/// Completes when SIGINT or SIGTERM (Ctrl+C elsewhere) is received.
///
/// If the handlers cannot be installed the server runs until killed.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let (mut sigint, mut sigterm) =
            match (signal(SignalKind::interrupt()), signal(SignalKind::terminate())) {
                (Ok(sigint), Ok(sigterm)) => (sigint, sigterm),
                (Err(e), _) | (_, Err(e)) => {
                    warn!(error = %e, "Failed to install signal handlers");
                    return std::future::pending::<()>().await;
                }
            };

        tokio::select! {
            _ = sigint.recv() => info!(signal = "SIGINT", "shutdown signal"),
            _ = sigterm.recv() => info!(signal = "SIGTERM", "shutdown signal"),
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            return std::future::pending::<()>().await;
        }
        info!("shutdown signal");
    }
}
