//! HTTP surface for realtime sessions.
//!
//! Three routes: `/health` for liveness probes, `/status` for the
//! pipeline snapshot, and `/ws` for the realtime translation protocol.

use std::sync::Arc;

use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tokio::net::TcpListener;

use crate::error::{Result, TolmachError};
use crate::pipeline::{Pipeline, PipelineStatus};
use crate::session::handler;

/// Shared state handed to every route.
#[derive(Clone)]
pub struct AppState {
    /// Pipeline whose stage services and tracker back the sessions.
    pub pipeline: Arc<Pipeline>,
    /// Expected credential; `None` accepts every client.
    pub api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WsParams {
    api_key: Option<String>,
}

/// Builds the route table.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/status", get(status))
        .route("/ws", get(ws_upgrade))
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

async fn status(State(state): State<Arc<AppState>>) -> Json<PipelineStatus> {
    Json(state.pipeline.status())
}

async fn ws_upgrade(
    ws: WebSocketUpgrade,
    Query(params): Query<WsParams>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handler::run_session(socket, state, params.api_key))
}

/// Binds the listener and serves until SIGINT or SIGTERM.
pub async fn serve(bind: &str, state: Arc<AppState>) -> Result<()> {
    let listener = TcpListener::bind(bind).await?;
    tracing::info!(addr = %listener.local_addr()?, "server listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("received SIGINT, shutting down");
        }
        res = wait_for_sigterm() => {
            if let Err(error) = res {
                tracing::error!(%error, "signal handler setup failed");
            } else {
                tracing::info!("received SIGTERM, shutting down");
            }
        }
    }
}

/// Wait for SIGTERM (used by systemd).
#[cfg(unix)]
async fn wait_for_sigterm() -> Result<()> {
    use tokio::signal::unix::{SignalKind, signal};
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| TolmachError::Other(format!("Failed to register SIGTERM handler: {e}")))?;
    sigterm.recv().await;
    Ok(())
}

#[cfg(not(unix))]
async fn wait_for_sigterm() -> Result<()> {
    // On non-Unix, just wait forever (Ctrl+C still works).
    std::future::pending::<Result<()>>().await
}
