// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! HTTP trigger server.
//!
//! Lets an external scheduler fire the trigger over HTTP. The server never
//! schedules cycles itself; each `POST /invoke` runs exactly one cycle.
//!
//! | Route          | Response                                   |
//! |----------------|--------------------------------------------|
//! | `POST /invoke` | `TriggerResponse` JSON, matching status    |
//! | `GET /metrics` | Prometheus text format                     |
//! | `GET /healthz` | `OK`                                       |

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::controller::Controller;
use crate::metrics::gather_metrics;
use crate::trigger::{handle_invocation, TriggerResponse};

/// Build the trigger router around a shared controller.
pub fn router(controller: Arc<Controller>) -> Router {
    Router::new()
        .route("/invoke", post(invoke))
        .route("/metrics", get(metrics))
        .route("/healthz", get(healthz))
        .with_state(controller)
}

/// Serve the trigger router on `addr` until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve(addr: SocketAddr, controller: Arc<Controller>) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "Trigger server listening");

    axum::serve(listener, router(controller))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to install Ctrl-C handler");
        return;
    }
    info!("Shutdown signal received, draining trigger server");
}

async fn invoke(
    State(controller): State<Arc<Controller>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let event = if body.is_empty() {
        serde_json::Value::Null
    } else {
        match serde_json::from_slice(&body) {
            Ok(event) => event,
            Err(e) => {
                warn!(error = %e, "Rejected invocation with malformed JSON event");
                let response = TriggerResponse {
                    status_code: StatusCode::BAD_REQUEST.as_u16(),
                    body: format!("Malformed invocation event: {e}"),
                };
                return (StatusCode::BAD_REQUEST, Json(response)).into_response();
            }
        }
    };

    let context = serde_json::json!({
        "source": "http",
        "request_id": headers.get("x-request-id").and_then(|v| v.to_str().ok()),
    });
    let response = handle_invocation(&controller, &event, &context).await;
    let status =
        StatusCode::from_u16(response.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(response)).into_response()
}

async fn metrics() -> Response {
    match gather_metrics() {
        Ok(text) => text.into_response(),
        Err(e) => {
            error!(error = %e, "Failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

async fn healthz() -> &'static str {
    "OK"
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod server_tests;
