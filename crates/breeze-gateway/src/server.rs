// SPDX-FileCopyrightText: 2026 Breeze Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state. `/health` is the only
//! unauthenticated route; everything else goes through the bearer-token
//! middleware that attaches the caller's `AuthContext`.

use std::sync::Arc;

use axum::{
    Json, Router,
    middleware as axum_middleware,
    routing::{delete, get, patch, post},
};
use breeze_core::BreezeError;
use breeze_signaling::SessionLifecycle;
use breeze_transfer::TransferManager;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::{AuthState, auth_middleware};
use crate::{sessions, transfers};

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub sessions: Arc<SessionLifecycle>,
    pub transfers: Arc<TransferManager>,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

async fn get_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Build the full gateway router.
pub fn router(state: GatewayState, auth: AuthState) -> Router {
    let public_routes = Router::new().route("/health", get(get_health));

    let api_routes = Router::new()
        .route(
            "/sessions",
            post(sessions::create_session).get(sessions::list_sessions),
        )
        .route("/sessions/history", get(sessions::session_history))
        .route("/sessions/stale", delete(sessions::cleanup_stale))
        .route("/sessions/{id}", get(sessions::get_session))
        .route("/sessions/{id}/offer", post(sessions::submit_offer))
        .route("/sessions/{id}/answer", post(sessions::submit_answer))
        .route("/sessions/{id}/ice", post(sessions::add_ice_candidate))
        .route("/sessions/{id}/end", post(sessions::end_session))
        .route("/ice-servers", get(sessions::ice_servers))
        .route(
            "/transfers",
            post(transfers::create_transfer).get(transfers::list_transfers),
        )
        .route("/transfers/{id}", get(transfers::get_transfer))
        .route("/transfers/{id}/cancel", post(transfers::cancel_transfer))
        .route("/transfers/{id}/chunks", post(transfers::upload_chunk))
        .route("/transfers/{id}/download", get(transfers::download_transfer))
        .route("/transfers/{id}/progress", patch(transfers::update_progress))
        .route_layer(axum_middleware::from_fn_with_state(auth, auth_middleware))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Bind and serve until `shutdown` is cancelled.
pub async fn start_server(
    host: &str,
    port: u16,
    state: GatewayState,
    auth: AuthState,
    shutdown: CancellationToken,
) -> Result<(), BreezeError> {
    let app = router(state, auth);
    let addr = format!("{host}:{port}");
    let listener =
        tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| BreezeError::Transport {
                message: format!("failed to bind gateway to {addr}"),
                source: Some(Box::new(e)),
            })?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| BreezeError::Transport {
            message: "gateway server error".to_string(),
            source: Some(Box::new(e)),
        })
}
