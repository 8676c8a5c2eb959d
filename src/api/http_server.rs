// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Router construction and server loop

use axum::{
    extract::{DefaultBodyLimit, State},
    response::Html,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::{net::SocketAddr, sync::Arc};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::describe_image::describe_image_handler;
use crate::config::GatewayConfig;
use crate::storage::ScratchStore;
use crate::version;
use crate::vision::VlmClient;

/// Shared state for all request handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub vlm: Arc<VlmClient>,
    pub scratch: ScratchStore,
}

impl AppState {
    pub fn new(config: GatewayConfig, vlm: VlmClient, scratch: ScratchStore) -> Self {
        Self {
            config: Arc::new(config),
            vlm: Arc::new(vlm),
            scratch,
        }
    }
}

/// Build the gateway router with CORS and tracing layers applied
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Upload page
        .route("/", get(index_handler))
        // Health check
        .route("/health", get(health_handler))
        // Description endpoint
        .route("/describe-image", post(describe_image_handler))
        // The handler enforces its own 10 MiB ceiling so oversized uploads
        // get a 413 envelope instead of a framework reject
        .layer(DefaultBodyLimit::disable())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind the listener and serve until shutdown
pub async fn start_server(state: AppState) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], state.config.api_port));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Vision gateway listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn index_handler() -> Html<&'static str> {
    Html(include_str!("../../templates/index.html"))
}

async fn health_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    let vlm = state.vlm.clone();
    let upstream_reachable = tokio::task::spawn_blocking(move || vlm.health_check())
        .await
        .unwrap_or(false);

    Json(json!({
        "status": "ok",
        "version": version::VERSION_NUMBER,
        "model": state.vlm.model_name(),
        "upstream_reachable": upstream_reachable,
    }))
}
