// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use fabstir_vision_gateway::{
    api::{start_server, AppState},
    config::GatewayConfig,
    storage::ScratchStore,
    version,
    vision::VlmClient,
};
use std::env;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    println!("🚀 Starting Fabstir Vision Gateway...\n");
    println!("📦 {}", version::get_version_string());
    println!();

    let config = GatewayConfig::from_env();
    tracing::info!(
        "Configuration: port={}, scratch_dir={}, endpoint={}, model={}, timeout={}s",
        config.api_port,
        config.scratch_dir.display(),
        config.vlm_endpoint,
        config.vlm_model,
        config.processing_timeout.as_secs()
    );

    let scratch = ScratchStore::init(&config.scratch_dir).await?;
    let vlm = VlmClient::new(&config.vlm_endpoint, &config.vlm_model);
    let state = AppState::new(config, vlm, scratch);

    let probe = state.vlm.clone();
    let reachable = tokio::task::spawn_blocking(move || probe.health_check())
        .await
        .unwrap_or(false);
    if reachable {
        println!("✅ VLM backend reachable");
    } else {
        println!("⚠️  VLM backend not reachable yet; requests will fail until it is up");
    }

    start_server(state).await
}
