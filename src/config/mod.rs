// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Gateway configuration
//!
//! All knobs are read from environment variables at startup and collected
//! into an explicit [`GatewayConfig`] that is passed to the server, rather
//! than living as ambient process state.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the vision gateway
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Port the HTTP API listens on
    pub api_port: u16,
    /// Directory for transient upload files
    pub scratch_dir: PathBuf,
    /// Base URL of the Ollama-compatible VLM backend
    pub vlm_endpoint: String,
    /// Model identifier sent with every chat request
    pub vlm_model: String,
    /// Wall-clock budget for a single description call
    pub processing_timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            api_port: 8000,
            scratch_dir: PathBuf::from("uploads"),
            vlm_endpoint: "http://127.0.0.1:11434".to_string(),
            vlm_model: "llava:13b".to_string(),
            processing_timeout: Duration::from_secs(60),
        }
    }
}

impl GatewayConfig {
    /// Build a config from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let api_port = env::var("API_PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(defaults.api_port);

        let scratch_dir = env::var("UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.scratch_dir);

        let vlm_endpoint = env::var("OLLAMA_URL")
            .map(|v| v.trim_end_matches('/').to_string())
            .unwrap_or(defaults.vlm_endpoint);

        let vlm_model = env::var("VLM_MODEL").unwrap_or(defaults.vlm_model);

        let processing_timeout = env::var("IMAGE_PROCESSING_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.processing_timeout);

        Self {
            api_port,
            scratch_dir,
            vlm_endpoint,
            vlm_model,
            processing_timeout,
        }
    }
}
