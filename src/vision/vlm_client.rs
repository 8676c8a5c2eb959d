// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! VLM sidecar client for image description via the Ollama chat API
//!
//! The underlying client is blocking; callers dispatch [`VlmClient::describe`]
//! onto a worker thread and await the join handle with a timeout. An
//! abandoned call keeps running in the background until the client's own
//! hard timeout reclaims the thread. The blocking HTTP client is built on
//! the worker thread, never inside the async runtime.

use std::path::Path;
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;
use tracing::{debug, info};

/// Fixed instruction sent with every upload
pub const DESCRIBE_PROMPT: &str =
    "Give me a simple description of the image in just one sentence.";

/// Hard ceiling on a single blocking request, above the per-request budget
/// enforced by the handler
const HARD_TIMEOUT: Duration = Duration::from_secs(120);

// --- Ollama chat serde structs ---

#[derive(serde::Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
}

#[derive(serde::Serialize)]
struct ChatMessage {
    role: String,
    content: String,
    images: Vec<String>,
}

#[derive(serde::Deserialize)]
struct ChatResponse {
    message: ChatResponseMessage,
}

#[derive(serde::Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[derive(serde::Deserialize)]
struct ChatErrorBody {
    error: String,
}

/// Errors from the VLM sidecar call
#[derive(Debug, Error)]
pub enum VlmError {
    /// The upstream service answered with an error of its own
    #[error("Ollama API error: {0}")]
    Api(String),
    /// Transport-level failure reaching the upstream service
    #[error("VLM request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The scratch file could not be read back
    #[error("failed to read image file: {0}")]
    Io(#[from] std::io::Error),
}

/// Blocking client for an Ollama-compatible VLM backend
pub struct VlmClient {
    endpoint: String,
    model_name: String,
}

impl VlmClient {
    /// Create a new VLM client
    pub fn new(endpoint: &str, model_name: &str) -> Self {
        let endpoint = endpoint.trim_end_matches('/').to_string();
        info!(
            "VLM client configured: endpoint={}, model={}",
            endpoint, model_name
        );

        Self {
            endpoint,
            model_name: model_name.to_string(),
        }
    }

    /// Get the model name
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    fn http(&self) -> Result<reqwest::blocking::Client, reqwest::Error> {
        reqwest::blocking::Client::builder()
            .timeout(HARD_TIMEOUT)
            .build()
    }

    /// Check if the VLM backend is reachable (Ollama answers 200 on `/`).
    ///
    /// Blocking; call from a worker thread.
    pub fn health_check(&self) -> bool {
        let client = match self.http() {
            Ok(client) => client,
            Err(e) => {
                debug!("VLM health check failed to build client: {}", e);
                return false;
            }
        };
        match client.get(format!("{}/", self.endpoint)).send() {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                debug!("VLM health check failed: {}", e);
                false
            }
        }
    }

    /// Describe the image at `image_path` in one sentence.
    ///
    /// Reads the scratch file, base64-encodes it, and POSTs a single-turn
    /// chat request. Blocks the calling thread for the duration.
    pub fn describe(&self, image_path: &Path) -> Result<String, VlmError> {
        let image_bytes = std::fs::read(image_path)?;
        let base64_image = STANDARD.encode(&image_bytes);
        debug!(
            "Sending {} image bytes to VLM backend as {}",
            image_bytes.len(),
            self.model_name
        );

        let request = ChatRequest {
            model: self.model_name.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: DESCRIBE_PROMPT.to_string(),
                images: vec![base64_image],
            }],
            stream: false,
        };

        let response = self
            .http()?
            .post(format!("{}/api/chat", self.endpoint))
            .json(&request)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            let message = serde_json::from_str::<ChatErrorBody>(&body)
                .map(|e| e.error)
                .unwrap_or_else(|_| {
                    if body.is_empty() {
                        status.to_string()
                    } else {
                        body
                    }
                });
            return Err(VlmError::Api(message));
        }

        let chat_response: ChatResponse = response.json()?;
        Ok(chat_response.message.content)
    }
}
