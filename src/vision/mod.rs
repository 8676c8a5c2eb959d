// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision backend integration
//!
//! The gateway does no image analysis of its own; it forwards uploads to an
//! Ollama-compatible VLM sidecar and relays the description text.

pub mod vlm_client;

pub use vlm_client::{VlmClient, VlmError};
