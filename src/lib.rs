// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod config;
pub mod storage;
pub mod version;
pub mod vision;

pub use config::GatewayConfig;
pub use storage::ScratchStore;
pub use vision::{VlmClient, VlmError};
