// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Transient storage for uploaded files

pub mod scratch;

pub use scratch::ScratchStore;
