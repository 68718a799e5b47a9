// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Standalone microservice for generating text embeddings.
//!
//! Runs the all-MiniLM-L6-v2 sentence transformer via ONNX Runtime and
//! exposes it over HTTP/JSON:
//! - `POST /embed` - embed a single text
//! - `POST /embed/batch` - embed up to 100 texts in one model invocation
//! - `GET /` and `GET /health` - health/readiness report
//!
//! The model is loaded once per process (pre-loaded at startup when the
//! weights are available, otherwise on first request) and shared read-only
//! by all concurrent requests.

pub mod api;
pub mod config;
pub mod embeddings;
