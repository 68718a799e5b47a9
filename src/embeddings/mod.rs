// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! ONNX-backed sentence embedding model and its process-wide provider.

pub mod onnx_model;
pub mod provider;

pub use onnx_model::OnnxEmbeddingModel;
pub use provider::{EmbeddingModelConfig, ModelProvider};
