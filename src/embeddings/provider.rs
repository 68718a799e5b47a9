// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Process-wide embedding model provider.
//!
//! Loads the ONNX model at most once per process and hands out a shared
//! read-only handle. Concurrent first calls collapse into a single load;
//! a failed load is surfaced to the caller and retried on the next call
//! rather than cached.

use crate::embeddings::OnnxEmbeddingModel;
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::info;

/// Configuration for loading the embedding model
#[derive(Debug, Clone)]
pub struct EmbeddingModelConfig {
    /// Model name (e.g., "all-MiniLM-L6-v2")
    pub name: String,
    /// Path to ONNX model file
    pub model_path: String,
    /// Path to tokenizer JSON file
    pub tokenizer_path: String,
    /// Expected embedding dimension (384)
    pub dimension: usize,
}

/// Lazily-initialized, memoized provider of the single model handle.
///
/// # Example
/// ```ignore
/// let provider = ModelProvider::new(config);
/// let model = provider.get().await?;
/// let embedding = model.embed("Hello world")?;
/// ```
#[derive(Debug)]
pub struct ModelProvider {
    config: EmbeddingModelConfig,
    model: OnceCell<Arc<OnnxEmbeddingModel>>,
}

impl ModelProvider {
    pub fn new(config: EmbeddingModelConfig) -> Self {
        Self {
            config,
            model: OnceCell::new(),
        }
    }

    /// Returns the shared model handle, loading it on first use.
    ///
    /// The load runs on the blocking thread pool since ONNX session
    /// construction does file IO and heavy initialization. Only a
    /// successful load is memoized; after a failure the next call
    /// attempts the load again.
    pub async fn get(&self) -> Result<Arc<OnnxEmbeddingModel>> {
        self.model
            .get_or_try_init(|| async {
                let config = self.config.clone();
                let model = tokio::task::spawn_blocking(move || {
                    OnnxEmbeddingModel::new(
                        config.name,
                        config.model_path,
                        config.tokenizer_path,
                        config.dimension,
                    )
                })
                .await
                .context("Model load task panicked")??;

                info!(
                    "Embedding model ready: {} ({} dimensions)",
                    model.model_name(),
                    model.dimension()
                );
                Ok(Arc::new(model))
            })
            .await
            .map(Arc::clone)
    }

    /// Whether the model has already been loaded successfully.
    pub fn is_loaded(&self) -> bool {
        self.model.initialized()
    }

    /// The configured model name (available before the model is loaded).
    pub fn model_name(&self) -> &str {
        &self.config.name
    }

    /// The configured embedding dimension.
    pub fn dimension(&self) -> usize {
        self.config.dimension
    }
}
