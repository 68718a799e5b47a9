// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Response types for the embedding endpoints.

use serde::{Deserialize, Serialize};

/// Response body for POST /embed
///
/// # Example
/// ```json
/// {"embedding": [0.1, 0.2, ...], "dimension": 384, "model": "all-MiniLM-L6-v2"}
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedResponse {
    /// 384-dimensional embedding vector
    pub embedding: Vec<f32>,

    /// Length of the embedding vector
    pub dimension: usize,

    /// Model used for embedding
    pub model: String,
}

/// Response body for POST /embed/batch
///
/// `count` is the number of vectors actually produced; when empty-text
/// filtering is enabled it may be smaller than the number of submitted
/// texts, and callers must not assume positional correspondence with the
/// original list in that case. Vector order matches the (filtered) input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchEmbedResponse {
    /// One embedding vector per surviving input text, in input order
    pub embeddings: Vec<Vec<f32>>,

    /// Width of every vector in `embeddings`
    pub dimension: usize,

    /// Model used for embedding
    pub model: String,

    /// Number of vectors returned
    pub count: usize,
}
