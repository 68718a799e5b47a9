// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Service configuration.
//!
//! Model identity and request limits are fixed constants; the listening
//! port, model file locations, and the two documented behavior switches
//! (batch empty-text filtering, health probe status code) come from the
//! environment at startup. Nothing here is runtime-mutable.

use std::env;

/// Embedding model name (384 dimensions, ~100MB, ~25ms per embedding)
pub const MODEL_NAME: &str = "all-MiniLM-L6-v2";

/// Output width of the model; every response reports this dimension
pub const MODEL_DIMENSION: usize = 384;

/// Maximum length of a single input text, in characters
pub const MAX_TEXT_LENGTH: usize = 5000;

/// Maximum number of texts per batch request
pub const MAX_BATCH_SIZE: usize = 100;

/// Default listening port (override with PORT)
pub const DEFAULT_PORT: u16 = 8001;

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Model name reported in responses
    pub model_name: String,

    /// Expected embedding dimension, cross-checked against the loaded model
    pub dimension: usize,

    /// Maximum single-text length in characters
    pub max_text_length: usize,

    /// Maximum number of texts per batch
    pub max_batch_size: usize,

    /// HTTP listening port
    pub port: u16,

    /// Path to the ONNX model file (model.onnx)
    pub model_path: String,

    /// Path to the tokenizer JSON file (tokenizer.json)
    pub tokenizer_path: String,

    /// Whether empty/whitespace-only entries are dropped from a batch
    /// before encoding. When enabled, `count` in the batch response may be
    /// smaller than the number of submitted texts.
    pub filter_empty_texts: bool,

    /// Whether an unhealthy health check answers 503 instead of 200
    pub health_unready_503: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            model_name: MODEL_NAME.to_string(),
            dimension: MODEL_DIMENSION,
            max_text_length: MAX_TEXT_LENGTH,
            max_batch_size: MAX_BATCH_SIZE,
            port: DEFAULT_PORT,
            model_path: "./models/all-MiniLM-L6-v2-onnx/model.onnx".to_string(),
            tokenizer_path: "./models/all-MiniLM-L6-v2-onnx/tokenizer.json".to_string(),
            filter_empty_texts: true,
            health_unready_503: false,
        }
    }
}

impl ServiceConfig {
    /// Builds the configuration from environment variables, falling back to
    /// the defaults above for anything unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let port = env::var("PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(defaults.port);

        let model_path =
            env::var("EMBEDDING_MODEL_PATH").unwrap_or(defaults.model_path);
        let tokenizer_path =
            env::var("EMBEDDING_TOKENIZER_PATH").unwrap_or(defaults.tokenizer_path);

        let filter_empty_texts = env::var("FILTER_EMPTY_TEXTS")
            .map(|v| parse_bool(&v))
            .unwrap_or(defaults.filter_empty_texts);

        let health_unready_503 = env::var("HEALTH_UNREADY_503")
            .map(|v| parse_bool(&v))
            .unwrap_or(defaults.health_unready_503);

        Self {
            port,
            model_path,
            tokenizer_path,
            filter_empty_texts,
            health_unready_503,
            ..defaults
        }
    }
}

fn parse_bool(value: &str) -> bool {
    value.to_lowercase() == "true" || value == "1"
}
