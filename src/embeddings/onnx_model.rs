// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! ONNX Embedding Model Wrapper
//!
//! This module provides a wrapper around ONNX Runtime for running
//! the all-MiniLM-L6-v2 sentence transformer model.
//!
//! Features:
//! - ONNX model loading from disk
//! - BERT tokenization with truncation to the model's max sequence length
//! - Single and batch embedding generation
//! - Attention-mask-weighted mean pooling over token embeddings
//! - L2-normalized 384-dimensional output vectors

use anyhow::{Context, Result};
use ndarray::{Array2, Array3, Axis, Ix3};
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::Mutex;
use tokenizers::{Tokenizer, TruncationDirection, TruncationParams, TruncationStrategy};
use tracing::info;

/// Maximum input sequence length for all-MiniLM-L6-v2
const MAX_SEQUENCE_LENGTH: usize = 256;

/// ONNX-based embedding model (all-MiniLM-L6-v2)
///
/// Wraps an ONNX Runtime session plus a BERT tokenizer. Encoding is
/// synchronous and CPU-heavy; callers that serve concurrent requests should
/// run it on a blocking worker (see [`crate::embeddings::ModelProvider`]).
///
/// The session requires `&mut` to run, so it sits behind a `Mutex`; the
/// model as a whole is immutable after construction and safe to share
/// through an `Arc`.
pub struct OnnxEmbeddingModel {
    /// ONNX Runtime session (the run API takes `&mut self`)
    session: Mutex<Session>,

    /// BERT tokenizer, configured to truncate at MAX_SEQUENCE_LENGTH
    tokenizer: Tokenizer,

    /// Model name (e.g., "all-MiniLM-L6-v2")
    model_name: String,

    /// Output dimension (384 for all-MiniLM-L6-v2)
    dimension: usize,
}

impl std::fmt::Debug for OnnxEmbeddingModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxEmbeddingModel")
            .field("model_name", &self.model_name)
            .field("dimension", &self.dimension)
            .finish_non_exhaustive()
    }
}

impl OnnxEmbeddingModel {
    /// Loads the model and tokenizer from disk.
    ///
    /// Runs one validation inference after loading and fails if the model's
    /// actual output width does not match `expected_dimension`, so a
    /// misconfigured model file is caught at load time rather than in a
    /// request path.
    ///
    /// # Errors
    /// Returns error if:
    /// - Model file not found or invalid
    /// - Tokenizer file not found or invalid
    /// - ONNX Runtime initialization fails
    /// - The model's output width differs from `expected_dimension`
    pub fn new<P: AsRef<Path>>(
        model_name: impl Into<String>,
        model_path: P,
        tokenizer_path: P,
        expected_dimension: usize,
    ) -> Result<Self> {
        let model_name = model_name.into();
        let model_path = model_path.as_ref();
        let tokenizer_path = tokenizer_path.as_ref();

        if !model_path.exists() {
            anyhow::bail!("ONNX model file not found: {}", model_path.display());
        }
        if !tokenizer_path.exists() {
            anyhow::bail!("Tokenizer file not found: {}", tokenizer_path.display());
        }

        info!("Loading embedding model: {}", model_name);

        let mut session = Session::builder()
            .context("Failed to create session builder")?
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .context("Failed to set CPU execution provider")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("Failed to set optimization level")?
            .with_intra_threads(4)
            .context("Failed to set intra threads")?
            .commit_from_file(model_path)
            .context(format!(
                "Failed to load ONNX model from {}",
                model_path.display()
            ))?;

        let mut tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| anyhow::anyhow!("Failed to load tokenizer: {}", e))?;
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: MAX_SEQUENCE_LENGTH,
                strategy: TruncationStrategy::LongestFirst,
                direction: TruncationDirection::Right,
                stride: 0,
            }))
            .map_err(|e| anyhow::anyhow!("Failed to configure truncation: {}", e))?;

        // Validate the output width by running a test inference
        let (ids, mask) = encode_one(&tokenizer, "validation test")?;
        let output = run_inference(&mut session, vec![(ids, mask)])?;
        if output.shape()[2] != expected_dimension {
            anyhow::bail!(
                "Model outputs unexpected dimensions: {:?} (expected [batch, seq_len, {}])",
                output.shape(),
                expected_dimension
            );
        }

        info!(
            "Model loaded successfully. Dimension: {}",
            expected_dimension
        );

        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
            model_name,
            dimension: expected_dimension,
        })
    }

    /// Generates the embedding for a single text.
    ///
    /// Tokenizes, runs one inference, mean-pools the token embeddings
    /// weighted by the attention mask, and L2-normalizes the result to a
    /// unit vector. Deterministic for identical input.
    pub fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut embeddings = self.embed_batch(std::slice::from_ref(&text.to_string()))?;
        embeddings
            .pop()
            .context("Inference produced no embedding")
    }

    /// Generates embeddings for multiple texts in one model invocation.
    ///
    /// All texts are tokenized, padded to the longest sequence in the batch,
    /// and run through the session in a single call. Output order matches
    /// input order. More efficient than calling [`Self::embed`] per item.
    pub fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let encoded: Vec<(Vec<i64>, Vec<i64>)> = texts
            .iter()
            .map(|text| encode_one(&self.tokenizer, text))
            .collect::<Result<Vec<_>>>()?;

        let max_len = encoded
            .iter()
            .map(|(ids, _)| ids.len())
            .max()
            .unwrap_or(0);

        // Pad all sequences to the batch maximum
        let padded: Vec<(Vec<i64>, Vec<i64>)> = encoded
            .into_iter()
            .map(|(mut ids, mut mask)| {
                ids.resize(max_len, 0);
                mask.resize(max_len, 0);
                (ids, mask)
            })
            .collect();

        let masks: Vec<Vec<i64>> = padded.iter().map(|(_, mask)| mask.clone()).collect();

        let output_array = {
            let mut session = self
                .session
                .lock()
                .map_err(|_| anyhow::anyhow!("Model session lock poisoned"))?;
            run_inference(&mut session, padded)?
        };

        // Token-level output [batch, seq_len, hidden_dim]; mean-pool each
        // item over its non-padding tokens.
        let mut embeddings: Vec<Vec<f32>> = Vec::with_capacity(texts.len());
        for (batch_idx, mask) in masks.iter().enumerate() {
            let item = output_array.index_axis(Axis(0), batch_idx);
            let seq_len = item.shape()[0];
            let hidden_dim = item.shape()[1];

            let mut pooled = vec![0.0f32; hidden_dim];
            let mut sum_mask = 0.0f32;
            for i in 0..seq_len {
                let mask_value = mask[i] as f32;
                sum_mask += mask_value;
                for j in 0..hidden_dim {
                    pooled[j] += item[[i, j]] * mask_value;
                }
            }
            for val in &mut pooled {
                *val /= sum_mask.max(1e-9);
            }

            // L2 normalize to unit length
            let norm = pooled.iter().map(|x| x * x).sum::<f32>().sqrt();
            if norm > 0.0 {
                for val in &mut pooled {
                    *val /= norm;
                }
            }

            if pooled.len() != self.dimension {
                anyhow::bail!(
                    "Unexpected embedding dimension at index {}: {} (expected {})",
                    batch_idx,
                    pooled.len(),
                    self.dimension
                );
            }
            embeddings.push(pooled);
        }

        Ok(embeddings)
    }

    /// Returns the output dimension of this model
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Returns the model name
    pub fn model_name(&self) -> &str {
        &self.model_name
    }
}

/// Tokenizes one text into (input_ids, attention_mask) as i64 vectors.
fn encode_one(tokenizer: &Tokenizer, text: &str) -> Result<(Vec<i64>, Vec<i64>)> {
    let encoding = tokenizer
        .encode(text, true)
        .map_err(|e| anyhow::anyhow!("Tokenization failed: {}", e))?;

    let ids: Vec<i64> = encoding.get_ids().iter().map(|&id| id as i64).collect();
    let mask: Vec<i64> = encoding
        .get_attention_mask()
        .iter()
        .map(|&m| m as i64)
        .collect();
    Ok((ids, mask))
}

/// Runs the session on a padded batch of (input_ids, attention_mask) rows
/// and returns the token-level output as [batch, seq_len, hidden_dim].
///
/// All rows must have the same length. token_type_ids are all zeros for
/// single-sentence embedding input.
fn run_inference(session: &mut Session, rows: Vec<(Vec<i64>, Vec<i64>)>) -> Result<Array3<f32>> {
    let batch = rows.len();
    let seq_len = rows.first().map(|(ids, _)| ids.len()).unwrap_or(0);

    let mut input_ids = Vec::with_capacity(batch * seq_len);
    let mut attention_mask = Vec::with_capacity(batch * seq_len);
    for (ids, mask) in rows {
        input_ids.extend(ids);
        attention_mask.extend(mask);
    }
    let token_type_ids = vec![0i64; batch * seq_len];

    let input_ids_array = Array2::from_shape_vec((batch, seq_len), input_ids)
        .context("Failed to create input_ids array")?;
    let attention_mask_array = Array2::from_shape_vec((batch, seq_len), attention_mask)
        .context("Failed to create attention_mask array")?;
    let token_type_ids_array = Array2::from_shape_vec((batch, seq_len), token_type_ids)
        .context("Failed to create token_type_ids array")?;

    let outputs = session.run(ort::inputs![
        "input_ids" => Value::from_array(input_ids_array)?,
        "attention_mask" => Value::from_array(attention_mask_array)?,
        "token_type_ids" => Value::from_array(token_type_ids_array)?
    ])?;

    // Use index [0] instead of name since different models may have
    // different output names
    let output = outputs[0]
        .try_extract_array::<f32>()
        .context("Failed to extract output tensor")?
        .into_dimensionality::<Ix3>()
        .context("Model output is not [batch, seq_len, hidden_dim]")?
        .to_owned();

    Ok(output)
}
