// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Request types for the embedding endpoints, with validation logic.

use crate::api::ApiError;
use serde::{Deserialize, Serialize};

/// Request body for POST /embed
///
/// # Example
/// ```json
/// {"text": "hello world"}
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedRequest {
    /// Text to generate an embedding for
    pub text: String,
}

impl EmbedRequest {
    /// Validates the request.
    ///
    /// Rejects empty or whitespace-only text, and text longer than
    /// `max_text_length` characters. Oversized input is an error, never
    /// silently truncated.
    pub fn validate(&self, max_text_length: usize) -> Result<(), ApiError> {
        if self.text.trim().is_empty() {
            return Err(ApiError::ValidationError {
                field: "text".to_string(),
                message: "Text cannot be empty".to_string(),
            });
        }

        let length = self.text.chars().count();
        if length > max_text_length {
            return Err(ApiError::ValidationError {
                field: "text".to_string(),
                message: format!(
                    "Text cannot exceed {} characters (got {})",
                    max_text_length, length
                ),
            });
        }

        Ok(())
    }
}

/// Request body for POST /embed/batch
///
/// # Example
/// ```json
/// {"texts": ["first", "second"]}
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchEmbedRequest {
    /// Texts to embed together in one model invocation
    pub texts: Vec<String>,
}

impl BatchEmbedRequest {
    /// Validates the request.
    ///
    /// Checks, in order: the list is non-empty, the list does not exceed
    /// `max_batch_size` (the error names both the limit and the received
    /// count), and no entry exceeds `max_text_length` characters.
    pub fn validate(&self, max_batch_size: usize, max_text_length: usize) -> Result<(), ApiError> {
        if self.texts.is_empty() {
            return Err(ApiError::ValidationError {
                field: "texts".to_string(),
                message: "Texts list cannot be empty".to_string(),
            });
        }

        if self.texts.len() > max_batch_size {
            return Err(ApiError::ValidationError {
                field: "texts".to_string(),
                message: format!(
                    "Maximum batch size is {}, got {}",
                    max_batch_size,
                    self.texts.len()
                ),
            });
        }

        for (index, text) in self.texts.iter().enumerate() {
            let length = text.chars().count();
            if length > max_text_length {
                return Err(ApiError::ValidationError {
                    field: format!("texts[{}]", index),
                    message: format!(
                        "Text cannot exceed {} characters (got {})",
                        max_text_length, length
                    ),
                });
            }
        }

        Ok(())
    }

    /// Returns the entries that survive empty-text filtering, in order.
    pub fn filtered_texts(&self) -> Vec<String> {
        self.texts
            .iter()
            .filter(|t| !t.trim().is_empty())
            .cloned()
            .collect()
    }
}
