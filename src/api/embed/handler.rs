// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /embed and POST /embed/batch HTTP handlers.
//!
//! Both handlers follow the same path: validate the payload, obtain the
//! shared model handle (loading it on first use), run the encode on the
//! blocking thread pool, and shape the vectors into the response. Every
//! failure is translated into an [`ApiError`] at this boundary.

use crate::api::embed::{BatchEmbedRequest, BatchEmbedResponse, EmbedRequest, EmbedResponse};
use crate::api::http_server::AppState;
use crate::api::ApiError;
use crate::embeddings::OnnxEmbeddingModel;
use axum::extract::State;
use axum::Json;
use std::sync::Arc;
use tracing::error;

/// POST /embed handler
///
/// Generates the embedding for a single text.
pub async fn embed_handler(
    State(state): State<AppState>,
    Json(request): Json<EmbedRequest>,
) -> Result<Json<EmbedResponse>, ApiError> {
    request.validate(state.config.max_text_length)?;

    let model = get_model(&state).await?;
    let text = request.text;
    let embedding = tokio::task::spawn_blocking(move || model.embed(&text))
        .await
        .map_err(|e| {
            error!("Embedding task panicked: {}", e);
            ApiError::InternalError(format!("Embedding task failed: {}", e))
        })?
        .map_err(|e| {
            error!("Error generating embedding: {:#}", e);
            ApiError::InternalError(format!("Error generating embedding: {}", e))
        })?;

    Ok(Json(EmbedResponse {
        dimension: embedding.len(),
        embedding,
        model: state.config.model_name.clone(),
    }))
}

/// POST /embed/batch handler
///
/// Generates embeddings for multiple texts in a single model invocation.
/// With `filter_empty_texts` enabled (the default), empty and
/// whitespace-only entries are dropped before encoding and `count`
/// reflects the vectors actually produced.
pub async fn embed_batch_handler(
    State(state): State<AppState>,
    Json(request): Json<BatchEmbedRequest>,
) -> Result<Json<BatchEmbedResponse>, ApiError> {
    request.validate(state.config.max_batch_size, state.config.max_text_length)?;

    let texts = if state.config.filter_empty_texts {
        let filtered = request.filtered_texts();
        if filtered.is_empty() {
            return Err(ApiError::ValidationError {
                field: "texts".to_string(),
                message: "All texts are empty".to_string(),
            });
        }
        filtered
    } else {
        request.texts
    };

    let model = get_model(&state).await?;
    let embeddings = tokio::task::spawn_blocking(move || model.embed_batch(&texts))
        .await
        .map_err(|e| {
            error!("Embedding task panicked: {}", e);
            ApiError::InternalError(format!("Embedding task failed: {}", e))
        })?
        .map_err(|e| {
            error!("Error generating embeddings: {:#}", e);
            ApiError::InternalError(format!("Error generating embeddings: {}", e))
        })?;

    let dimension = embeddings
        .first()
        .map(|e| e.len())
        .unwrap_or(state.config.dimension);

    Ok(Json(BatchEmbedResponse {
        count: embeddings.len(),
        embeddings,
        dimension,
        model: state.config.model_name.clone(),
    }))
}

/// Obtains the shared model handle, mapping a load failure to a 500.
async fn get_model(state: &AppState) -> Result<Arc<OnnxEmbeddingModel>, ApiError> {
    state.provider.get().await.map_err(|e| {
        error!("Failed to load embedding model: {:#}", e);
        ApiError::InternalError(format!("Failed to load embedding model: {}", e))
    })
}
