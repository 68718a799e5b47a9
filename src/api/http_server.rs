// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::cors::{Any, CorsLayer};

use crate::api::embed::{embed_batch_handler, embed_handler};
use crate::api::health::health_handler;
use crate::config::ServiceConfig;
use crate::embeddings::{EmbeddingModelConfig, ModelProvider};

/// Shared state for all request handlers: the service configuration and
/// the process-wide model provider.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServiceConfig>,
    pub provider: Arc<ModelProvider>,
}

impl AppState {
    pub fn new(config: ServiceConfig) -> Self {
        let provider = ModelProvider::new(EmbeddingModelConfig {
            name: config.model_name.clone(),
            model_path: config.model_path.clone(),
            tokenizer_path: config.tokenizer_path.clone(),
            dimension: config.dimension,
        });

        Self {
            config: Arc::new(config),
            provider: Arc::new(provider),
        }
    }
}

/// Builds the router. Shared by `start_server` and the integration tests.
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(health_handler))
        .route("/health", get(health_handler))
        .route("/embed", post(embed_handler))
        .route("/embed/batch", post(embed_batch_handler))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Binds the listener and serves requests until the process exits.
pub async fn start_server(state: AppState) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], state.config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Embedding service listening on {}", addr);

    axum::serve(listener, create_app(state)).await?;

    Ok(())
}
