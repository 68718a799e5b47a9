// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use embedding_service::{
    api::{start_server, AppState},
    config::ServiceConfig,
};
use std::env;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    let config = ServiceConfig::from_env();
    info!(
        "Starting embedding service (model: {}, dimension: {}, port: {})",
        config.model_name, config.dimension, config.port
    );

    let state = AppState::new(config);

    // Pre-load the model so first-request latency is not penalized. A
    // failure here is not fatal; requests retry the load on demand.
    match state.provider.get().await {
        Ok(model) => info!(
            "Model pre-loaded, service ready ({} dimensions)",
            model.dimension()
        ),
        Err(e) => warn!(
            "Could not pre-load model: {:#}. It will be loaded on first request",
            e
        ),
    }

    start_server(state).await
}
