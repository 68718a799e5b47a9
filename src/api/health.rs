// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! GET / and GET /health handler.
//!
//! Readiness is computed per call from whether the model provider can
//! currently supply a handle; the first probe after a failed startup
//! pre-load therefore retries the load. A degraded report is a normal
//! status response, not an error path, so monitors can poll it safely.

use crate::api::http_server::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

/// Health report: `{status, model, dimension, ready}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// "healthy", or "unhealthy: <reason>" when the model cannot be obtained
    pub status: String,

    /// Configured model name
    pub model: String,

    /// Configured embedding dimension
    pub dimension: usize,

    /// Whether the model handle is currently obtainable
    pub ready: bool,
}

/// GET / and GET /health handler
///
/// Answers 200 in both states by default; with `health_unready_503` set,
/// an unhealthy report is sent with status 503 for automated probes.
pub async fn health_handler(State(state): State<AppState>) -> Response {
    match state.provider.get().await {
        Ok(model) => Json(HealthResponse {
            status: "healthy".to_string(),
            model: model.model_name().to_string(),
            dimension: model.dimension(),
            ready: true,
        })
        .into_response(),
        Err(e) => {
            let status_code = if state.config.health_unready_503 {
                StatusCode::SERVICE_UNAVAILABLE
            } else {
                StatusCode::OK
            };
            let body = HealthResponse {
                status: format!("unhealthy: {}", e),
                model: state.config.model_name.clone(),
                dimension: state.config.dimension,
                ready: false,
            };
            (status_code, Json(body)).into_response()
        }
    }
}
