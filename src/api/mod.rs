// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod embed;
pub mod errors;
pub mod health;
pub mod http_server;

pub use embed::{
    embed_batch_handler, embed_handler, BatchEmbedRequest, BatchEmbedResponse, EmbedRequest,
    EmbedResponse,
};
pub use errors::{ApiError, ErrorResponse};
pub use health::{health_handler, HealthResponse};
pub use http_server::{create_app, start_server, AppState};
