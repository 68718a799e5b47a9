// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Integration tests for POST /embed and POST /embed/batch.
//!
//! Validation paths and error translation run against a state whose model
//! paths point nowhere, so they need no model files. Success paths need
//! the all-MiniLM-L6-v2 ONNX export on disk and are #[ignore]d by default.

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};
use embedding_service::api::http_server::{create_app, AppState};
use embedding_service::api::{BatchEmbedResponse, EmbedResponse, ErrorResponse};
use embedding_service::config::ServiceConfig;
use tower::ServiceExt; // for `oneshot`

const MODEL_PATH: &str = "./models/all-MiniLM-L6-v2-onnx/model.onnx";
const TOKENIZER_PATH: &str = "./models/all-MiniLM-L6-v2-onnx/tokenizer.json";

/// State whose model load always fails (nonexistent paths).
fn state_without_model() -> AppState {
    let config = ServiceConfig {
        model_path: "/nonexistent/model.onnx".to_string(),
        tokenizer_path: "/nonexistent/tokenizer.json".to_string(),
        ..ServiceConfig::default()
    };
    AppState::new(config)
}

/// State using the on-disk model files (for #[ignore]d tests).
fn state_with_model() -> AppState {
    let config = ServiceConfig {
        model_path: MODEL_PATH.to_string(),
        tokenizer_path: TOKENIZER_PATH.to_string(),
        ..ServiceConfig::default()
    };
    AppState::new(config)
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn response_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_embed_empty_text_returns_400() {
    let app = create_app(state_without_model());

    let response = app
        .oneshot(post_json("/embed", r#"{"text": ""}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: ErrorResponse = response_json(response).await;
    assert_eq!(error.error_type, "validation_error");
    assert!(error.message.contains("empty"));
}

#[tokio::test]
async fn test_embed_whitespace_only_text_returns_400() {
    let app = create_app(state_without_model());

    let response = app
        .oneshot(post_json("/embed", r#"{"text": "  \n\t  "}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_embed_oversized_text_returns_400_naming_limit() {
    let app = create_app(state_without_model());

    let long_text = "a".repeat(5001);
    let body = serde_json::json!({ "text": long_text }).to_string();
    let response = app.oneshot(post_json("/embed", &body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: ErrorResponse = response_json(response).await;
    assert!(error.message.contains("5000"), "message: {}", error.message);
    assert!(error.message.contains("5001"), "message: {}", error.message);
}

#[tokio::test]
async fn test_embed_model_load_failure_returns_500() {
    // Valid payload, but the model paths point nowhere: the failure must
    // surface as a 500 with a descriptive message, not a crash.
    let app = create_app(state_without_model());

    let response = app
        .oneshot(post_json("/embed", r#"{"text": "hello world"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let error: ErrorResponse = response_json(response).await;
    assert_eq!(error.error_type, "internal_error");
    assert!(error.message.contains("model"), "message: {}", error.message);
}

#[tokio::test]
async fn test_embed_rejects_get() {
    let app = create_app(state_without_model());

    let request = Request::builder()
        .method(Method::GET)
        .uri("/embed")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_batch_empty_list_returns_400() {
    let app = create_app(state_without_model());

    let response = app
        .oneshot(post_json("/embed/batch", r#"{"texts": []}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: ErrorResponse = response_json(response).await;
    assert_eq!(error.error_type, "validation_error");
}

#[tokio::test]
async fn test_batch_over_limit_returns_400_naming_limit_and_count() {
    let app = create_app(state_without_model());

    let texts: Vec<String> = (0..101).map(|i| format!("text {}", i)).collect();
    let body = serde_json::json!({ "texts": texts }).to_string();
    let response = app.oneshot(post_json("/embed/batch", &body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: ErrorResponse = response_json(response).await;
    assert!(error.message.contains("100"), "message: {}", error.message);
    assert!(error.message.contains("101"), "message: {}", error.message);
}

#[tokio::test]
async fn test_batch_all_empty_after_filtering_returns_400() {
    let app = create_app(state_without_model());

    let response = app
        .oneshot(post_json("/embed/batch", r#"{"texts": ["", "  ", "\n"]}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: ErrorResponse = response_json(response).await;
    assert!(error.message.contains("empty"), "message: {}", error.message);
}

#[tokio::test]
async fn test_batch_oversized_entry_returns_400() {
    let app = create_app(state_without_model());

    let body = serde_json::json!({ "texts": ["ok", "a".repeat(5001)] }).to_string();
    let response = app.oneshot(post_json("/embed/batch", &body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_json_is_rejected() {
    let app = create_app(state_without_model());

    let response = app
        .oneshot(post_json("/embed", r#"{"text": 42}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

//
// Success paths - require the ONNX export under ./models
//

#[tokio::test]
#[ignore] // Only run if model files are downloaded
async fn test_embed_hello_world_returns_384_dimensions() {
    let app = create_app(state_with_model());

    let response = app
        .oneshot(post_json("/embed", r#"{"text": "hello world"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: EmbedResponse = response_json(response).await;
    assert_eq!(body.dimension, 384);
    assert_eq!(body.embedding.len(), 384);
    assert_eq!(body.model, "all-MiniLM-L6-v2");
}

#[tokio::test]
#[ignore] // Only run if model files are downloaded
async fn test_embed_is_deterministic() {
    let state = state_with_model();

    let response1 = create_app(state.clone())
        .oneshot(post_json("/embed", r#"{"text": "same input"}"#))
        .await
        .unwrap();
    let response2 = create_app(state)
        .oneshot(post_json("/embed", r#"{"text": "same input"}"#))
        .await
        .unwrap();

    let body1: EmbedResponse = response_json(response1).await;
    let body2: EmbedResponse = response_json(response2).await;
    for (a, b) in body1.embedding.iter().zip(body2.embedding.iter()) {
        assert!((a - b).abs() < 1e-6);
    }
}

#[tokio::test]
#[ignore] // Only run if model files are downloaded
async fn test_batch_three_texts_returns_count_3_in_order() {
    let app = create_app(state_with_model());

    let response = app
        .oneshot(post_json("/embed/batch", r#"{"texts": ["a", "b", "c"]}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: BatchEmbedResponse = response_json(response).await;
    assert_eq!(body.count, 3);
    assert_eq!(body.embeddings.len(), 3);
    assert_eq!(body.dimension, 384);
    for embedding in &body.embeddings {
        assert_eq!(embedding.len(), 384);
    }

    // Order: batch entry 0 matches a single-embed of the same text
    let single = create_app(state_with_model())
        .oneshot(post_json("/embed", r#"{"text": "a"}"#))
        .await
        .unwrap();
    let single: EmbedResponse = response_json(single).await;
    for (a, b) in body.embeddings[0].iter().zip(single.embedding.iter()) {
        assert!((a - b).abs() < 1e-4);
    }
}

#[tokio::test]
#[ignore] // Only run if model files are downloaded
async fn test_batch_filters_empty_entries() {
    let app = create_app(state_with_model());

    let response = app
        .oneshot(post_json(
            "/embed/batch",
            r#"{"texts": ["first", "", "second"]}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: BatchEmbedResponse = response_json(response).await;
    assert_eq!(body.count, 2);
    assert_eq!(body.embeddings.len(), 2);
}
