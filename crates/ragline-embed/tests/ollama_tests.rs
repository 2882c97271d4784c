use std::time::Duration;

use axum::{http::StatusCode, response::IntoResponse, routing::post, Json, Router};
use serde_json::{json, Value};

use ragline_core::config::{EmbeddingSettings, ServiceSettings};
use ragline_core::{EmbeddingGateway, Error};
use ragline_embed::OllamaEmbedder;

async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    format!("http://{addr}")
}

fn embedder(base_url: &str, concurrency: usize) -> OllamaEmbedder {
    let service = ServiceSettings { base_url: base_url.to_string(), timeout_secs: 5 };
    let embedding = EmbeddingSettings { model: "test-embed".to_string(), concurrency, ..Default::default() };
    OllamaEmbedder::new(&service, &embedding).unwrap()
}

/// Vector is `[prompt length, 1.0]`; "slow" stalls, "boom" fails.
async fn embeddings(Json(body): Json<Value>) -> impl IntoResponse {
    if body["model"] != "test-embed" {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": "unknown model" })));
    }
    let prompt = body["prompt"].as_str().unwrap_or_default().to_string();
    if prompt == "slow" {
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    if prompt == "boom" {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "model crashed" })));
    }
    (StatusCode::OK, Json(json!({ "embedding": [prompt.len() as f32, 1.0] })))
}

fn service() -> Router {
    Router::new().route("/api/embeddings", post(embeddings))
}

#[tokio::test]
async fn embed_posts_model_and_prompt() {
    let base = spawn(service()).await;
    let v = embedder(&base, 1).embed("hello").await.unwrap();
    assert_eq!(v, vec![5.0, 1.0]);
}

#[tokio::test]
async fn trailing_slash_in_base_url_is_tolerated() {
    let base = spawn(service()).await;
    let v = embedder(&format!("{base}/"), 1).embed("abc").await.unwrap();
    assert_eq!(v, vec![3.0, 1.0]);
}

#[tokio::test]
async fn concurrent_batch_keeps_input_order() {
    let base = spawn(service()).await;
    let texts: Vec<String> = ["slow", "a", "bb"].iter().map(|s| s.to_string()).collect();
    let vectors = embedder(&base, 4).embed_batch(&texts).await.unwrap();
    let lengths: Vec<f32> = vectors.iter().map(|v| v[0]).collect();
    assert_eq!(lengths, vec![4.0, 1.0, 2.0]);
}

#[tokio::test]
async fn one_failing_item_fails_the_whole_batch() {
    let base = spawn(service()).await;
    let texts: Vec<String> = ["ok", "boom", "fine"].iter().map(|s| s.to_string()).collect();
    let err = embedder(&base, 1).embed_batch(&texts).await.unwrap_err();
    match err {
        Error::EmbeddingService(msg) => assert!(msg.contains("500"), "{msg}"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn missing_embedding_field_is_a_service_error() {
    let app = Router::new().route("/api/embeddings", post(|| async { Json(json!({ "vector": [1.0] })) }));
    let base = spawn(app).await;
    let err = embedder(&base, 1).embed("x").await.unwrap_err();
    assert!(matches!(err, Error::EmbeddingService(ref m) if m.contains("missing")), "{err:?}");
}

#[tokio::test]
async fn empty_embedding_vector_is_a_service_error() {
    let app = Router::new().route("/api/embeddings", post(|| async { Json(json!({ "embedding": [] })) }));
    let base = spawn(app).await;
    let err = embedder(&base, 1).embed("x").await.unwrap_err();
    assert!(matches!(err, Error::EmbeddingService(_)));
}

#[tokio::test]
async fn unreachable_service_is_a_service_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let err = embedder(&format!("http://{addr}"), 1).embed("x").await.unwrap_err();
    assert!(matches!(err, Error::EmbeddingService(_)));
}
