use std::sync::{Arc, Mutex};

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::post, Json, Router};
use serde_json::{json, Value};

use ragline_core::config::{GenerationSettings, ServiceSettings};
use ragline_core::{Error, GenerationGateway};
use ragline_generate::OllamaGenerator;

type Seen = Arc<Mutex<Vec<Value>>>;

async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    format!("http://{addr}")
}

fn generator(base_url: &str, temperature: Option<f32>) -> OllamaGenerator {
    let service = ServiceSettings { base_url: base_url.to_string(), timeout_secs: 5 };
    let generation = GenerationSettings { model: "test-llm".to_string(), temperature };
    OllamaGenerator::new(&service, &generation).unwrap()
}

/// Echoes the prompt back upper-cased and records every request body.
async fn echo(State(seen): State<Seen>, Json(body): Json<Value>) -> impl IntoResponse {
    seen.lock().unwrap().push(body.clone());
    let prompt = body["prompt"].as_str().unwrap_or_default().to_uppercase();
    (StatusCode::OK, Json(json!({ "model": body["model"], "response": prompt, "done": true })))
}

fn echo_service(seen: Seen) -> Router {
    Router::new().route("/api/generate", post(echo)).with_state(seen)
}

#[tokio::test]
async fn generate_returns_response_field() {
    let seen = Seen::default();
    let base = spawn(echo_service(seen.clone())).await;
    let text = generator(&base, None).generate("hello there").await.unwrap();
    assert_eq!(text, "HELLO THERE");

    let bodies = seen.lock().unwrap();
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0]["model"], "test-llm");
    assert_eq!(bodies[0]["stream"], false);
    assert!(bodies[0].get("options").is_none(), "no options without a temperature");
}

#[tokio::test]
async fn temperature_is_sent_as_an_option() {
    let seen = Seen::default();
    let base = spawn(echo_service(seen.clone())).await;
    generator(&format!("{base}/"), Some(0.25)).generate("x").await.unwrap();

    let bodies = seen.lock().unwrap();
    let temperature = bodies[0]["options"]["temperature"].as_f64().unwrap();
    assert!((temperature - 0.25).abs() < 1e-6);
}

#[tokio::test]
async fn empty_completion_is_not_an_error() {
    let app = Router::new().route("/api/generate", post(|| async { Json(json!({ "response": "" })) }));
    let base = spawn(app).await;
    assert_eq!(generator(&base, None).generate("q").await.unwrap(), "");
}

#[tokio::test]
async fn missing_response_field_is_a_generation_error() {
    let app = Router::new().route("/api/generate", post(|| async { Json(json!({ "done": true })) }));
    let base = spawn(app).await;
    let err = generator(&base, None).generate("q").await.unwrap_err();
    assert!(matches!(err, Error::GenerationService(_)), "{err:?}");
}

#[tokio::test]
async fn server_error_is_a_generation_error() {
    let app = Router::new().route(
        "/api/generate",
        post(|| async { (StatusCode::NOT_FOUND, Json(json!({ "error": "model 'test-llm' not found" }))) }),
    );
    let base = spawn(app).await;
    let err = generator(&base, None).generate("q").await.unwrap_err();
    match err {
        Error::GenerationService(msg) => assert!(msg.contains("404"), "{msg}"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_service_is_a_generation_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let err = generator(&format!("http://{addr}"), None).generate("q").await.unwrap_err();
    assert!(matches!(err, Error::GenerationService(_)));
}
