mod helpers;

use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::Value;

use diarist::config::GenerationConfig;
use diarist::diary::types::DateKey;
use diarist::generation::ollama::OllamaGenerator;
use diarist::generation::AnswerGenerator;
use diarist::DiaryError;
use helpers::{pipeline_with, temp_store, WordHashEmbedding};

#[derive(Clone)]
struct FakeOllama {
    requests: Arc<Mutex<Vec<Value>>>,
    status: StatusCode,
    body: &'static str,
}

async fn generate(State(fake): State<FakeOllama>, Json(request): Json<Value>) -> (StatusCode, String) {
    fake.requests.lock().unwrap().push(request);
    (fake.status, fake.body.to_string())
}

/// Start a fake `/api/generate` on a random port; returns its base URL and the
/// request log.
async fn spawn_fake(status: StatusCode, body: &'static str) -> (String, Arc<Mutex<Vec<Value>>>) {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let fake = FakeOllama {
        requests: Arc::clone(&requests),
        status,
        body,
    };
    let app = Router::new()
        .route("/api/generate", post(generate))
        .with_state(fake);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), requests)
}

fn generator_for(base_url: &str) -> OllamaGenerator {
    let config = GenerationConfig {
        base_url: base_url.to_string(),
        timeout_secs: 10,
        ..Default::default()
    };
    OllamaGenerator::new(&config).unwrap()
}

#[tokio::test]
async fn sends_one_non_streaming_request_with_rendered_prompt() {
    let (url, requests) = spawn_fake(
        StatusCode::OK,
        r#"{"model":"llama3.2","response":"You went hiking.","done":true}"#,
    )
    .await;
    let generator = generator_for(&url);

    let grounding = "Date: 2024-07-01\nDiary: Hiked up the hill.\n\n";
    let answer = generator
        .generate("What did I do in July?", grounding)
        .await
        .unwrap();

    assert_eq!(answer, "You went hiking.");

    let requests = requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request["model"], "llama3.2");
    assert_eq!(request["stream"], false);
    let prompt = request["prompt"].as_str().unwrap();
    assert!(prompt.contains("What did I do in July?"));
    assert!(prompt.contains(grounding));
    assert!(prompt.contains("你是一个十分优秀的助手"));
    assert!(!prompt.contains("{question}"));
    assert!(!prompt.contains("{text}"));
}

#[tokio::test]
async fn http_error_carries_server_message() {
    let (url, _requests) = spawn_fake(
        StatusCode::NOT_FOUND,
        r#"{"error":"model 'llama3.2' not found, try pulling it first"}"#,
    )
    .await;

    let err = generator_for(&url).generate("q", "").await.unwrap_err();

    assert!(matches!(err, DiaryError::Generation(_)));
    let message = err.to_string();
    assert!(message.contains("404"), "{message}");
    assert!(message.contains("try pulling it first"), "{message}");
}

#[tokio::test]
async fn malformed_body_is_a_generation_error() {
    let (url, _requests) = spawn_fake(StatusCode::OK, "<html>gateway</html>").await;

    let err = generator_for(&url).generate("q", "").await.unwrap_err();
    assert!(matches!(err, DiaryError::Generation(_)));
}

#[tokio::test]
async fn unreachable_server_is_a_generation_error() {
    // Grab a free port and release it so nothing is listening there.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = generator_for(&format!("http://{addr}"))
        .generate("q", "")
        .await
        .unwrap_err();
    assert!(matches!(err, DiaryError::Generation(_)));
}

#[tokio::test]
async fn full_question_round_trip() {
    let (url, requests) = spawn_fake(
        StatusCode::OK,
        r#"{"response":"On 2024-01-01 you walked in the park.","done":true}"#,
    )
    .await;

    let (_tmp, store) = temp_store();
    let day: DateKey = "2024-01-01".parse().unwrap();
    store.save(day, "Had a great walk in the park.").unwrap();

    let pipeline = pipeline_with(
        store,
        Arc::new(WordHashEmbedding),
        Arc::new(generator_for(&url)),
    );

    let outcome = pipeline.ask("Where did I walk?").await.unwrap().unwrap();

    assert_eq!(outcome.answer, "On 2024-01-01 you walked in the park.");
    let requests = requests.lock().unwrap();
    let prompt = requests[0]["prompt"].as_str().unwrap();
    assert!(prompt.contains("Date: 2024-01-01\nDiary: Had a great walk in the park.\n\n"));
}

#[tokio::test]
async fn empty_answer_is_a_generation_error() {
    let (url, _requests) = spawn_fake(
        StatusCode::OK,
        r#"{"model":"llama3.2","response":"","done":true}"#,
    )
    .await;

    let err = generator_for(&url).generate("q", "").await.unwrap_err();
    assert!(matches!(err, DiaryError::Generation(_)));
}
