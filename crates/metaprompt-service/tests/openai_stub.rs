//! Integration tests for OpenAiService against an in-process stub of the
//! chat-completions endpoint.
//!
//! Each test spawns an axum server on 127.0.0.1:0 that answers
//! `POST /v1/chat/completions` with a canned status and body, and records
//! the last request it saw.

use std::sync::{Arc, Mutex};

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use metaprompt_core::{GenerationRequest, MetapromptError};
use metaprompt_service::{CompletionService, Generator, OpenAiService, ServiceError};
use serde_json::{json, Value};
use tokio::net::TcpListener;

#[derive(Clone)]
struct Stub {
    status: StatusCode,
    body: String,
    seen: Arc<Mutex<Option<(Option<String>, Value)>>>,
}

async fn completions(
    State(stub): State<Stub>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, String) {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    *stub.seen.lock().unwrap() = Some((auth, body));
    (stub.status, stub.body.clone())
}

/// Spawn the stub and return (base_url, recorder).
async fn spawn_stub(
    status: StatusCode,
    body: &str,
) -> (String, Arc<Mutex<Option<(Option<String>, Value)>>>) {
    let seen = Arc::new(Mutex::new(None));
    let stub = Stub {
        status,
        body: body.to_string(),
        seen: seen.clone(),
    };
    let app = Router::new()
        .route("/v1/chat/completions", post(completions))
        .with_state(stub);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}/v1"), seen)
}

fn completion_body(content: &str) -> String {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [
            { "index": 0, "message": { "role": "assistant", "content": content }, "finish_reason": "stop" }
        ]
    })
    .to_string()
}

#[tokio::test]
async fn returns_first_choice_text() {
    let (url, seen) = spawn_stub(StatusCode::OK, &completion_body("T")).await;
    let svc = OpenAiService::new(Some("sk-test".into())).with_base_url(&url);
    let generator = Generator::new(Arc::new(svc));

    let req = GenerationRequest::new("Write a haiku generator.").unwrap();
    assert_eq!(generator.generate(&req).await.unwrap(), "T");

    let (auth, body) = seen.lock().unwrap().clone().unwrap();
    assert_eq!(auth.as_deref(), Some("Bearer sk-test"));
    assert_eq!(body["model"], "gpt-4o-mini");
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(body["messages"][0]["content"], metaprompt_prompts::META_PROMPT);
    assert_eq!(body["messages"][1]["role"], "user");
    assert_eq!(
        body["messages"][1]["content"],
        "Task, Goal, or Current Prompt:\nWrite a haiku generator."
    );
    assert!(body.get("temperature").is_none());
}

#[tokio::test]
async fn api_error_is_wrapped_with_prefix() {
    let (url, _) = spawn_stub(
        StatusCode::UNAUTHORIZED,
        r#"{"error":{"message":"Incorrect API key provided"}}"#,
    )
    .await;
    let svc = OpenAiService::new(Some("sk-bad".into())).with_base_url(&url);
    let generator = Generator::new(Arc::new(svc));

    let err = generator
        .generate(&GenerationRequest::new("x").unwrap())
        .await
        .unwrap_err();
    assert_eq!(
        err,
        MetapromptError::GenerationFailed("API error 401: Incorrect API key provided".into())
    );
    assert_eq!(
        err.to_string(),
        "Error generating prompt: API error 401: Incorrect API key provided"
    );
}

#[tokio::test]
async fn empty_choices_is_an_error() {
    let (url, _) = spawn_stub(StatusCode::OK, r#"{"choices":[]}"#).await;
    let svc = OpenAiService::new(Some("sk-test".into())).with_base_url(&url);
    let err = svc
        .complete(&[metaprompt_core::ChatMessage::user("x")])
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::EmptyResponse));
}

#[tokio::test]
async fn null_content_is_an_error() {
    let body = r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#;
    let (url, _) = spawn_stub(StatusCode::OK, body).await;
    let svc = OpenAiService::new(Some("sk-test".into())).with_base_url(&url);
    let err = svc
        .complete(&[metaprompt_core::ChatMessage::user("x")])
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::EmptyResponse));
}

#[tokio::test]
async fn malformed_body_is_decode_error() {
    let (url, _) = spawn_stub(StatusCode::OK, "not json").await;
    let svc = OpenAiService::new(Some("sk-test".into())).with_base_url(&url);
    let err = svc
        .complete(&[metaprompt_core::ChatMessage::user("x")])
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Decode(_)));
}

#[tokio::test]
async fn unreachable_endpoint_is_request_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let svc = OpenAiService::new(Some("sk-test".into())).with_base_url(&format!("http://{addr}/v1"));
    let err = svc
        .complete(&[metaprompt_core::ChatMessage::user("x")])
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Request(_)));
}
