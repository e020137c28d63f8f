use std::sync::Arc;

use axum::Router;
use metaprompt_service::{CompletionService, Generator};
use tokio::net::TcpListener;

/// Build a test router around any completion service, usually a `MockCompletion`.
pub fn test_router(service: Arc<dyn CompletionService>) -> Router {
    crate::app(Generator::new(service))
}

/// A running test server with base_url and background task handle.
pub struct TestServer {
    pub base_url: String,
    _handle: tokio::task::JoinHandle<()>,
}

/// Spawn an axum test server on a random port. Returns the TestServer
/// with the `base_url` (e.g. "http://127.0.0.1:12345").
pub async fn spawn_test_server(service: Arc<dyn CompletionService>) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{addr}");
    let app = test_router(service);
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    TestServer {
        base_url,
        _handle: handle,
    }
}
