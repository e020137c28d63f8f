pub mod api;
pub mod health;
pub mod page;

use std::sync::Arc;

use axum::{extract::rejection::JsonRejection, http::StatusCode, Json, Router};
use metaprompt_core::MetapromptError;
use metaprompt_service::Generator;
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use crate::session::SessionStore;

pub struct InnerAppState {
    pub generator: Generator,
    pub sessions: SessionStore,
}

pub type AppState = Arc<InnerAppState>;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(health::routes())
        .merge(page::routes())
        .merge(api::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// HTTP status for a failed submission: the user's fault or the upstream's.
pub(crate) fn error_status(e: &MetapromptError) -> StatusCode {
    match e {
        MetapromptError::EmptyInput => StatusCode::UNPROCESSABLE_ENTITY,
        MetapromptError::GenerationFailed(_) => StatusCode::BAD_GATEWAY,
    }
}

pub(crate) fn to_error(e: MetapromptError) -> (StatusCode, Json<Value>) {
    (error_status(&e), Json(json!({ "error": e.to_string() })))
}

/// Malformed or mistyped JSON bodies get the same `{"error": ...}` shape as
/// every other API failure.
pub(crate) fn rejection_error(rejection: JsonRejection) -> (StatusCode, Json<Value>) {
    (
        rejection.status(),
        Json(json!({ "error": rejection.body_text() })),
    )
}
