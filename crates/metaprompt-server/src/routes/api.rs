use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    response::Response,
    routing::{get, post},
    Json, Router,
};
use metaprompt_core::GenerationRequest;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::{rejection_error, to_error, AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/generate", post(generate))
        .route("/api/session/result", get(get_result).put(put_result))
}

#[derive(Debug, Deserialize)]
struct GenerateBody {
    /// `null` and a missing field both count as empty input.
    #[serde(default)]
    task_or_prompt: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResultBody {
    prompt: String,
    /// Generation and revision the edit was made against. Edits without
    /// them are applied unconditionally.
    generation: Option<u64>,
    revision: Option<u64>,
}

async fn generate(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<GenerateBody>, JsonRejection>,
) -> Response {
    let session = state.sessions.resolve(&headers);
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return state.sessions.respond(session, rejection_error(rejection)),
    };
    let input = body.task_or_prompt.unwrap_or_default();
    state
        .sessions
        .update(session.id, |s| s.set_last_input(input.clone()));

    let result = match GenerationRequest::new(input) {
        Ok(request) => state.generator.generate(&request).await,
        Err(e) => Err(e),
    };

    let response = result
        .map(|text| {
            state
                .sessions
                .update(session.id, |s| s.store_generated(text.clone()));
            Json(json!({ "prompt": text }))
        })
        .map_err(to_error);
    state.sessions.respond(session, response)
}

async fn get_result(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let session = state.sessions.resolve(&headers);
    let snapshot = state.sessions.snapshot(session.id);
    state.sessions.respond(
        session,
        Json(json!({
            "prompt": snapshot.result(),
            "generation": snapshot.generation(),
            "revision": snapshot.revision(),
        })),
    )
}

async fn put_result(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<ResultBody>, JsonRejection>,
) -> Response {
    let session = state.sessions.resolve(&headers);
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return state.sessions.respond(session, rejection_error(rejection)),
    };

    let (applied, held) = state.sessions.update(session.id, |s| {
        let applied = match (body.generation, body.revision) {
            (Some(generation), Some(revision)) => s.apply_edit(body.prompt, generation, revision),
            _ => {
                s.edit(body.prompt);
                true
            }
        };
        (applied, s.result().map(String::from))
    });
    if !applied {
        debug!(session = %session.id, "dropped stale edit");
    }

    state.sessions.respond(
        session,
        Json(json!({ "prompt": held, "applied": applied })),
    )
}
