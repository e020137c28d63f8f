use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{Html, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use metaprompt_core::GenerationRequest;
use serde::Deserialize;
use tracing::info;

use super::{error_status, AppState};
use crate::render;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/generate", post(generate))
        .route("/edit", post(edit))
}

#[derive(Debug, Deserialize)]
struct GenerateForm {
    #[serde(default)]
    task_or_prompt: String,
}

#[derive(Debug, Deserialize)]
struct EditForm {
    #[serde(default)]
    prompt: String,
}

/// Form posts carry CRLF line breaks; the session holds what the user typed.
fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n")
}

async fn index(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let session = state.sessions.resolve(&headers);
    let snapshot = state.sessions.snapshot(session.id);
    state
        .sessions
        .respond(session, Html(render::page(&snapshot, None)))
}

async fn generate(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<GenerateForm>,
) -> Response {
    let session = state.sessions.resolve(&headers);
    let input = normalize_newlines(&form.task_or_prompt);
    state
        .sessions
        .update(session.id, |s| s.set_last_input(input.clone()));

    let outcome = match GenerationRequest::new(input) {
        Ok(request) => state.generator.generate(&request).await,
        Err(e) => Err(e),
    };

    let (status, error) = match outcome {
        Ok(text) => {
            state.sessions.update(session.id, |s| s.store_generated(text));
            info!(session = %session.id, "stored generated prompt");
            (StatusCode::OK, None)
        }
        Err(e) => (error_status(&e), Some(e.to_string())),
    };

    let snapshot = state.sessions.snapshot(session.id);
    state.sessions.respond(
        session,
        (status, Html(render::page(&snapshot, error.as_deref()))),
    )
}

/// Fallback for browsers without JavaScript: save the edited text and go
/// back to the page.
async fn edit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<EditForm>,
) -> Response {
    let session = state.sessions.resolve(&headers);
    let text = normalize_newlines(&form.prompt);
    state.sessions.update(session.id, |s| s.edit(text));
    state.sessions.respond(session, Redirect::to("/"))
}
