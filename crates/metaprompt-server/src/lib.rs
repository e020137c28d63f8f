pub mod config;
mod render;
mod routes;
pub mod session;
#[cfg(feature = "test-helpers")]
pub mod test_helpers;

use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use metaprompt_service::Generator;
use tokio::net::TcpListener;

use routes::InnerAppState;
use session::SessionStore;

/// Build the full application router around a generator, with default
/// session limits.
pub fn app(generator: Generator) -> Router {
    app_with_sessions(generator, SessionStore::new())
}

pub fn app_with_sessions(generator: Generator, sessions: SessionStore) -> Router {
    let state = Arc::new(InnerAppState {
        generator,
        sessions,
    });
    routes::build_router(state)
}

pub async fn serve(listener: TcpListener, generator: Generator, sessions: SessionStore) -> Result<()> {
    axum::serve(listener, app_with_sessions(generator, sessions)).await?;
    Ok(())
}
