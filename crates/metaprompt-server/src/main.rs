use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use metaprompt_server::config::ServerConfig;
use metaprompt_server::session::SessionStore;
use metaprompt_service::{Generator, OpenAiService};
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine; real env vars still apply.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::parse();

    let service = OpenAiService::new(config.api_key.clone()).with_base_url(&config.base_url);
    if !service.has_credential() {
        warn!("OPENAI_API_KEY is not set; every generation will fail until it is");
    }
    info!("completion endpoint: {} (model {})", service.base_url(), service.model());

    let generator = Generator::new(Arc::new(service));
    let sessions = SessionStore::with_limits(config.session_ttl(), config.max_sessions);

    let addr = config.socket_addr();
    let listener = TcpListener::bind(addr).await?;
    info!("metaprompt-server listening on http://{addr}");

    metaprompt_server::serve(listener, generator, sessions).await
}
