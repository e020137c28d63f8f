use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use clap::Parser;
use metaprompt_service::DEFAULT_BASE_URL;

#[derive(Debug, Parser)]
#[command(name = "metaprompt-server", about = "Turns task descriptions into system prompts")]
pub struct ServerConfig {
    /// Address to bind
    #[arg(long, env = "METAPROMPT_BIND", default_value = "0.0.0.0")]
    pub bind: IpAddr,

    /// Port to listen on
    #[arg(long, env = "METAPROMPT_PORT", default_value = "8501")]
    pub port: u16,

    /// API key for the completion service
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible API
    #[arg(long, env = "OPENAI_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Drop a session after this many seconds without requests
    #[arg(long, env = "METAPROMPT_SESSION_TTL", default_value = "3600")]
    pub session_ttl: u64,

    /// Maximum number of sessions held at once
    #[arg(long, env = "METAPROMPT_MAX_SESSIONS", default_value = "10000")]
    pub max_sessions: usize,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl)
    }
}
