//! Command-line and environment configuration.

use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;

use signpost::broadcast::HubConfig;
use signpost::core::TokenConfig;
use signpost::RegistryConfig;

/// Default request body limit (100 KiB).
pub const DEFAULT_BODY_LIMIT: usize = 100 * 1024;

/// Largest accepted per-subscriber event buffer.
pub const MAX_EVENT_CAPACITY: u64 = signpost::broadcast::MAX_CAPACITY as u64;

/// Database path that keeps everything in memory.
pub const IN_MEMORY: &str = ":memory:";

/// Serve the Signpost registry over HTTP.
#[derive(Debug, Clone, Parser)]
#[command(name = "signpost", version, about)]
pub struct Cli {
    /// Address to listen on.
    #[arg(long, env = "SIGNPOST_LISTEN", default_value = "127.0.0.1:3000")]
    pub listen: SocketAddr,

    /// SQLite database path, or `:memory:` for an ephemeral registry.
    #[arg(long, env = "SIGNPOST_DATABASE", default_value = "signpost.db")]
    pub database: String,

    /// Secret the bearer-token key is derived from.
    #[arg(long, env = "SIGNPOST_SECRET", hide_env_values = true)]
    pub secret: String,

    /// Token lifetime in seconds.
    #[arg(long, env = "SIGNPOST_TOKEN_TTL", default_value_t = 86_400)]
    pub token_ttl: u64,

    /// Maximum request body size in bytes.
    #[arg(long, env = "SIGNPOST_BODY_LIMIT", default_value_t = DEFAULT_BODY_LIMIT)]
    pub body_limit: usize,

    /// Events buffered per subscriber before a slow one starts losing them.
    #[arg(
        long,
        env = "SIGNPOST_EVENT_CAPACITY",
        default_value_t = signpost::broadcast::DEFAULT_CAPACITY as u64,
        value_parser = clap::value_parser!(u64).range(1..=MAX_EVENT_CAPACITY),
    )]
    pub event_capacity: u64,
}

impl Cli {
    pub fn registry_config(&self) -> RegistryConfig {
        RegistryConfig {
            token: TokenConfig {
                ttl: Duration::from_secs(self.token_ttl),
            },
            ..Default::default()
        }
    }

    pub fn hub_config(&self) -> HubConfig {
        HubConfig {
            // Bounded by the parser.
            capacity: usize::try_from(self.event_capacity)
                .unwrap_or(signpost::broadcast::DEFAULT_CAPACITY),
        }
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            body_limit: self.body_limit,
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.database == IN_MEMORY
    }
}

/// Settings for the HTTP layer itself.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub body_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }
}
