//! # Signpost Server
//!
//! HTTP front end for the Signpost registry.
//!
//! ## Key Types
//!
//! - [`Cli`] - Command-line and environment configuration
//! - [`AppState`] - Shared handler state around the served registry
//! - [`ApiError`] - Registry errors and extractor rejections mapped to HTTP responses
//!
//! ## Usage
//!
//! ```rust,no_run
//! use signpost::broadcast::{Hub, HubConfig};
//! use signpost::store::SqliteStore;
//! use signpost::{Registry, RegistryConfig};
//! use signpost_server::{app, ServerConfig};
//!
//! async fn example() {
//!     let registry = Registry::new(
//!         b"secret",
//!         SqliteStore::open("signpost.db").unwrap(),
//!         Hub::new(HubConfig::default()),
//!         RegistryConfig::default(),
//!     );
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await.unwrap();
//!     axum::serve(listener, app(registry, &ServerConfig::default())).await.unwrap();
//! }
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod events;
pub mod extract;
pub mod routes;
pub mod state;

pub use auth::{AuthUser, Authenticated, AUTH_USER_HEADER, TOKEN_HEADER};
pub use config::{Cli, ServerConfig, DEFAULT_BODY_LIMIT, IN_MEMORY};
pub use error::{ApiError, ApiResult};
pub use extract::{ApiJson, ApiPath};
pub use state::{AppState, ServedRegistry};

use axum::Router;

/// Build the router serving `registry`.
pub fn app(registry: ServedRegistry, config: &ServerConfig) -> Router {
    routes::router(AppState::new(registry), config)
}
