use anyhow::{bail, Context};
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use signpost::broadcast::Hub;
use signpost::store::SqliteStore;
use signpost::Registry;
use signpost_server::{app, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if cli.secret.is_empty() {
        bail!("the token secret must not be empty");
    }

    let store = if cli.is_in_memory() {
        tracing::warn!("using an in-memory database; records are lost on exit");
        SqliteStore::open_memory()?
    } else {
        SqliteStore::open(&cli.database)
            .with_context(|| format!("opening database {}", cli.database))?
    };

    let registry = Registry::new(
        cli.secret.as_bytes(),
        store,
        Hub::new(cli.hub_config()),
        cli.registry_config(),
    );
    let router = app(registry, &cli.server_config());

    let listener = tokio::net::TcpListener::bind(cli.listen)
        .await
        .with_context(|| format!("binding {}", cli.listen))?;
    tracing::info!(addr = %cli.listen, database = %cli.database, "signpost listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("signpost stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
