// folio-api server entry point.
// Parses configuration, installs logging and serves the router until Ctrl-C.

use std::net::SocketAddr;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use folio_api::{Config, Result, router};

fn init_tracing(verbose: bool) {
    let default = if verbose { "folio_api=debug" } else { "folio_api=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
    }
    info!("shutting down");
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();
    init_tracing(config.verbose);

    let state = config.app_state()?;
    if state.github.settings().account.is_none() {
        warn!("GITHUB_USERNAME is not set, GitHub endpoints will fail");
    }

    let listener = TcpListener::bind(config.bind).await?;
    info!(addr = %config.bind, "listening");

    axum::serve(
        listener,
        router(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}
