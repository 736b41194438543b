// FPL assistant entry point.
//
// Startup sequence:
// 1. Initialize tracing
// 2. Load config (copying defaults on first run)
// 3. Construct the upstream and advisory clients
// 4. Serve the HTTP API until shutdown

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::info;

use fpl_assistant::advisory::client::AdvisoryClient;
use fpl_assistant::config;
use fpl_assistant::fpl::client::FplClient;
use fpl_assistant::server;
use fpl_assistant::service::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;
    info!("FPL assistant starting up");

    let config = config::load_config().context("failed to load configuration")?;
    info!(
        upstream = %config.upstream.base_url,
        model = %config.advisory.model,
        port = config.server.port,
        "config loaded"
    );

    let fpl = FplClient::new(
        config.upstream.base_url.clone(),
        Duration::from_secs(config.upstream.timeout_secs),
    );

    let advisory = AdvisoryClient::from_config(&config.advisory, &config.credentials);
    match &advisory {
        AdvisoryClient::Active(_) => info!("advisory client initialized (API key configured)"),
        AdvisoryClient::Disabled => info!("advisory client disabled (no API key)"),
    }

    let state = Arc::new(AppState { fpl, advisory });
    server::serve(state, config.server.port).await
}

fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("fpl_assistant=info,warn")),
        )
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
