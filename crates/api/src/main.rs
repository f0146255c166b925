use std::sync::Arc;

use anyhow::Context;

use stockroom_api::app::{AppServices, build_app};
use stockroom_api::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    stockroom_observability::init();

    let config = AppConfig::from_env();
    let services = Arc::new(AppServices::open(&config).context("failed to open warehouse store")?);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(
        addr = %config.bind_addr,
        data_file = ?config.data_file,
        "listening"
    );

    axum::serve(listener, build_app(Arc::clone(&services)))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for shutdown signal");
            }
            tracing::info!("shutdown requested");
        })
        .await
        .context("server error")?;

    services.store().close().context("failed to flush snapshot on shutdown")?;
    Ok(())
}
