use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Args;

use crate::config::AppConfig;
use crate::external::CloudinaryHost;
use crate::AppState;

#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    #[arg(long, help = "Port to listen on (overrides PORT)")]
    pub port: Option<u16>,

    #[arg(long, help = "Use the in-memory store even when DATABASE_URL is set")]
    pub memory: bool,
}

pub async fn handle(args: ServeArgs) -> anyhow::Result<()> {
    let mut config = AppConfig::from_env();
    if let Some(port) = args.port {
        config.server.port = port;
    }

    if config.security.jwt_secret.trim().is_empty() {
        bail!("JWT_SECRET must be set in {:?}", config.environment);
    }
    if config.is_production() && config.database.url.is_none() {
        bail!("DATABASE_URL must be set in production");
    }

    tracing::info!("Starting TenantHub API in {:?} mode", config.environment);

    let store = super::open_store(&config, args.memory).await?;
    let media_host = Arc::new(CloudinaryHost::new(config.media.clone()));
    let port = config.server.port;
    let app = crate::app(AppState::new(config, store, media_host));

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Listening on http://{}", bind_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
