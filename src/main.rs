use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use quark_relay::config::Config;
use quark_relay::routes;
use quark_relay::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;
    let state = Arc::new(AppState::from_config(&config)?);

    if let Some(ttl) = config.audio_ttl {
        tracing::info!(ttl_secs = ttl.as_secs(), "audio cleanup enabled");
        state.audio().clone().spawn_sweeper(ttl);
    }

    let app = routes::create_router().with_state(state);

    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!(%addr, model = %config.model, "quark relay listening");
    axum::serve(listener, app).await?;
    Ok(())
}
