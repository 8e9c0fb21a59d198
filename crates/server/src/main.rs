use anyhow::Context as _;
use server::config::ServerConfig;
use server::{AppState, routes};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // reqwest is built without a bundled crypto provider
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
    utils::logging::init_tracing();

    let config = ServerConfig::from_env();
    let state = AppState::from_config(&config)?;
    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("bind {}", config.bind_addr))?;
    let addr = listener.local_addr().context("read bound address")?;
    tracing::info!(%addr, "embedding proxy listening");

    axum::serve(listener, app).await.context("serve")?;
    Ok(())
}
