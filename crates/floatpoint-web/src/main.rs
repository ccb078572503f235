//! FloatPoint prediction server
//!
//! Run with: cargo run -p floatpoint-web

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use floatpoint_web::{config::Config, router::build_router, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional
    let _ = dotenvy::dotenv();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("floatpoint_web=debug,floatpoint_inference=debug,floatpoint_store=debug,info")
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting FloatPoint server...");

    let config = Config::load()?;
    let bind = config.server.bind.clone();
    let state = AppState::from_config(config)?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("binding {bind}"))?;
    info!("Server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
