use anyhow::Result;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lukis_core::config::{Config, Lifecycle};
use lukis_core::webhook::{router, AppState, BotProvider};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "lukis=debug,info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("🎨 Lukis starting up...");

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    info!("Configuration loaded");
    info!("  Model: {}", config.gemini_model);
    match config.lifecycle {
        Lifecycle::Startup => info!("  Dispatcher lifecycle: startup (shared clients)"),
        Lifecycle::PerRequest => info!("  Dispatcher lifecycle: per-request"),
    }

    let port = config.http_port;
    let state = AppState::new(BotProvider::from_config(config)?);

    let app = router(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    info!("🎨 Lukis is listening on port {}", port);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    info!("🎨 Lukis has shut down.");
    Ok(())
}
