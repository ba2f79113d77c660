use finbot::{advice, api::start_server, Settings};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = Settings::from_env()?;

    info!("🚀 FinBot - API Server");
    info!("📍 Port: {}", settings.port);

    let router = settings.build_router()?;
    advice::log_configuration(router.advice());

    info!("✅ Handlers initialized");
    info!("📡 Starting API server...");

    start_server(Arc::new(router), settings.port).await?;

    Ok(())
}
