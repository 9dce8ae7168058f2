//! Scopepub HTTP API Server binary

use scopepub_server::{AppState, config::ServerConfig, create_router, error::Result};
use std::net::SocketAddr;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "scopepub_server=debug,tower_http=debug".to_string()),
        )
        .init();

    // Load configuration
    let config = ServerConfig::from_env()?;
    info!(
        "Starting Scopepub Server on {}:{} with data at {}",
        config.host,
        config.port,
        config.data_path.display()
    );

    tokio::fs::create_dir_all(&config.data_path).await?;

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|_| scopepub_server::error::ApiError::Config("Invalid HOST value".to_string()))?;

    let app = create_router(AppState::new(config));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
