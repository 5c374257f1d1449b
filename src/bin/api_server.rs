// API Server Binary Entry Point
//
// Usage: cargo run --bin api_server
// Configuration via OSSL_DATA (snapshot path) and PORT.

use soil_carbon_api::{create_router, AppState};
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing (structured logging)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                // Default log level: info for our crate, warn for others
                "soil_carbon_api=info,tower_http=debug,axum=debug,warn".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Soil Carbon API server...");

    // Configuration from environment variables
    let data_path =
        std::env::var("OSSL_DATA").unwrap_or_else(|_| "data/ossl_soc.parquet".to_string());

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8000);

    tracing::info!("Configuration:");
    tracing::info!("  OSSL_DATA: {}", data_path);
    tracing::info!("  PORT: {}", port);

    // Load the dataset; a corrupt or missing snapshot is fatal at boot
    let state = AppState::new(&data_path)?;

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
