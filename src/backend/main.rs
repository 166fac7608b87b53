/**
 * Threadline Server Entry Point
 *
 * Loads `.env`, initializes tracing, reads the gateway configuration and
 * serves the router until Ctrl-C.
 */

#[cfg(feature = "ssr")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use threadline::backend::server::{create_app, GatewayConfig};

    // Load environment variables from .env file if present
    dotenv::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&env_filter))
        .init();

    tracing::info!("[Server] Starting, RUST_LOG={}", env_filter);

    let config = GatewayConfig::from_env()?;
    let addr = format!("{}:{}", config.host, config.port);

    let app = create_app(config).await;

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("[Server] Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("[Server] Shut down");
    Ok(())
}

#[cfg(feature = "ssr")]
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("[Server] Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("[Server] Shutdown signal received");
}

#[cfg(not(feature = "ssr"))]
fn main() {
    eprintln!("Server requires the 'ssr' feature to be enabled.");
    eprintln!("Run with: cargo run --bin threadline-server --features ssr");
    std::process::exit(1);
}
