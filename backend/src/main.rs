use anyhow::Result;
use tasks_backend::config::Config;
use tasks_backend::{app, Database};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("tasks_backend=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env().map_err(|e| {
        error!("Configuration error: {}", e);
        e
    })?;

    info!(
        addr = %config.listen_addr,
        database_url = %config.database_url,
        max_connections = config.max_connections,
        "Configuration loaded"
    );

    let db = Database::connect(&config.database_url, config.max_connections).await?;
    info!("Running database migrations...");
    db.migrate().await?;
    info!("Migrations completed");

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    info!("Server running on http://{}", listener.local_addr()?);

    axum::serve(listener, app(db.clone()))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down...");
}
