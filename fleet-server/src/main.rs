use anyhow::Context;
use fleet_server::db::DbService;
use fleet_server::routes::build_app;
use fleet_server::utils::logger::{DEFAULT_FILTER, init_logger};
use fleet_server::{AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Environment and logging
    dotenvy::dotenv().ok();
    let config = Config::from_env().map_err(|e| anyhow::anyhow!("Invalid configuration: {e}"))?;
    init_logger(DEFAULT_FILTER, config.log_format == "json")?;

    tracing::info!(
        environment = %config.environment,
        database = %config.database_path,
        "Fleet server starting"
    );

    // 2. Database and shared state
    let db = DbService::new(&config.database_path)
        .await
        .context("Failed to open the database")?;
    let addr = format!("0.0.0.0:{}", config.http_port);
    let state = AppState::new(db.pool, config);

    // 3. HTTP
    let app = build_app(&state).with_state(state);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!(%addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    tracing::info!("Fleet server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
