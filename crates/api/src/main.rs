use anyhow::{Context, Result};
use tracing::info;

use validvouch_api::{app, config, middleware};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = config::Config::load().context("loading configuration")?;
    middleware::logging::init_logging(&config.logging);
    middleware::init_metrics().context("installing metrics recorder")?;

    info!("Starting ValidVouch API v{}", env!("CARGO_PKG_VERSION"));

    let pool = persistence::db::create_pool(&(&config.database).into())
        .await
        .context("connecting to the database")?;

    info!("Running database migrations...");
    persistence::db::run_migrations(&pool)
        .await
        .context("running migrations")?;
    info!("Migrations completed");

    let addr = config.socket_addr().context("invalid server address")?;
    let app = app::create_app(config, pool).context("building application")?;

    info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
