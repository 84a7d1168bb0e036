mod config;
mod db;
mod error_mapping;
mod errors;
mod extract;
mod logging;
mod models;
mod persistence;
mod routes;
mod schema;
mod validation;

use axum::serve;
use config::AppConfig;
use routes::create_app;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_tracing();

    let config = AppConfig::from_env()?;

    let pool = db::establish_pool(&config.database).await?;
    db::bootstrap_schema(&pool).await?;

    let app = create_app(pool);

    let listener = TcpListener::bind(config.listen_addr).await?;
    tracing::info!(
        addr = %config.listen_addr,
        database = %config.database.url,
        "Customers API listening"
    );

    serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
