use std::time::Duration;

use diesel::{ConnectionError, ConnectionResult, SqliteConnection};
use diesel_async::pooled_connection::bb8::Pool;
use diesel_async::pooled_connection::{AsyncDieselConnectionManager, ManagerConfig, PoolError};
use diesel_async::sync_connection_wrapper::SyncConnectionWrapper;
use diesel_async::{AsyncConnection, SimpleAsyncConnection};
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use thiserror::Error;

use crate::config::DatabaseConfig;

pub type SqliteConn = SyncConnectionWrapper<SqliteConnection>;
pub type DbPool = Pool<SqliteConn>;

const SCHEMA_SQL: &str = include_str!("../migrations/2024-05-02-090000_create_customer/up.sql");

// Writers wait for each other instead of failing with "database is locked".
const CONNECTION_PRAGMAS: &str = "PRAGMA busy_timeout = 5000; PRAGMA foreign_keys = ON;";

const CONNECTION_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum DbSetupError {
    #[error("failed to build connection pool: {0}")]
    Pool(#[from] PoolError),
    #[error("failed to check out a connection: {0}")]
    Checkout(String),
    #[error("failed to apply schema: {0}")]
    Schema(#[from] diesel::result::Error),
}

#[tracing::instrument(name = "database_pool_setup", skip(config), fields(url = %config.url))]
pub async fn establish_pool(config: &DatabaseConfig) -> Result<DbPool, DbSetupError> {
    tracing::debug!("Initializing database connection pool");

    let mut manager_config = ManagerConfig::default();
    manager_config.custom_setup = Box::new(establish_connection);
    let manager =
        AsyncDieselConnectionManager::<SqliteConn>::new_with_config(&config.url, manager_config);

    let pool = Pool::builder()
        .max_size(config.pool_size)
        .connection_timeout(CONNECTION_TIMEOUT)
        .build(manager)
        .await?;

    tracing::info!(
        max_size = config.pool_size,
        connection_timeout_secs = CONNECTION_TIMEOUT.as_secs(),
        "Database connection pool established"
    );

    Ok(pool)
}

/// Creates the customer table when it does not exist yet.
#[tracing::instrument(name = "database_schema_bootstrap", skip(pool))]
pub async fn bootstrap_schema(pool: &DbPool) -> Result<(), DbSetupError> {
    let mut conn = pool
        .get()
        .await
        .map_err(|err| DbSetupError::Checkout(err.to_string()))?;

    conn.batch_execute(SCHEMA_SQL).await?;

    tracing::debug!("Database schema ready");
    Ok(())
}

fn establish_connection(url: &str) -> BoxFuture<'_, ConnectionResult<SqliteConn>> {
    async move {
        let mut conn = SqliteConn::establish(url).await?;
        conn.batch_execute(CONNECTION_PRAGMAS)
            .await
            .map_err(ConnectionError::CouldntSetupConfiguration)?;
        Ok(conn)
    }
    .boxed()
}
