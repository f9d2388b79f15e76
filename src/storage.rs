//! Shared `PostgreSQL` plumbing for the Diesel adapters.
//!
//! Diesel connections are synchronous, so adapters run each unit of work on
//! the blocking thread pool via [`tokio::task::spawn_blocking`].

use crate::config::DeskConfig;
use diesel::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool, PoolError, PooledConnection};
use std::time::Duration;
use thiserror::Error;

/// `PostgreSQL` connection pool type shared by all adapters.
pub type PgPool = Pool<ConnectionManager<PgConnection>>;

/// Pooled connection type for adapter internals.
pub(crate) type PooledConn = PooledConnection<ConnectionManager<PgConnection>>;

/// Errors raised while building a connection pool.
#[derive(Debug, Error)]
pub enum StorageSetupError {
    /// The configuration names no database.
    #[error("no database URL configured")]
    MissingDatabaseUrl,

    /// The pool could not be created.
    #[error("failed to build connection pool: {0}")]
    Pool(#[from] PoolError),
}

/// Builds a connection pool from the configured database URL and size.
///
/// # Errors
///
/// Returns [`StorageSetupError::MissingDatabaseUrl`] when no URL is
/// configured, or [`StorageSetupError::Pool`] when the initial connections
/// cannot be established.
pub fn connect_pool(config: &DeskConfig) -> Result<PgPool, StorageSetupError> {
    let url = config
        .database_url
        .as_deref()
        .ok_or(StorageSetupError::MissingDatabaseUrl)?;
    let manager = ConnectionManager::<PgConnection>::new(url);
    let pool = Pool::builder()
        .max_size(config.pool_max_size)
        .build(manager)?;
    tracing::info!(max_size = config.pool_max_size, "database pool ready");
    Ok(pool)
}

/// Runs a blocking task and maps join errors into the caller's error type.
pub(crate) async fn run_blocking_with<F, T, E, M>(f: F, map_err: M) -> Result<T, E>
where
    F: FnOnce() -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
    M: FnOnce(tokio::task::JoinError) -> E,
{
    tokio::task::spawn_blocking(f).await.map_err(map_err)?
}

/// Obtains a connection from the pool with a caller-provided error mapper.
pub(crate) fn get_conn_with<E, M>(pool: &PgPool, map_err: M) -> Result<PooledConn, E>
where
    M: FnOnce(PoolError) -> E,
{
    pool.get().map_err(map_err)
}

/// Obtains a connection, waiting at most `timeout` for one to free up.
pub(crate) fn get_conn_within<E, M>(
    pool: &PgPool,
    timeout: Duration,
    map_err: M,
) -> Result<PooledConn, E>
where
    M: FnOnce(PoolError) -> E,
{
    pool.get_timeout(timeout).map_err(map_err)
}
