//! Connection pool utilities

use crate::config::DEFAULT_POOL_SIZE;
use crate::error::{JoblyError, JoblyResult};
use deadpool_postgres::{Manager, ManagerConfig, Pool, PoolBuilder, RecyclingMethod};
use tokio_postgres::NoTls;

/// Create a connection pool from a database URL.
///
/// Uses `NoTls` and [`DEFAULT_POOL_SIZE`] connections.
///
/// # Example
///
/// ```ignore
/// let pool = jobly::create_pool("postgresql:///jobly")?;
/// let client = pool.get().await?;
/// let companies = jobly::company::find_all(&client, &FieldMap::new()).await?;
/// ```
pub fn create_pool(database_url: &str) -> JoblyResult<Pool> {
    create_pool_with_config(database_url, DEFAULT_POOL_SIZE)
}

/// Create a connection pool with a custom maximum size
pub fn create_pool_with_config(database_url: &str, max_size: usize) -> JoblyResult<Pool> {
    create_pool_with_builder(database_url, |builder| builder.max_size(max_size))
}

/// Create a connection pool, letting the caller tune the `PoolBuilder`.
pub fn create_pool_with_builder(
    database_url: &str,
    configure_pool: impl FnOnce(PoolBuilder) -> PoolBuilder,
) -> JoblyResult<Pool> {
    let pg_config: tokio_postgres::Config = database_url
        .parse()
        .map_err(|e: tokio_postgres::Error| JoblyError::Connection(e.to_string()))?;

    let mgr = Manager::from_config(pg_config, NoTls, default_manager_config());
    configure_pool(Pool::builder(mgr))
        .build()
        .map_err(|e| JoblyError::Pool(e.to_string()))
}

fn default_manager_config() -> ManagerConfig {
    ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    }
}
