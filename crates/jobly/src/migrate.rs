//! Schema migrations via [`refinery`].
//!
//! The schema ships embedded in the crate (`migrations/V1__jobly_schema.sql`),
//! so a fresh database only needs:
//!
//! ```ignore
//! let pool = DbConfig::from_env()?.create_pool()?;
//! jobly::migrate::run_pool(&pool).await?;
//! ```

use crate::error::JoblyResult;

pub use refinery::{Report, Runner};

mod embedded {
    refinery::embed_migrations!("./migrations");
}

/// SQL of the initial schema migration, for tests that build throwaway schemas.
pub const SCHEMA_SQL: &str = include_str!("../migrations/V1__jobly_schema.sql");

/// A runner over every embedded migration.
pub fn runner() -> Runner {
    embedded::migrations::runner()
}

/// Run pending migrations on a single PostgreSQL connection.
pub async fn run(client: &mut tokio_postgres::Client) -> JoblyResult<Report> {
    let report = runner().run_async(client).await?;
    for migration in report.applied_migrations() {
        tracing::info!(
            target: "jobly.db",
            version = migration.version(),
            name = migration.name(),
            "applied migration"
        );
    }
    Ok(report)
}

/// Acquire a connection from a pool and run migrations on it.
#[cfg(feature = "pool")]
pub async fn run_pool(pool: &deadpool_postgres::Pool) -> JoblyResult<Report> {
    let mut client = pool.get().await?;
    run(&mut client).await
}
