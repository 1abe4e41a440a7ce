//! Database configuration loaded from the environment.
//!
//! | variable            | meaning                                  | default                    |
//! |---------------------|------------------------------------------|----------------------------|
//! | `JOBLY_ENV`         | `test` selects the test database         | development                |
//! | `DATABASE_URL`      | connection URL                           | `postgresql:///jobly`      |
//! | `TEST_DATABASE_URL` | connection URL when `JOBLY_ENV=test`     | `postgresql:///jobly_test` |
//! | `JOBLY_POOL_SIZE`   | maximum pooled connections               | 16                         |
//!
//! A `.env` file in the working directory is loaded first via `dotenvy`.

use crate::error::{JoblyError, JoblyResult};

pub const DEFAULT_DATABASE_URL: &str = "postgresql:///jobly";
pub const DEFAULT_TEST_DATABASE_URL: &str = "postgresql:///jobly_test";
/// Default maximum number of pooled connections.
pub const DEFAULT_POOL_SIZE: usize = 16;

/// Which database the process talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunEnv {
    #[default]
    Development,
    Test,
}

impl RunEnv {
    fn from_name(name: Option<&str>) -> Self {
        match name {
            Some("test") => Self::Test,
            _ => Self::Development,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Test => "test",
        }
    }

    pub fn is_test(&self) -> bool {
        matches!(self, Self::Test)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub database_url: String,
    pub max_pool_size: usize,
    pub env: RunEnv,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_pool_size: DEFAULT_POOL_SIZE,
            env: RunEnv::Development,
        }
    }
}

impl DbConfig {
    /// Load `.env` (if present) and read the process environment.
    pub fn from_env() -> JoblyResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> JoblyResult<Self> {
        let env = RunEnv::from_name(lookup("JOBLY_ENV").as_deref());

        let database_url = match env {
            RunEnv::Test => lookup("TEST_DATABASE_URL")
                .unwrap_or_else(|| DEFAULT_TEST_DATABASE_URL.to_string()),
            RunEnv::Development => {
                lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string())
            }
        };

        let max_pool_size = match lookup("JOBLY_POOL_SIZE") {
            None => DEFAULT_POOL_SIZE,
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(JoblyError::Config(format!(
                        "JOBLY_POOL_SIZE must be a positive integer, got '{raw}'"
                    )));
                }
            },
        };

        tracing::debug!(
            target: "jobly.db",
            env = env.as_str(),
            max_pool_size,
            "database config loaded"
        );

        Ok(Self {
            database_url,
            max_pool_size,
            env,
        })
    }

    /// Create a connection pool for this configuration.
    #[cfg(feature = "pool")]
    pub fn create_pool(&self) -> JoblyResult<deadpool_postgres::Pool> {
        crate::pool::create_pool_with_config(&self.database_url, self.max_pool_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let cfg = DbConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg, DbConfig::default());
        assert_eq!(cfg.database_url, "postgresql:///jobly");
    }

    #[test]
    fn database_url_is_read() {
        let cfg = DbConfig::from_lookup(lookup(&[(
            "DATABASE_URL",
            "postgres://app@db.internal/jobly",
        )]))
        .unwrap();
        assert_eq!(cfg.database_url, "postgres://app@db.internal/jobly");
        assert_eq!(cfg.env, RunEnv::Development);
    }

    #[test]
    fn test_env_selects_test_database() {
        let cfg = DbConfig::from_lookup(lookup(&[
            ("JOBLY_ENV", "test"),
            ("DATABASE_URL", "postgres://localhost/jobly"),
        ]))
        .unwrap();
        assert!(cfg.env.is_test());
        assert_eq!(cfg.database_url, "postgresql:///jobly_test");

        let cfg = DbConfig::from_lookup(lookup(&[
            ("JOBLY_ENV", "test"),
            ("TEST_DATABASE_URL", "postgres://localhost/other_test"),
        ]))
        .unwrap();
        assert_eq!(cfg.database_url, "postgres://localhost/other_test");
    }

    #[test]
    fn pool_size() {
        let cfg = DbConfig::from_lookup(lookup(&[("JOBLY_POOL_SIZE", "4")])).unwrap();
        assert_eq!(cfg.max_pool_size, 4);

        for bad in ["lots", "0", "-1"] {
            let err = DbConfig::from_lookup(lookup(&[("JOBLY_POOL_SIZE", bad)])).unwrap_err();
            assert!(matches!(err, JoblyError::Config(_)), "{bad}");
            assert_eq!(err.status_code(), 500);
        }
    }

    #[cfg(feature = "pool")]
    #[test]
    fn create_pool_does_not_connect() {
        let cfg = DbConfig {
            database_url: "postgres://nobody@127.0.0.1:1/jobly".to_string(),
            max_pool_size: 2,
            env: RunEnv::Development,
        };
        let pool = cfg.create_pool().unwrap();
        assert_eq!(pool.status().max_size, 2);
    }

    #[cfg(feature = "pool")]
    #[test]
    fn create_pool_rejects_bad_url() {
        let cfg = DbConfig {
            database_url: "postgres://host:notaport/db".to_string(),
            ..DbConfig::default()
        };
        assert!(matches!(cfg.create_pool(), Err(JoblyError::Connection(_))));
    }
}
