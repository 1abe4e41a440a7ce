//! # jobly
//!
//! PostgreSQL data layer for a job board: companies, the jobs they post, and
//! the users who apply to them.
//!
//! ## Features
//!
//! - **Partial updates**: [`sql::build_set_clause`] turns a map of changed
//!   fields into a `SET` list with numbered placeholders
//! - **Search filters**: [`sql::build_filter_clause`] turns search filters into
//!   a `WHERE` condition list driven by a declarative rule table
//! - **Validated input**: [`input`] checks request bodies and query strings
//!   against field schemas before anything reaches SQL
//! - **Transaction-friendly**: models take any [`GenericClient`], so a pooled
//!   connection and a transaction are interchangeable
//!
//! ## Example
//!
//! ```ignore
//! use jobly::{DbConfig, input, job};
//!
//! let pool = DbConfig::from_env()?.create_pool()?;
//! let client = pool.get().await?;
//!
//! let filters = input::parse_job_filter("title=des&minSalary=70000&hasEquity=true")?;
//! let jobs = job::find_all_with_filters(&client, &filters).await?;
//!
//! let data = input::validate_body(&serde_json::json!({"salary": 90000}), input::JOB_UPDATE)?;
//! let job = job::update(&client, jobs[0].id, &data).await?;
//! ```
//!
//! SQL statements are logged at `debug` on the `jobly.sql` target.

pub mod changeset;
pub mod client;
pub mod config;
pub mod error;
pub mod input;
pub mod models;
pub mod query;
pub mod row;
pub mod sql;
pub mod validate;
pub mod value;

pub use changeset::{ValidationCode, ValidationError, ValidationErrors};
pub use client::GenericClient;
pub use config::{DbConfig, RunEnv};
pub use error::{JoblyError, JoblyResult};
pub use models::{
    Company, CompanyDetail, Job, JobSummary, NewCompany, NewJob, User, UserDetail, company, job,
    user,
};
pub use query::{Query, query};
pub use row::{FromRow, RowExt};
pub use sql::{ColumnMap, SetClause, WhereClause, build_filter_clause, build_set_clause};
pub use value::{FieldMap, SqlValue};

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(feature = "pool")]
pub use pool::{create_pool, create_pool_with_config};

#[cfg(feature = "migrate")]
pub mod migrate;
