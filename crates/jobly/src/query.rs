//! Runner for pre-numbered SQL statements.

use crate::client::GenericClient;
use crate::error::JoblyResult;
use crate::row::FromRow;
use crate::value::SqlValue;
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

/// A SQL statement with its bound parameters.
///
/// Placeholders (`$1..$n`) are written by the caller or produced by the clause
/// builders; parameters are bound in the same order.
///
/// # Example
///
/// ```ignore
/// use jobly::query;
///
/// let job: Job = query("SELECT id, title, salary, equity, company_handle FROM jobs WHERE id = $1")
///     .bind(id)
///     .tag("job.get")
///     .fetch_one_as(&conn)
///     .await?;
/// ```
pub struct Query {
    sql: String,
    params: Vec<Box<dyn ToSql + Sync + Send>>,
    tag: Option<&'static str>,
}

/// Create a new query with the given SQL
pub fn query(sql: impl Into<String>) -> Query {
    Query {
        sql: sql.into(),
        params: Vec::new(),
        tag: None,
    }
}

impl Query {
    /// Bind a parameter to the next placeholder
    pub fn bind<T: ToSql + Sync + Send + 'static>(mut self, value: T) -> Self {
        self.params.push(Box::new(value));
        self
    }

    /// Bind every value of a clause, in order.
    pub fn bind_all(mut self, values: impl IntoIterator<Item = SqlValue>) -> Self {
        for value in values {
            self.params.push(Box::new(value));
        }
        self
    }

    /// Label the statement in log output.
    pub fn tag(mut self, tag: &'static str) -> Self {
        self.tag = Some(tag);
        self
    }

    /// The SQL text.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Number of bound parameters.
    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    fn params(&self) -> Vec<&(dyn ToSql + Sync)> {
        tracing::debug!(
            target: "jobly.sql",
            sql = %self.sql,
            param_count = self.params.len(),
            tag = self.tag.unwrap_or("-"),
            "execute"
        );
        self.params.iter().map(|p| p.as_ref() as _).collect()
    }

    /// Execute the query and return all rows
    pub async fn fetch_all(&self, conn: &impl GenericClient) -> JoblyResult<Vec<Row>> {
        let params = self.params();
        conn.query(&self.sql, &params).await
    }

    /// Execute the query and return all rows mapped to type T
    pub async fn fetch_all_as<T: FromRow>(&self, conn: &impl GenericClient) -> JoblyResult<Vec<T>> {
        let rows = self.fetch_all(conn).await?;
        rows.iter().map(T::from_row).collect()
    }

    /// Execute the query and return exactly one row
    pub async fn fetch_one(&self, conn: &impl GenericClient) -> JoblyResult<Row> {
        let params = self.params();
        conn.query_one(&self.sql, &params).await
    }

    /// Execute the query and return exactly one row mapped to type T
    pub async fn fetch_one_as<T: FromRow>(&self, conn: &impl GenericClient) -> JoblyResult<T> {
        let row = self.fetch_one(conn).await?;
        T::from_row(&row)
    }

    /// Execute the query and return at most one row
    pub async fn fetch_opt(&self, conn: &impl GenericClient) -> JoblyResult<Option<Row>> {
        let params = self.params();
        conn.query_opt(&self.sql, &params).await
    }

    /// Execute the query and return at most one row mapped to type T
    pub async fn fetch_opt_as<T: FromRow>(
        &self,
        conn: &impl GenericClient,
    ) -> JoblyResult<Option<T>> {
        let row = self.fetch_opt(conn).await?;
        row.as_ref().map(T::from_row).transpose()
    }

    /// Execute the query and return the number of affected rows
    pub async fn execute(&self, conn: &impl GenericClient) -> JoblyResult<u64> {
        let params = self.params();
        conn.execute(&self.sql, &params).await
    }
}

impl std::fmt::Debug for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Query")
            .field("sql", &self.sql)
            .field("param_count", &self.params.len())
            .field("tag", &self.tag)
            .finish()
    }
}
