//! Jobs.

use crate::client::GenericClient;
use crate::error::{JoblyError, JoblyResult};
use crate::input::{self, JOB_FILTER, JOB_NEW};
use crate::query::query;
use crate::row::{FromRow, RowExt, column_values};
use crate::sql::{ColumnMap, WhereClause, build_filter_clause, build_set_clause};
use crate::value::FieldMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;

/// Field names accepted by [`update`] that differ from their column.
pub const UPDATE_COLUMNS: ColumnMap<'static> =
    ColumnMap::new(&[("companyHandle", "company_handle")]);

/// Filter names accepted by [`find_all_with_filters`] that compare against a column.
pub const FILTER_COLUMNS: ColumnMap<'static> = ColumnMap::new(&[
    ("minSalary", "salary"),
    ("maxSalary", "salary"),
    ("hasEquity", "equity"),
]);

const COLUMNS: &str = "id, title, salary, equity, company_handle";

/// A job posting. `equity` serializes as a decimal string (`"0.075"`).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

impl FromRow for Job {
    fn from_row(row: &Row) -> JoblyResult<Self> {
        Ok(Self {
            id: row.try_get_column("id")?,
            title: row.try_get_column("title")?,
            salary: row.try_get_column("salary")?,
            equity: row.try_get_column("equity")?,
            company_handle: row.try_get_column("company_handle")?,
        })
    }
}

/// A job listed under its company.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobSummary {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
}

impl FromRow for JobSummary {
    fn from_row(row: &Row) -> JoblyResult<Self> {
        Ok(Self {
            id: row.try_get_column("id")?,
            title: row.try_get_column("title")?,
            salary: row.try_get_column("salary")?,
            equity: row.try_get_column("equity")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewJob {
    pub title: String,
    #[serde(default)]
    pub salary: Option<i32>,
    #[serde(default)]
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

impl NewJob {
    /// Validate a `POST /jobs` body against [`JOB_NEW`].
    pub fn from_json(body: &serde_json::Value) -> JoblyResult<Self> {
        input::validate_body(body, JOB_NEW)?;
        super::from_validated(body)
    }
}

/// Create a job.
///
/// A job with the same title at the same company is a
/// [`JoblyError::Duplicate`]; an unknown company is a
/// [`JoblyError::ForeignKeyViolation`].
pub async fn create(conn: &impl GenericClient, data: &NewJob) -> JoblyResult<Job> {
    let existing = query("SELECT id FROM jobs WHERE title = $1 AND company_handle = $2")
        .bind(data.title.clone())
        .bind(data.company_handle.clone())
        .tag("job.create.check")
        .fetch_opt(conn)
        .await?;
    if existing.is_some() {
        return Err(JoblyError::duplicate(format!(
            "Duplicate job: {} at {}",
            data.title, data.company_handle
        )));
    }

    query(format!(
        "INSERT INTO jobs (title, salary, equity, company_handle) \
         VALUES ($1, $2, $3, $4) RETURNING {COLUMNS}"
    ))
    .bind(data.title.clone())
    .bind(data.salary)
    .bind(data.equity)
    .bind(data.company_handle.clone())
    .tag("job.create")
    .fetch_one_as(conn)
    .await
}

/// Every job, ordered by title.
pub async fn find_all(conn: &impl GenericClient) -> JoblyResult<Vec<Job>> {
    query(format!("SELECT {COLUMNS} FROM jobs ORDER BY title"))
        .tag("job.find_all")
        .fetch_all_as(conn)
        .await
}

fn search_clause(filters: &FieldMap) -> JoblyResult<WhereClause> {
    build_filter_clause(&super::scoped_filters(filters, JOB_FILTER), &FILTER_COLUMNS)
}

/// Jobs matching `filters`, ordered by title.
///
/// Accepts `title` (case-insensitive substring), `minSalary`, `maxSalary`
/// and `hasEquity`; other filter names are ignored. `hasEquity` other than
/// `true` does not filter.
pub async fn find_all_with_filters(
    conn: &impl GenericClient,
    filters: &FieldMap,
) -> JoblyResult<Vec<Job>> {
    let filter = search_clause(filters)?;
    query(format!(
        "SELECT {COLUMNS} FROM jobs{} ORDER BY title",
        filter.to_where_sql()
    ))
    .bind_all(filter.values)
    .tag("job.find_all_with_filters")
    .fetch_all_as(conn)
    .await
}

pub async fn get(conn: &impl GenericClient, id: i32) -> JoblyResult<Job> {
    query(format!("SELECT {COLUMNS} FROM jobs WHERE id = $1"))
        .bind(id)
        .tag("job.get")
        .fetch_opt_as(conn)
        .await?
        .ok_or_else(|| JoblyError::not_found(format!("No job: {id}")))
}

/// Update some fields of a job.
///
/// Empty `data` is a [`JoblyError::Validation`].
pub async fn update(conn: &impl GenericClient, id: i32, data: &FieldMap) -> JoblyResult<Job> {
    let set = build_set_clause(data, &UPDATE_COLUMNS)?;
    let idx = set.next_placeholder();

    query(format!(
        "UPDATE jobs SET {} WHERE id = ${idx} RETURNING {COLUMNS}",
        set.clause
    ))
    .bind_all(set.values)
    .bind(id)
    .tag("job.update")
    .fetch_opt_as(conn)
    .await?
    .ok_or_else(|| JoblyError::not_found(format!("No job: {id}")))
}

pub async fn remove(conn: &impl GenericClient, id: i32) -> JoblyResult<()> {
    let deleted = query("DELETE FROM jobs WHERE id = $1")
        .bind(id)
        .tag("job.remove")
        .execute(conn)
        .await?;
    if deleted == 0 {
        return Err(JoblyError::not_found(format!("No job: {id}")));
    }
    Ok(())
}

/// Ids of the jobs `username` has applied to, ascending.
///
/// An unknown user simply has no applications.
pub async fn find_all_jobs_user_has_applied_to(
    conn: &impl GenericClient,
    username: &str,
) -> JoblyResult<Vec<i32>> {
    let rows = query("SELECT job_id FROM applications WHERE username = $1 ORDER BY job_id")
        .bind(username.to_string())
        .tag("job.applied_by_user")
        .fetch_all(conn)
        .await?;
    column_values(&rows, "job_id")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    #[test]
    fn new_job_from_json() {
        let body = json!({
            "title": "Software Developer",
            "salary": 100000,
            "equity": 0.075,
            "companyHandle": "c3",
        });
        let job = NewJob::from_json(&body).unwrap();
        assert_eq!(job.title, "Software Developer");
        assert_eq!(job.salary, Some(100000));
        assert_eq!(job.equity, Some(Decimal::from_str("0.075").unwrap()));
        assert_eq!(job.company_handle, "c3");
    }

    #[test]
    fn new_job_requires_company() {
        let err = NewJob::from_json(&json!({"title": "t"})).unwrap_err();
        assert!(matches!(err, JoblyError::Invalid(_)));
    }

    #[test]
    fn new_job_rejects_string_salary() {
        let body = json!({"title": "t", "salary": "10000", "companyHandle": "c1"});
        assert!(NewJob::from_json(&body).is_err());
    }

    #[test]
    fn job_serializes_equity_as_string() {
        let job = Job {
            id: 2,
            title: "designer".into(),
            salary: Some(85000),
            equity: Some(Decimal::from_str("0.05").unwrap()),
            company_handle: "c2".into(),
        };
        assert_eq!(
            serde_json::to_value(&job).unwrap(),
            json!({
                "id": 2,
                "title": "designer",
                "salary": 85000,
                "equity": "0.05",
                "companyHandle": "c2",
            })
        );
    }

    #[test]
    fn search_ignores_company_filters() {
        let filters = FieldMap::new()
            .with("name", "net")
            .with("maxEmployees", "50")
            .with("title", "des")
            .with("hasEquity", "true");

        let w = search_clause(&filters).unwrap();
        assert_eq!(w.to_where_sql(), " WHERE title ILIKE $1 AND equity > $2");
    }

    #[test]
    fn column_maps() {
        assert_eq!(UPDATE_COLUMNS.resolve("companyHandle"), "company_handle");
        assert_eq!(FILTER_COLUMNS.resolve("hasEquity"), "equity");
        assert_eq!(FILTER_COLUMNS.resolve("minSalary"), "salary");
    }
}
