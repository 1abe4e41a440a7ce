//! Companies.

use super::JobSummary;
use crate::client::GenericClient;
use crate::error::{JoblyError, JoblyResult};
use crate::input::{self, COMPANY_FILTER, COMPANY_NEW};
use crate::query::query;
use crate::row::{FromRow, RowExt};
use crate::sql::{ColumnMap, WhereClause, build_filter_clause, build_set_clause};
use crate::value::FieldMap;
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;

/// Field names accepted by [`update`] that differ from their column.
pub const UPDATE_COLUMNS: ColumnMap<'static> = ColumnMap::new(&[
    ("numEmployees", "num_employees"),
    ("logoUrl", "logo_url"),
]);

/// Filter names accepted by [`find_all`] that compare against a column.
pub const FILTER_COLUMNS: ColumnMap<'static> = ColumnMap::new(&[
    ("minEmployees", "num_employees"),
    ("maxEmployees", "num_employees"),
]);

const COLUMNS: &str = "handle, name, description, num_employees, logo_url";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub handle: String,
    pub name: String,
    pub description: String,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

impl FromRow for Company {
    fn from_row(row: &Row) -> JoblyResult<Self> {
        Ok(Self {
            handle: row.try_get_column("handle")?,
            name: row.try_get_column("name")?,
            description: row.try_get_column("description")?,
            num_employees: row.try_get_column("num_employees")?,
            logo_url: row.try_get_column("logo_url")?,
        })
    }
}

/// A company together with its jobs, as returned by [`get`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyDetail {
    #[serde(flatten)]
    pub company: Company,
    pub jobs: Vec<JobSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCompany {
    pub handle: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub num_employees: Option<i32>,
    #[serde(default)]
    pub logo_url: Option<String>,
}

impl NewCompany {
    /// Validate a `POST /companies` body against [`COMPANY_NEW`].
    pub fn from_json(body: &serde_json::Value) -> JoblyResult<Self> {
        input::validate_body(body, COMPANY_NEW)?;
        super::from_validated(body)
    }
}

/// Create a company.
///
/// Returns [`JoblyError::Duplicate`] if the handle (or name) is taken.
pub async fn create(conn: &impl GenericClient, data: &NewCompany) -> JoblyResult<Company> {
    let existing = query("SELECT handle FROM companies WHERE handle = $1")
        .bind(data.handle.clone())
        .tag("company.create.check")
        .fetch_opt(conn)
        .await?;
    if existing.is_some() {
        return Err(JoblyError::duplicate(format!(
            "Duplicate company: {}",
            data.handle
        )));
    }

    query(format!(
        "INSERT INTO companies (handle, name, description, num_employees, logo_url) \
         VALUES ($1, $2, $3, $4, $5) RETURNING {COLUMNS}"
    ))
    .bind(data.handle.clone())
    .bind(data.name.clone())
    .bind(data.description.clone())
    .bind(data.num_employees)
    .bind(data.logo_url.clone())
    .tag("company.create")
    .fetch_one_as(conn)
    .await
}

fn search_clause(filters: &FieldMap) -> JoblyResult<WhereClause> {
    build_filter_clause(&super::scoped_filters(filters, COMPANY_FILTER), &FILTER_COLUMNS)
}

/// Find companies matching `filters`, ordered by name.
///
/// Accepts `name` (case-insensitive substring), `minEmployees` and
/// `maxEmployees`; other filter names are ignored. An empty map returns every
/// company.
pub async fn find_all(conn: &impl GenericClient, filters: &FieldMap) -> JoblyResult<Vec<Company>> {
    let filter = search_clause(filters)?;
    query(format!(
        "SELECT {COLUMNS} FROM companies{} ORDER BY name",
        filter.to_where_sql()
    ))
    .bind_all(filter.values)
    .tag("company.find_all")
    .fetch_all_as(conn)
    .await
}

/// Get a company and its jobs.
pub async fn get(conn: &impl GenericClient, handle: &str) -> JoblyResult<CompanyDetail> {
    let company: Company = query(format!("SELECT {COLUMNS} FROM companies WHERE handle = $1"))
        .bind(handle.to_string())
        .tag("company.get")
        .fetch_opt_as(conn)
        .await?
        .ok_or_else(|| JoblyError::not_found(format!("No company: {handle}")))?;

    let jobs = query(
        "SELECT id, title, salary, equity FROM jobs WHERE company_handle = $1 ORDER BY id",
    )
    .bind(handle.to_string())
    .tag("company.get.jobs")
    .fetch_all_as(conn)
    .await?;

    Ok(CompanyDetail { company, jobs })
}

/// Update some fields of a company.
///
/// `data` may hold `name`, `description`, `numEmployees` and `logoUrl`.
/// Empty `data` is a [`JoblyError::Validation`].
pub async fn update(
    conn: &impl GenericClient,
    handle: &str,
    data: &FieldMap,
) -> JoblyResult<Company> {
    let set = build_set_clause(data, &UPDATE_COLUMNS)?;
    let idx = set.next_placeholder();

    query(format!(
        "UPDATE companies SET {} WHERE handle = ${idx} RETURNING {COLUMNS}",
        set.clause
    ))
    .bind_all(set.values)
    .bind(handle.to_string())
    .tag("company.update")
    .fetch_opt_as(conn)
    .await?
    .ok_or_else(|| JoblyError::not_found(format!("No company: {handle}")))
}

/// Delete a company (its jobs go with it).
pub async fn remove(conn: &impl GenericClient, handle: &str) -> JoblyResult<()> {
    let deleted = query("DELETE FROM companies WHERE handle = $1")
        .bind(handle.to_string())
        .tag("company.remove")
        .execute(conn)
        .await?;
    if deleted == 0 {
        return Err(JoblyError::not_found(format!("No company: {handle}")));
    }
    Ok(())
}
