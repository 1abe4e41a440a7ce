//! Users and job applications.
//!
//! Registration, authentication and password changes live in the auth
//! layer; nothing here reads or returns the `password` column.

use super::job;
use crate::client::GenericClient;
use crate::error::{JoblyError, JoblyResult};
use crate::query::query;
use crate::row::{FromRow, RowExt};
use crate::sql::{ColumnMap, build_set_clause};
use crate::value::FieldMap;
use serde::Serialize;
use tokio_postgres::Row;

/// Field names accepted by [`update`] that differ from their column.
pub const UPDATE_COLUMNS: ColumnMap<'static> = ColumnMap::new(&[
    ("firstName", "first_name"),
    ("lastName", "last_name"),
    ("isAdmin", "is_admin"),
]);

const COLUMNS: &str = "username, first_name, last_name, email, is_admin";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_admin: bool,
}

impl FromRow for User {
    fn from_row(row: &Row) -> JoblyResult<Self> {
        Ok(Self {
            username: row.try_get_column("username")?,
            first_name: row.try_get_column("first_name")?,
            last_name: row.try_get_column("last_name")?,
            email: row.try_get_column("email")?,
            is_admin: row.try_get_column("is_admin")?,
        })
    }
}

/// A user with the ids of the jobs they applied to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserDetail {
    #[serde(flatten)]
    pub user: User,
    pub jobs: Vec<i32>,
}

/// Every user, ordered by username.
pub async fn find_all(conn: &impl GenericClient) -> JoblyResult<Vec<User>> {
    query(format!("SELECT {COLUMNS} FROM users ORDER BY username"))
        .tag("user.find_all")
        .fetch_all_as(conn)
        .await
}

pub async fn get(conn: &impl GenericClient, username: &str) -> JoblyResult<UserDetail> {
    let user: User = query(format!("SELECT {COLUMNS} FROM users WHERE username = $1"))
        .bind(username.to_string())
        .tag("user.get")
        .fetch_opt_as(conn)
        .await?
        .ok_or_else(|| JoblyError::not_found(format!("No user: {username}")))?;

    let jobs = job::find_all_jobs_user_has_applied_to(conn, username).await?;
    Ok(UserDetail { user, jobs })
}

/// Update some fields of a user.
///
/// `data` may hold `firstName`, `lastName`, `email` and `isAdmin`.
/// Empty `data` is a [`JoblyError::Validation`].
pub async fn update(
    conn: &impl GenericClient,
    username: &str,
    data: &FieldMap,
) -> JoblyResult<User> {
    let set = build_set_clause(data, &UPDATE_COLUMNS)?;
    let idx = set.next_placeholder();

    query(format!(
        "UPDATE users SET {} WHERE username = ${idx} RETURNING {COLUMNS}",
        set.clause
    ))
    .bind_all(set.values)
    .bind(username.to_string())
    .tag("user.update")
    .fetch_opt_as(conn)
    .await?
    .ok_or_else(|| JoblyError::not_found(format!("No user: {username}")))
}

pub async fn remove(conn: &impl GenericClient, username: &str) -> JoblyResult<()> {
    let deleted = query("DELETE FROM users WHERE username = $1")
        .bind(username.to_string())
        .tag("user.remove")
        .execute(conn)
        .await?;
    if deleted == 0 {
        return Err(JoblyError::not_found(format!("No user: {username}")));
    }
    Ok(())
}

/// Record that `username` applied to job `job_id`.
///
/// A missing job or user is [`JoblyError::NotFound`]; applying twice is a
/// [`JoblyError::Duplicate`].
pub async fn apply_to_job(
    conn: &impl GenericClient,
    username: &str,
    job_id: i32,
) -> JoblyResult<()> {
    query("SELECT id FROM jobs WHERE id = $1")
        .bind(job_id)
        .tag("user.apply.job")
        .fetch_opt(conn)
        .await?
        .ok_or_else(|| JoblyError::not_found(format!("No job: {job_id}")))?;

    query("SELECT username FROM users WHERE username = $1")
        .bind(username.to_string())
        .tag("user.apply.user")
        .fetch_opt(conn)
        .await?
        .ok_or_else(|| JoblyError::not_found(format!("No username: {username}")))?;

    query("INSERT INTO applications (job_id, username) VALUES ($1, $2)")
        .bind(job_id)
        .bind(username.to_string())
        .tag("user.apply")
        .execute(conn)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn user_detail_serializes_flat() {
        let detail = UserDetail {
            user: User {
                username: "u1".into(),
                first_name: "U1F".into(),
                last_name: "U1L".into(),
                email: "user1@user.com".into(),
                is_admin: false,
            },
            jobs: vec![1, 2],
        };
        assert_eq!(
            serde_json::to_value(&detail).unwrap(),
            json!({
                "username": "u1",
                "firstName": "U1F",
                "lastName": "U1L",
                "email": "user1@user.com",
                "isAdmin": false,
                "jobs": [1, 2],
            })
        );
    }

    #[test]
    fn update_columns() {
        assert_eq!(UPDATE_COLUMNS.resolve("isAdmin"), "is_admin");
        assert_eq!(UPDATE_COLUMNS.resolve("email"), "email");
    }
}
