//! Model tests against a live database.
//!
//! Skipped unless `DATABASE_URL` is set. Each test builds the schema inside a
//! fresh PostgreSQL schema within one transaction that is never committed.

use jobly::{FieldMap, JoblyError, NewCompany, NewJob, SqlValue, company, input, job, user};
use rust_decimal::Decimal;
use serde_json::json;
use std::str::FromStr;
use tokio_postgres::{Client, NoTls, Transaction};

const SCHEMA_SQL: &str = include_str!("../migrations/V1__jobly_schema.sql");

const SEED_SQL: &str = r#"
INSERT INTO companies (handle, name, num_employees, description, logo_url)
VALUES ('c1', 'C1', 1, 'Desc1', 'http://c1.img'),
       ('c2', 'C2', 2, 'Desc2', 'http://c2.img'),
       ('c3', 'C3', 3, 'Desc3', 'http://c3.img');

INSERT INTO jobs (title, salary, equity, company_handle)
VALUES ('photographer', 65000, 0, 'c1'),
       ('designer', 85000, 0.05, 'c2');

INSERT INTO users (username, password, first_name, last_name, email)
VALUES ('u1', 'not-a-hash', 'U1F', 'U1L', 'u1@email.com'),
       ('u2', 'not-a-hash', 'U2F', 'U2L', 'u2@email.com');

INSERT INTO applications (username, job_id)
VALUES ('u1', 1),
       ('u2', 2);
"#;

async fn try_connect() -> Option<Client> {
    let database_url = std::env::var("DATABASE_URL").ok()?;
    let (client, connection) = tokio_postgres::connect(&database_url, NoTls)
        .await
        .expect("Failed to connect to DATABASE_URL with NoTls");
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            eprintln!("tokio-postgres connection error: {e}");
        }
    });
    Some(client)
}

/// Open a transaction scoped to a throwaway schema holding the seed data.
async fn seeded(client: &mut Client) -> Transaction<'_> {
    let tx = client.transaction().await.expect("begin");
    let schema = format!("jobly_test_{}", uuid::Uuid::new_v4().simple());
    tx.batch_execute(&format!(
        "CREATE SCHEMA {schema}; SET LOCAL search_path TO {schema};"
    ))
    .await
    .expect("schema");
    tx.batch_execute(SCHEMA_SQL).await.expect("migrate");
    tx.batch_execute(SEED_SQL).await.expect("seed");
    tx
}

macro_rules! db {
    ($client:ident, $tx:ident) => {
        let Some(mut $client) = try_connect().await else {
            eprintln!("DATABASE_URL not set; skipping");
            return;
        };
        let $tx = seeded(&mut $client).await;
    };
}

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

// ==================== companies ====================

#[tokio::test]
async fn company_create() {
    db!(client, tx);

    let new = NewCompany::from_json(&json!({
        "handle": "new",
        "name": "New",
        "description": "New Description",
        "numEmployees": 1,
        "logoUrl": "http://new.img",
    }))
    .unwrap();

    let created = company::create(&tx, &new).await.unwrap();
    assert_eq!(created.handle, "new");
    assert_eq!(created.num_employees, Some(1));

    let err = company::create(&tx, &new).await.unwrap_err();
    assert!(matches!(err, JoblyError::Duplicate(_)));
    assert_eq!(err.status_code(), 400);
}

#[tokio::test]
async fn company_find_all_unfiltered_is_sorted_by_name() {
    db!(client, tx);

    let all = company::find_all(&tx, &FieldMap::new()).await.unwrap();
    let handles: Vec<_> = all.iter().map(|c| c.handle.as_str()).collect();
    assert_eq!(handles, ["c1", "c2", "c3"]);
    assert_eq!(all[0].logo_url.as_deref(), Some("http://c1.img"));
}

#[tokio::test]
async fn company_find_all_with_filters() {
    db!(client, tx);

    let filters = input::parse_company_filter("name=c&minEmployees=2&maxEmployees=2").unwrap();
    let found = company::find_all(&tx, &filters).await.unwrap();
    let handles: Vec<_> = found.iter().map(|c| c.handle.as_str()).collect();
    assert_eq!(handles, ["c2"]);

    let filters = FieldMap::new().with("maxEmployees", "1");
    let found = company::find_all(&tx, &filters).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].handle, "c1");

    let filters = FieldMap::new().with("name", "nope");
    assert!(company::find_all(&tx, &filters).await.unwrap().is_empty());
}

#[tokio::test]
async fn company_get_includes_jobs() {
    db!(client, tx);

    let detail = company::get(&tx, "c2").await.unwrap();
    assert_eq!(detail.company.name, "C2");
    assert_eq!(detail.jobs.len(), 1);
    assert_eq!(detail.jobs[0].title, "designer");
    assert_eq!(detail.jobs[0].equity, Some(dec("0.05")));

    let err = company::get(&tx, "nope").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn company_update() {
    db!(client, tx);

    let data = input::validate_body(
        &json!({"name": "New", "numEmployees": 10, "logoUrl": null}),
        input::COMPANY_UPDATE,
    )
    .unwrap();
    let updated = company::update(&tx, "c1", &data).await.unwrap();
    assert_eq!(updated.name, "New");
    assert_eq!(updated.num_employees, Some(10));
    assert_eq!(updated.logo_url, None);
    assert_eq!(updated.description, "Desc1");

    let err = company::update(&tx, "nope", &data).await.unwrap_err();
    assert!(err.is_not_found());

    let err = company::update(&tx, "c1", &FieldMap::new()).await.unwrap_err();
    assert!(matches!(err, JoblyError::Validation(_)));
}

#[tokio::test]
async fn company_remove_cascades_to_jobs() {
    db!(client, tx);

    company::remove(&tx, "c1").await.unwrap();
    assert!(company::get(&tx, "c1").await.unwrap_err().is_not_found());
    assert!(job::get(&tx, 1).await.unwrap_err().is_not_found());

    let err = company::remove(&tx, "c1").await.unwrap_err();
    assert!(err.is_not_found());
}

// ==================== jobs ====================

#[tokio::test]
async fn job_create() {
    db!(client, tx);

    let new = NewJob::from_json(&json!({
        "title": "Software Developer",
        "salary": 100000,
        "equity": 0.075,
        "companyHandle": "c3",
    }))
    .unwrap();

    let created = job::create(&tx, &new).await.unwrap();
    assert_eq!(created.title, "Software Developer");
    assert_eq!(created.company_handle, "c3");
    assert_eq!(serde_json::to_value(&created).unwrap()["equity"], json!("0.075"));

    let err = job::create(&tx, &new).await.unwrap_err();
    assert!(matches!(err, JoblyError::Duplicate(_)));
}

#[tokio::test]
async fn job_create_for_unknown_company() {
    db!(client, tx);

    let new = NewJob {
        title: "t".into(),
        salary: None,
        equity: None,
        company_handle: "nope".into(),
    };
    let err = job::create(&tx, &new).await.unwrap_err();
    assert!(matches!(err, JoblyError::ForeignKeyViolation(_)));
    assert_eq!(err.status_code(), 400);
}

#[tokio::test]
async fn job_find_all_is_sorted_by_title() {
    db!(client, tx);

    let jobs = job::find_all(&tx).await.unwrap();
    let titles: Vec<_> = jobs.iter().map(|j| j.title.as_str()).collect();
    assert_eq!(titles, ["designer", "photographer"]);
    assert_eq!(jobs[1].equity, Some(dec("0")));
}

#[tokio::test]
async fn job_find_all_with_filters() {
    db!(client, tx);

    let filters = input::parse_job_filter("title=des&minSalary=70000&hasEquity=true").unwrap();
    let jobs = job::find_all_with_filters(&tx, &filters).await.unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].title, "designer");

    let filters = FieldMap::new().with("hasEquity", true);
    let jobs = job::find_all_with_filters(&tx, &filters).await.unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].company_handle, "c2");

    let filters = FieldMap::new().with("hasEquity", false);
    assert_eq!(job::find_all_with_filters(&tx, &filters).await.unwrap().len(), 2);

    let filters = FieldMap::new().with("maxSalary", 70000);
    let jobs = job::find_all_with_filters(&tx, &filters).await.unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].title, "photographer");
}

#[tokio::test]
async fn job_get() {
    db!(client, tx);

    let found = job::get(&tx, 2).await.unwrap();
    assert_eq!(found.title, "designer");
    assert_eq!(found.salary, Some(85000));

    assert!(job::get(&tx, 10000).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn job_update() {
    db!(client, tx);

    let data = input::validate_body(
        &json!({"title": "janitor", "salary": 40000, "equity": 0.05}),
        input::JOB_UPDATE,
    )
    .unwrap();
    let updated = job::update(&tx, 2, &data).await.unwrap();
    assert_eq!(updated.title, "janitor");
    assert_eq!(updated.salary, Some(40000));
    assert_eq!(updated.equity, Some(dec("0.05")));
    assert_eq!(updated.company_handle, "c2");

    let data = FieldMap::new().with("salary", SqlValue::Null);
    let updated = job::update(&tx, 2, &data).await.unwrap();
    assert_eq!(updated.salary, None);
    assert_eq!(updated.title, "janitor");

    assert!(job::update(&tx, 100000, &data).await.unwrap_err().is_not_found());

    let err = job::update(&tx, 2, &FieldMap::new()).await.unwrap_err();
    assert_eq!(err.status_code(), 400);
}

#[tokio::test]
async fn job_remove() {
    db!(client, tx);

    job::remove(&tx, 2).await.unwrap();
    assert!(job::get(&tx, 2).await.unwrap_err().is_not_found());
    assert!(job::remove(&tx, 2).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn jobs_user_has_applied_to() {
    db!(client, tx);

    assert_eq!(job::find_all_jobs_user_has_applied_to(&tx, "u2").await.unwrap(), vec![2]);

    tx.batch_execute("DELETE FROM applications").await.unwrap();
    assert!(
        job::find_all_jobs_user_has_applied_to(&tx, "u2")
            .await
            .unwrap()
            .is_empty()
    );
}

// ==================== users ====================

#[tokio::test]
async fn user_find_all_and_get() {
    db!(client, tx);

    let users = user::find_all(&tx).await.unwrap();
    let names: Vec<_> = users.iter().map(|u| u.username.as_str()).collect();
    assert_eq!(names, ["u1", "u2"]);
    assert!(!users[0].is_admin);

    let detail = user::get(&tx, "u1").await.unwrap();
    assert_eq!(detail.user.first_name, "U1F");
    assert_eq!(detail.jobs, vec![1]);

    assert!(user::get(&tx, "nope").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn user_update() {
    db!(client, tx);

    let data = input::validate_body(
        &json!({"firstName": "NewF", "isAdmin": true}),
        input::USER_UPDATE,
    )
    .unwrap();
    let updated = user::update(&tx, "u1", &data).await.unwrap();
    assert_eq!(updated.first_name, "NewF");
    assert!(updated.is_admin);
    assert_eq!(updated.last_name, "U1L");

    assert!(user::update(&tx, "nope", &data).await.unwrap_err().is_not_found());
    assert!(matches!(
        user::update(&tx, "u1", &FieldMap::new()).await.unwrap_err(),
        JoblyError::Validation(_)
    ));
}

#[tokio::test]
async fn user_remove() {
    db!(client, tx);

    user::remove(&tx, "u1").await.unwrap();
    assert!(user::get(&tx, "u1").await.unwrap_err().is_not_found());
    assert!(user::remove(&tx, "u1").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn user_apply_to_job() {
    db!(client, tx);

    user::apply_to_job(&tx, "u1", 2).await.unwrap();
    assert_eq!(user::get(&tx, "u1").await.unwrap().jobs, vec![1, 2]);

    assert!(user::apply_to_job(&tx, "u1", 0).await.unwrap_err().is_not_found());
    assert!(user::apply_to_job(&tx, "nope", 1).await.unwrap_err().is_not_found());

    // Last: a constraint error aborts the surrounding transaction.
    let err = user::apply_to_job(&tx, "u1", 2).await.unwrap_err();
    assert!(matches!(err, JoblyError::Duplicate(_)));
}
