//! Data access for companies, jobs and users.
//!
//! Every function borrows a [`GenericClient`](crate::GenericClient), so it
//! can run on a pooled connection or inside a caller's transaction.

pub mod company;
pub mod job;
pub mod user;

pub use company::{Company, CompanyDetail, NewCompany};
pub use job::{Job, JobSummary, NewJob};
pub use user::{User, UserDetail};

use crate::error::{JoblyError, JoblyResult};
use crate::input::FieldSpec;
use crate::value::FieldMap;
use serde::de::DeserializeOwned;

/// Deserialize a body that already passed schema validation.
fn from_validated<T: DeserializeOwned>(body: &serde_json::Value) -> JoblyResult<T> {
    serde_json::from_value(body.clone()).map_err(|e| JoblyError::validation(e.to_string()))
}

/// Keep only the filters `schema` names, in their original order. Filters
/// meant for another table are dropped instead of reaching the SQL.
fn scoped_filters(filters: &FieldMap, schema: &[FieldSpec]) -> FieldMap {
    filters
        .iter()
        .filter(|(key, _)| schema.iter().any(|spec| spec.name == *key))
        .map(|(key, value)| (key, value.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{COMPANY_FILTER, JOB_FILTER};

    #[test]
    fn scoped_filters_keep_order_and_drop_foreign_keys() {
        let filters = FieldMap::new()
            .with("maxEmployees", 50)
            .with("minSalary", 5)
            .with("name", "net")
            .with("hasEquity", true);

        let company = scoped_filters(&filters, COMPANY_FILTER);
        assert_eq!(company.keys().collect::<Vec<_>>(), vec!["maxEmployees", "name"]);

        let job = scoped_filters(&filters, JOB_FILTER);
        assert_eq!(job.keys().collect::<Vec<_>>(), vec!["minSalary", "hasEquity"]);
    }
}
