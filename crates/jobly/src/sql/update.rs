//! `SET` clause builder for partial updates.

use super::{ColumnMap, push_quoted_ident};
use crate::error::{JoblyError, JoblyResult};
use crate::value::{FieldMap, SqlValue};
use std::fmt::Write;

/// A rendered `SET` list and the values for its placeholders.
#[derive(Debug, Clone, PartialEq)]
pub struct SetClause {
    /// `"col_a"=$1, "col_b"=$2, ...`
    pub clause: String,
    /// `values[i]` binds to `$(i + 1)`.
    pub values: Vec<SqlValue>,
}

impl SetClause {
    /// Index of the first placeholder after the `SET` list, for a trailing
    /// `WHERE` parameter.
    pub fn next_placeholder(&self) -> usize {
        self.values.len() + 1
    }
}

/// Build the `SET` list of a partial `UPDATE`.
///
/// Each field becomes `"<column>"=$<n>`, where `<column>` is looked up in
/// `columns` (falling back to the field name) and `n` is the field's 1-based
/// position in `data`.
///
/// Returns [`JoblyError::Validation`] when `data` is empty.
pub fn build_set_clause(data: &FieldMap, columns: &ColumnMap<'_>) -> JoblyResult<SetClause> {
    if data.is_empty() {
        return Err(JoblyError::validation("No data"));
    }

    let mut clause = String::new();
    let mut values = Vec::with_capacity(data.len());

    for (idx, (field, value)) in data.iter().enumerate() {
        if idx > 0 {
            clause.push_str(", ");
        }
        push_quoted_ident(&mut clause, columns.resolve(field));
        let _ = write!(&mut clause, "=${}", idx + 1);
        values.push(value.clone());
    }

    Ok(SetClause { clause, values })
}
