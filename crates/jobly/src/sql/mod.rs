//! SQL fragment builders.
//!
//! Two pure helpers turn an ordered [`FieldMap`](crate::FieldMap) into a
//! parameterized clause plus its bind values:
//!
//! - [`build_set_clause`] renders the `SET` list of a partial `UPDATE`.
//! - [`build_filter_clause`] renders the condition list of a `WHERE`.
//!
//! Both number placeholders `$1, $2, ...` in the order the fields were
//! inserted, and the returned `values[i]` always belongs to `$(i + 1)`.
//!
//! # Example
//!
//! ```ignore
//! use jobly::sql::{ColumnMap, build_set_clause};
//! use jobly::FieldMap;
//!
//! const COLUMNS: ColumnMap<'static> = ColumnMap::new(&[("firstName", "first_name")]);
//!
//! let data = FieldMap::new().with("firstName", "Aliya").with("age", 32);
//! let set = build_set_clause(&data, &COLUMNS)?;
//! assert_eq!(set.clause, r#""first_name"=$1, "age"=$2"#);
//! ```

mod filter;
mod update;


pub use filter::{
    FILTER_RULES, FilterColumn, FilterRule, WhereClause, build_filter_clause, filter_rule,
};
pub use update::{SetClause, build_set_clause};

/// A fixed translation from application field names to storage column names.
///
/// Lookups for names that are not in the table fall back to the name itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColumnMap<'a> {
    entries: &'a [(&'a str, &'a str)],
}

impl<'a> ColumnMap<'a> {
    /// Create a column map from `(field, column)` pairs.
    pub const fn new(entries: &'a [(&'a str, &'a str)]) -> Self {
        Self { entries }
    }

    /// The storage column mapped to `field`, if any.
    pub fn get(&self, field: &str) -> Option<&'a str> {
        self.entries
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, column)| *column)
    }

    /// The storage column for `field`, or `field` itself when unmapped.
    pub fn resolve<'k>(&self, field: &'k str) -> &'k str
    where
        'a: 'k,
    {
        self.get(field).unwrap_or(field)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Append `name` as a double-quoted SQL identifier, doubling embedded quotes.
pub(crate) fn push_quoted_ident(out: &mut String, name: &str) {
    out.push('"');
    for ch in name.chars() {
        if ch == '"' {
            out.push('"');
        }
        out.push(ch);
    }
    out.push('"');
}
