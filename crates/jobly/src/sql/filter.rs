//! `WHERE` clause builder for search filters.
//!
//! Filters are dispatched through [`FILTER_RULES`], a table keyed by filter
//! name. Each rule says which column to compare, with which operator, and how
//! to turn the raw value into the bind value (or to skip the filter).

use super::ColumnMap;
use crate::error::{JoblyError, JoblyResult};
use crate::value::{FieldMap, SqlValue};
use std::fmt::Write;

/// Where a filter's column name comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterColumn {
    /// The filter name itself, untranslated (`name`, `title`).
    Key,
    /// The filter name looked up in the caller's [`ColumnMap`].
    Translated,
}

/// Turns a raw filter value into the bind value. `Ok(None)` drops the filter.
type Transform = fn(&str, &SqlValue) -> JoblyResult<Option<SqlValue>>;

/// A single entry of the filter table.
#[derive(Debug, Clone, Copy)]
pub struct FilterRule {
    pub name: &'static str,
    pub column: FilterColumn,
    pub operator: &'static str,
    transform: Transform,
}

impl FilterRule {
    const fn new(
        name: &'static str,
        column: FilterColumn,
        operator: &'static str,
        transform: Transform,
    ) -> Self {
        Self {
            name,
            column,
            operator,
            transform,
        }
    }

    /// Apply this rule's value transform.
    pub fn transform(&self, value: &SqlValue) -> JoblyResult<Option<SqlValue>> {
        (self.transform)(self.name, value)
    }

    fn column<'k>(&self, key: &'k str, columns: &ColumnMap<'k>) -> &'k str {
        match self.column {
            FilterColumn::Key => key,
            FilterColumn::Translated => columns.resolve(key),
        }
    }
}

fn substring(_: &str, value: &SqlValue) -> JoblyResult<Option<SqlValue>> {
    Ok(Some(SqlValue::Text(format!("%{value}%"))))
}

/// Numeric filters compare against `INTEGER` columns, so the bound value must
/// be a whole number that fits in `int4`. Integral text (`"25"`, `"25.0"`) is
/// accepted.
fn whole_number(name: &str, value: &SqlValue) -> JoblyResult<Option<SqlValue>> {
    let n = match value.to_number() {
        Some(SqlValue::Int(i)) => i32::try_from(i).ok(),
        Some(SqlValue::Float(x))
            if x.fract() == 0.0 && x >= f64::from(i32::MIN) && x <= f64::from(i32::MAX) =>
        {
            Some(x as i32)
        }
        _ => None,
    };
    n.map(|i| Some(SqlValue::Int(i64::from(i)))).ok_or_else(|| {
        JoblyError::validation(format!(
            "{name} must be a whole number between {} and {}, got '{value}'",
            i32::MIN,
            i32::MAX
        ))
    })
}

fn positive_flag(_: &str, value: &SqlValue) -> JoblyResult<Option<SqlValue>> {
    Ok(value.is_true().then_some(SqlValue::Int(0)))
}

/// Every filter the search endpoints understand.
pub const FILTER_RULES: &[FilterRule] = &[
    FilterRule::new("name", FilterColumn::Key, "ILIKE", substring),
    FilterRule::new("title", FilterColumn::Key, "ILIKE", substring),
    FilterRule::new("minEmployees", FilterColumn::Translated, ">=", whole_number),
    FilterRule::new("minSalary", FilterColumn::Translated, ">=", whole_number),
    FilterRule::new("maxEmployees", FilterColumn::Translated, "<=", whole_number),
    FilterRule::new("maxSalary", FilterColumn::Translated, "<=", whole_number),
    FilterRule::new("hasEquity", FilterColumn::Translated, ">", positive_flag),
];

/// Look up the rule for a filter name.
pub fn filter_rule(name: &str) -> Option<&'static FilterRule> {
    FILTER_RULES.iter().find(|rule| rule.name == name)
}

/// A rendered condition list and the values for its placeholders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WhereClause {
    /// `cond AND cond ...`, or empty when no filter applied.
    pub clause: String,
    /// `values[i]` binds to `$(i + 1)`.
    pub values: Vec<SqlValue>,
}

impl WhereClause {
    pub fn is_empty(&self) -> bool {
        self.clause.is_empty()
    }

    /// `" WHERE <clause>"`, or an empty string when there are no conditions.
    pub fn to_where_sql(&self) -> String {
        if self.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.clause)
        }
    }
}

/// Build the condition list of a search query.
///
/// Filters are applied in `filters` order. Unknown names are ignored, and a
/// `hasEquity` that is not `true`/`"true"` adds nothing; neither consumes a
/// placeholder. Numeric filters accept whole numbers in `int4` range, given as
/// numbers or text, and return [`JoblyError::Validation`] for anything else.
pub fn build_filter_clause(
    filters: &FieldMap,
    columns: &ColumnMap<'_>,
) -> JoblyResult<WhereClause> {
    let mut out = WhereClause::default();

    for (key, raw) in filters.iter() {
        let Some(rule) = filter_rule(key) else {
            continue;
        };
        let Some(value) = rule.transform(raw)? else {
            continue;
        };

        if !out.values.is_empty() {
            out.clause.push_str(" AND ");
        }
        out.values.push(value);
        let _ = write!(
            &mut out.clause,
            "{} {} ${}",
            rule.column(key, columns),
            rule.operator,
            out.values.len()
        );
    }

    Ok(out)
}
