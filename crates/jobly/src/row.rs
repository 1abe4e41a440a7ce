//! Row mapping traits

use crate::error::{JoblyError, JoblyResult};
use tokio_postgres::Row;
use tokio_postgres::types::FromSql;

/// Trait for converting a database row into a Rust struct.
///
/// Model types implement this by hand with [`RowExt::try_get_column`], so a
/// column that is missing or of the wrong type surfaces as
/// [`JoblyError::Decode`] instead of a panic.
///
/// # Example
///
/// ```ignore
/// impl FromRow for Company {
///     fn from_row(row: &Row) -> JoblyResult<Self> {
///         Ok(Self {
///             handle: row.try_get_column("handle")?,
///             name: row.try_get_column("name")?,
///             // ...
///         })
///     }
/// }
/// ```
pub trait FromRow: Sized {
    /// Convert a database row into Self
    fn from_row(row: &Row) -> JoblyResult<Self>;
}

/// Extension trait for Row to provide typed access
pub trait RowExt {
    /// Try to get a column value, returning JoblyError::Decode on failure
    fn try_get_column<T>(&self, column: &str) -> JoblyResult<T>
    where
        T: for<'a> FromSql<'a>;
}

impl RowExt for Row {
    fn try_get_column<T>(&self, column: &str) -> JoblyResult<T>
    where
        T: for<'a> FromSql<'a>,
    {
        self.try_get(column)
            .map_err(|e| JoblyError::decode(column, e.to_string()))
    }
}

/// Collect one column out of every row.
pub fn column_values<T>(rows: &[Row], column: &str) -> JoblyResult<Vec<T>>
where
    T: for<'a> FromSql<'a>,
{
    rows.iter().map(|row| row.try_get_column(column)).collect()
}
