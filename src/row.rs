//! Row access over driver cursors
//!
//! [`Rows`] wraps a driver cursor together with the column names resolved
//! from statement metadata, so every [`Row`] it yields can be addressed by
//! column name. The typed getters share the decode path of
//! [`SqlValue::decode`], so hand-written mapping closures and the
//! descriptor-driven mapper speak the same vocabulary.

use std::sync::Arc;

use crate::error::Error;
use crate::error::Result;
use crate::value::FromSql;
use crate::value::SqlKind;
use crate::value::SqlValue;

/// Conversion from a result row into a value, usually a table struct.
///
/// Implemented by `#[derive(Table)]`, or by hand for ad-hoc projections.
pub trait FromRow: Sized {
    /// # Errors
    ///
    /// Returns an error when a column is missing or a value cannot be
    /// converted to the field's type.
    fn from_row(row: &Row) -> Result<Self>;
}

/// A cursor of rows with name-addressable columns.
pub struct Rows {
    inner:   turso::Rows,
    columns: Arc<Vec<String>>,
}

impl std::fmt::Debug for Rows {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rows")
            .field("columns", &self.columns)
            .finish_non_exhaustive()
    }
}

impl Rows {
    pub(crate) fn new(inner: turso::Rows, columns: Arc<Vec<String>>) -> Self {
        Self { inner, columns }
    }

    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    /// The next row, or `None` at the end of the cursor.
    ///
    /// # Errors
    ///
    /// [`Error::Database`] when the driver fails mid-iteration.
    pub async fn next(&mut self) -> Result<Option<Row>> {
        match self.inner.next().await? {
            Some(row) => Ok(Some(Row { inner: row, columns: self.columns.clone() })),
            None => Ok(None),
        }
    }
}

/// One result row.
pub struct Row {
    inner:   turso::Row,
    columns: Arc<Vec<String>>,
}

impl Row {
    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    pub fn column_count(&self) -> usize {
        self.inner.column_count()
    }

    /// Position of a named column.
    ///
    /// # Errors
    ///
    /// [`Error::ColumnNotFound`] when the name is not in the result metadata.
    pub fn column_index(&self, column: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == column)
            .ok_or_else(|| Error::ColumnNotFound(column.to_string()))
    }

    /// The raw driver value at a position.
    pub fn value_at(&self, index: usize) -> Result<turso::Value> {
        Ok(self.inner.get_value(index)?)
    }

    /// Decode a named column into a typed value of the given kind.
    pub fn decode(&self, kind: SqlKind, column: &str) -> Result<SqlValue> {
        let index = self.column_index(column)?;
        SqlValue::decode(kind, self.value_at(index)?, column)
    }

    /// Decode a column by position.
    pub fn decode_at(&self, kind: SqlKind, index: usize) -> Result<SqlValue> {
        let column = match self.columns.get(index) {
            Some(name) => name.clone(),
            None => index.to_string(),
        };
        SqlValue::decode(kind, self.value_at(index)?, &column)
    }

    /// Typed read of a named column. Null maps to `None` for `Option`
    /// targets and to [`Error::UnexpectedNull`] for bare ones.
    pub fn get<T: FromSql>(&self, column: &str) -> Result<T> {
        T::from_sql(self.decode(T::KIND, column)?)
    }

    /// Typed read by position.
    pub fn get_at<T: FromSql>(&self, index: usize) -> Result<T> {
        T::from_sql(self.decode_at(T::KIND, index)?)
    }

    /// Typed read that falls back to the type's zero value on null, for the
    /// primitive kinds (see [`FromSql::from_sql_or_default`]).
    pub fn get_or_default<T: FromSql>(&self, column: &str) -> Result<T> {
        T::from_sql_or_default(self.decode(T::KIND, column)?)
    }

    /// Positional variant of [`Row::get_or_default`].
    pub fn get_at_or_default<T: FromSql>(&self, index: usize) -> Result<T> {
        T::from_sql_or_default(self.decode_at(T::KIND, index)?)
    }
}

#[cfg(test)]
mod tests {
    // Row construction needs a live driver cursor; behavior is covered by the
    // integration tests. The name lookup logic is exercised here through the
    // shared decode path.
    use super::*;

    #[test]
    fn test_decode_path_is_shared_with_value_module() {
        let decoded = SqlValue::decode(SqlKind::Text, turso::Value::Text("x".to_string()), "c").unwrap();
        assert_eq!(String::from_sql(decoded).unwrap(), "x");
    }
}
