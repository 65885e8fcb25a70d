//! Statement-level convenience helpers
//!
//! For hand-written SQL that doesn't go through the mapper: each helper
//! parses a named-parameter template, hands the statement to a binding
//! closure, executes, and drives the row accessor through a mapping closure.
//! The statement and cursor never outlive the call.
//!
//! # Example
//!
//! ```ignore
//! let names: Vec<String> = support::query_list(
//!     &conn,
//!     "SELECT name FROM users WHERE id IN (:ids)",
//!     |st| {
//!         st.bind_array("ids", vec![1i64, 2, 3])?;
//!         Ok(())
//!     },
//!     |row| row.get("name"),
//! )
//! .await?;
//! ```

use std::collections::HashMap;
use std::hash::Hash;

use crate::error::Result;
use crate::row::Row;
use crate::statement::NamedStatement;

/// Run a query expected to produce at most one row.
///
/// # Errors
///
/// Parse, bind, mapping and driver errors; zero rows is `Ok(None)`.
pub async fn query_one<T, B, M>(conn: &turso::Connection, sql: &str, bind: B, map: M) -> Result<Option<T>>
where
    B: FnOnce(&mut NamedStatement) -> Result<()>,
    M: FnOnce(&Row) -> Result<T>,
{
    let mut st = NamedStatement::parse(sql)?;
    bind(&mut st)?;
    let mut rows = st.query(conn).await?;
    match rows.next().await? {
        Some(row) => Ok(Some(map(&row)?)),
        None => Ok(None),
    }
}

/// Run a query and map every row.
pub async fn query_list<T, B, M>(conn: &turso::Connection, sql: &str, bind: B, mut map: M) -> Result<Vec<T>>
where
    B: FnOnce(&mut NamedStatement) -> Result<()>,
    M: FnMut(&Row) -> Result<T>,
{
    let mut st = NamedStatement::parse(sql)?;
    bind(&mut st)?;
    let mut rows = st.query(conn).await?;
    let mut results = Vec::new();
    while let Some(row) = rows.next().await? {
        results.push(map(&row)?);
    }
    Ok(results)
}

/// Run a query and collect rows into a map, keyed by a second mapping.
/// A duplicate key keeps the later row.
pub async fn query_map<K, T, B, KM, M>(
    conn: &turso::Connection,
    sql: &str,
    bind: B,
    mut key_map: KM,
    mut map: M,
) -> Result<HashMap<K, T>>
where
    K: Eq + Hash,
    B: FnOnce(&mut NamedStatement) -> Result<()>,
    KM: FnMut(&Row) -> Result<K>,
    M: FnMut(&Row) -> Result<T>,
{
    let mut st = NamedStatement::parse(sql)?;
    bind(&mut st)?;
    let mut rows = st.query(conn).await?;
    let mut results = HashMap::new();
    while let Some(row) = rows.next().await? {
        results.insert(key_map(&row)?, map(&row)?);
    }
    Ok(results)
}

/// Run a data-modifying statement, returning the update count.
pub async fn execute<B>(conn: &turso::Connection, sql: &str, bind: B) -> Result<u64>
where B: FnOnce(&mut NamedStatement) -> Result<()> {
    let mut st = NamedStatement::parse(sql)?;
    bind(&mut st)?;
    st.execute(conn).await
}

/// Run an insert and return the driver-generated row id.
///
/// For non-integral or multi-column generated keys, write the statement with
/// a `RETURNING` clause and use [`query_one`] instead.
pub async fn insert<B>(conn: &turso::Connection, sql: &str, bind: B) -> Result<i64>
where B: FnOnce(&mut NamedStatement) -> Result<()> {
    let mut st = NamedStatement::parse(sql)?;
    bind(&mut st)?;
    st.execute(conn).await?;
    Ok(conn.last_insert_rowid())
}
