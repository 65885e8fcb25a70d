//! Descriptor-driven CRUD
//!
//! The [`Mapper`] composes the schema registry, the named-parameter statement
//! engine and the row accessor: it generates SQL text from a type's
//! [`TableDescriptor`](crate::schema::TableDescriptor), binds field values by
//! placeholder name, and maps result rows back into instances. It is
//! deliberately joinless: one type, one table, key-based operations.
//!
//! "No row found" is an `Ok(None)`, never an error; errors mean the
//! operation itself failed.

use crate::error::Result;
use crate::row::FromRow;
use crate::schema::SchemaRegistry;
use crate::schema::TableSchema;
use crate::statement::ArrayMode;
use crate::statement::NamedStatement;
use crate::value::SqlValue;
use crate::value::ToSql;

/// Key-based CRUD over registered table types.
///
/// Owns a [`SchemaRegistry`]; construct one mapper at startup and share it.
pub struct Mapper {
    registry: SchemaRegistry,
    mode:     ArrayMode,
}

impl Mapper {
    pub fn new() -> Self {
        Self { registry: SchemaRegistry::new(), mode: ArrayMode::default() }
    }

    /// A mapper whose statements use the given array mode.
    pub fn with_array_mode(mode: ArrayMode) -> Self {
        Self { registry: SchemaRegistry::new(), mode }
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Fetch one record by key.
    pub async fn find<T, K>(&self, conn: &turso::Connection, key: K) -> Result<Option<T>>
    where
        T: TableSchema + FromRow,
        K: ToSql,
    {
        let descriptor = self.registry.descriptor::<T>()?;
        tracing::debug!("find in {}", descriptor.table());
        let mut st = NamedStatement::parse_with(&descriptor.select_sql(), self.mode)?;
        st.bind(descriptor.key().name(), key)?;
        let mut rows = st.query(conn).await?;
        match rows.next().await? {
            Some(row) => Ok(Some(T::from_row(&row)?)),
            None => Ok(None),
        }
    }

    /// Fetch every record of the table.
    pub async fn find_all<T>(&self, conn: &turso::Connection) -> Result<Vec<T>>
    where T: TableSchema + FromRow {
        let descriptor = self.registry.descriptor::<T>()?;
        tracing::debug!("find_all in {}", descriptor.table());
        let mut st = NamedStatement::parse_with(&descriptor.select_all_sql(), self.mode)?;
        let mut rows = st.query(conn).await?;
        let mut records = Vec::new();
        while let Some(row) = rows.next().await? {
            records.push(T::from_row(&row)?);
        }
        Ok(records)
    }

    /// Fetch the records whose keys appear in `keys`, via an `IN` predicate
    /// on the key column. An empty key list returns an empty vec.
    pub async fn find_many<T, K>(&self, conn: &turso::Connection, keys: Vec<K>) -> Result<Vec<T>>
    where
        T: TableSchema + FromRow,
        K: ToSql,
    {
        let descriptor = self.registry.descriptor::<T>()?;
        tracing::debug!("find_many in {}", descriptor.table());
        let mut st = NamedStatement::parse_with(&descriptor.select_in_sql(), self.mode)?;
        st.bind_array(descriptor.key().name(), keys)?;
        let mut rows = st.query(conn).await?;
        let mut records = Vec::new();
        while let Some(row) = rows.next().await? {
            records.push(T::from_row(&row)?);
        }
        Ok(records)
    }

    /// Insert a record and return the stored instance.
    ///
    /// Only non-key columns are inserted; the key is expected to be
    /// driver-generated. The returned instance is a field-by-field copy of
    /// the input with the generated row id written into the key field when
    /// the key kind is integral; a non-integral key is copied through
    /// unchanged.
    pub async fn insert<T>(&self, conn: &turso::Connection, record: &T) -> Result<T>
    where T: TableSchema + Default {
        let descriptor = self.registry.descriptor::<T>()?;
        tracing::debug!("insert into {}", descriptor.table());
        let mut st = NamedStatement::parse_with(&descriptor.insert_sql(), self.mode)?;
        for column in descriptor.columns() {
            st.bind(column.name(), column.read(record))?;
        }
        st.execute(conn).await?;
        let rowid = conn.last_insert_rowid();

        let mut created = T::default();
        for column in descriptor.columns() {
            column.copy(record, &mut created)?;
        }
        match SqlValue::integer_of(descriptor.key().kind(), rowid) {
            Some(key) => descriptor.key().write(&mut created, key)?,
            None => descriptor.key().copy(record, &mut created)?,
        }
        Ok(created)
    }

    /// Update a record's non-key columns by its key. Returns the update
    /// count; a key-only table has nothing to update and returns 0.
    pub async fn update<T>(&self, conn: &turso::Connection, record: &T) -> Result<u64>
    where T: TableSchema {
        let descriptor = self.registry.descriptor::<T>()?;
        if descriptor.columns().is_empty() {
            tracing::debug!("update on key-only table {} is a no-op", descriptor.table());
            return Ok(0);
        }
        tracing::debug!("update {}", descriptor.table());
        let mut st = NamedStatement::parse_with(&descriptor.update_sql(), self.mode)?;
        for column in descriptor.columns() {
            st.bind(column.name(), column.read(record))?;
        }
        st.bind(descriptor.key().name(), descriptor.key().read(record))?;
        st.execute(conn).await
    }

    /// Delete by key. Returns the update count.
    pub async fn delete<T, K>(&self, conn: &turso::Connection, key: K) -> Result<u64>
    where
        T: TableSchema,
        K: ToSql,
    {
        let descriptor = self.registry.descriptor::<T>()?;
        tracing::debug!("delete from {}", descriptor.table());
        let mut st = NamedStatement::parse_with(&descriptor.delete_sql(), self.mode)?;
        st.bind(descriptor.key().name(), key)?;
        st.execute(conn).await
    }
}

impl Default for Mapper {
    fn default() -> Self {
        Self::new()
    }
}
