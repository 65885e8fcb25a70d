//! Table schemas, descriptors and the schema registry
//!
//! A [`TableSpec`] is the declared shape of a struct: its fields in
//! declaration order, an optional key marking, and optional table/column name
//! overrides. Specs are populated at registration time, either by hand or by
//! the `#[derive(Table)]` macro, so no runtime type introspection happens.
//!
//! A [`TableDescriptor`] is the resolved form: schema-qualified table
//! identity, exactly one key column, and the ordered non-key columns.
//! Descriptors are built once per type and cached in a [`SchemaRegistry`].

use std::any::Any;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::RwLock;

use crate::error::Error;
use crate::error::Result;
use crate::row::Row;
use crate::value::SqlKind;
use crate::value::SqlValue;

/// Types that can describe themselves as a database table.
///
/// Implemented by hand or via `#[derive(Table)]`. Field order in the returned
/// spec must match declaration order; it decides both the implicit key (first
/// field when none is marked) and the column order of generated SQL.
pub trait TableSchema: Sized + 'static {
    fn table_spec() -> TableSpec<Self>;
}

/// One declared field: its name, kind, key marking and accessors.
///
/// The accessor pair is the only way the library touches a field. `get` lifts
/// the field into a [`SqlValue`]; `set` writes one back, applying the
/// null-handling contract the field's type declares (zero value for bare
/// primitives, `None` for `Option` fields).
pub struct FieldSpec<T> {
    name:   &'static str,
    column: Option<&'static str>,
    kind:   SqlKind,
    key:    bool,
    get:    fn(&T) -> SqlValue,
    set:    fn(&mut T, SqlValue) -> Result<()>,
}

impl<T> FieldSpec<T> {
    pub fn new(
        name: &'static str,
        kind: SqlKind,
        get: fn(&T) -> SqlValue,
        set: fn(&mut T, SqlValue) -> Result<()>,
    ) -> Self {
        Self { name, column: None, kind, key: false, get, set }
    }

    /// Mark this field as the table key.
    pub fn key(mut self) -> Self {
        self.key = true;
        self
    }

    /// Override the derived column name.
    pub fn column_name(mut self, column: &'static str) -> Self {
        self.column = Some(column);
        self
    }
}

/// The declared shape of a table type, in declaration order.
pub struct TableSpec<T> {
    type_name: &'static str,
    table:     Option<&'static str>,
    schema:    Option<&'static str>,
    fields:    Vec<FieldSpec<T>>,
}

impl<T> TableSpec<T> {
    /// `type_name` is the struct's simple name; the table name derives from
    /// it when no override is given.
    pub fn new(type_name: &'static str) -> Self {
        Self { type_name, table: None, schema: None, fields: Vec::new() }
    }

    pub fn table_name(mut self, table: &'static str) -> Self {
        self.table = Some(table);
        self
    }

    pub fn schema_name(mut self, schema: &'static str) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn field(mut self, field: FieldSpec<T>) -> Self {
        self.fields.push(field);
        self
    }
}

/// A resolved column: final column name, kind, and the field accessors.
pub struct Column<T> {
    name: String,
    kind: SqlKind,
    get:  fn(&T) -> SqlValue,
    set:  fn(&mut T, SqlValue) -> Result<()>,
}

impl<T> Column<T> {
    fn from_field(field: &FieldSpec<T>) -> Self {
        let name = match field.column {
            Some(column) => column.to_string(),
            None => camel_to_snake(field.name),
        };
        Self { name, kind: field.kind, get: field.get, set: field.set }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> SqlKind {
        self.kind
    }

    /// Read the field value from a record.
    pub fn read(&self, record: &T) -> SqlValue {
        (self.get)(record)
    }

    /// Write a value into the field.
    ///
    /// # Errors
    ///
    /// Fails when the value's kind does not match the field's declared kind,
    /// or when a null reaches a field with no null representation.
    pub fn write(&self, record: &mut T, value: SqlValue) -> Result<()> {
        (self.set)(record, value)
    }

    /// Copy this field from one record to another.
    pub fn copy(&self, origin: &T, target: &mut T) -> Result<()> {
        (self.set)(target, (self.get)(origin))
    }

    /// Read this column from a row and write it into the field.
    pub fn write_from_row(&self, target: &mut T, row: &Row) -> Result<()> {
        let value = row.decode(self.kind, &self.name)?;
        (self.set)(target, value)
    }

    /// Encode the field value as a driver parameter.
    pub fn param(&self, record: &T) -> turso::Value {
        (self.get)(record).to_param()
    }
}

/// Resolved table metadata: identity, key column, non-key columns.
pub struct TableDescriptor<T> {
    table:   String,
    key:     Column<T>,
    columns: Vec<Column<T>>,
}

impl<T> TableDescriptor<T> {
    /// Resolve a spec into a descriptor.
    ///
    /// Table identity: explicit name + schema beats explicit name beats
    /// explicit schema with a derived name beats a fully derived name.
    /// Key: the field marked with [`FieldSpec::key`] wins; marking two is a
    /// configuration error; marking none falls back to the first declared
    /// field, which is then excluded from the column list.
    pub fn from_spec(spec: TableSpec<T>) -> Result<Self> {
        if spec.fields.is_empty() {
            return Err(Error::EmptyTableSpec(spec.type_name));
        }
        let marked = spec.fields.iter().filter(|f| f.key).count();
        if marked > 1 {
            return Err(Error::AmbiguousKey(spec.type_name));
        }
        let key_index = spec.fields.iter().position(|f| f.key).unwrap_or(0);

        let table = match (spec.table, spec.schema) {
            (Some(table), Some(schema)) => format!("{}.{}", schema, table),
            (Some(table), None) => table.to_string(),
            (None, Some(schema)) => format!("{}.{}", schema, camel_to_snake(spec.type_name)),
            (None, None) => camel_to_snake(spec.type_name),
        };

        let key = Column::from_field(&spec.fields[key_index]);
        let columns = spec
            .fields
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != key_index)
            .map(|(_, f)| Column::from_field(f))
            .collect();

        Ok(Self { table, key, columns })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn key(&self) -> &Column<T> {
        &self.key
    }

    /// Non-key columns in declaration order.
    pub fn columns(&self) -> &[Column<T>] {
        &self.columns
    }

    fn column_list(&self) -> String {
        let mut names = vec![self.key.name.as_str()];
        names.extend(self.columns.iter().map(|c| c.name.as_str()));
        names.join(", ")
    }

    /// `SELECT ... WHERE key = :key`
    pub fn select_sql(&self) -> String {
        format!("SELECT {} FROM {} WHERE {} = :{}", self.column_list(), self.table, self.key.name, self.key.name)
    }

    /// `SELECT ...` over the whole table.
    pub fn select_all_sql(&self) -> String {
        format!("SELECT {} FROM {}", self.column_list(), self.table)
    }

    /// `SELECT ... WHERE key IN (:key)` for an array binding.
    pub fn select_in_sql(&self) -> String {
        format!("SELECT {} FROM {} WHERE {} IN (:{})", self.column_list(), self.table, self.key.name, self.key.name)
    }

    /// `INSERT` of the non-key columns; the key is expected to be generated.
    pub fn insert_sql(&self) -> String {
        if self.columns.is_empty() {
            return format!("INSERT INTO {} DEFAULT VALUES", self.table);
        }
        let columns: Vec<&str> = self.columns.iter().map(|c| c.name.as_str()).collect();
        let markers: Vec<String> = columns.iter().map(|c| format!(":{}", c)).collect();
        format!("INSERT INTO {} ({}) VALUES ({})", self.table, columns.join(", "), markers.join(", "))
    }

    /// `UPDATE` of the non-key columns by key.
    pub fn update_sql(&self) -> String {
        let sets: Vec<String> = self.columns.iter().map(|c| format!("{} = :{}", c.name, c.name)).collect();
        format!("UPDATE {} SET {} WHERE {} = :{}", self.table, sets.join(", "), self.key.name, self.key.name)
    }

    /// `DELETE` by key.
    pub fn delete_sql(&self) -> String {
        format!("DELETE FROM {} WHERE {} = :{}", self.table, self.key.name, self.key.name)
    }
}

/// Derive a column or table name from a Rust-style name.
///
/// A separator goes before every uppercase letter except a leading one, and
/// every letter lowercases. Consecutive uppercase letters each get their own
/// separator: `testKey` becomes `test_key`, `ABCField` becomes `a_b_c_field`.
/// Already-snake input passes through unchanged.
pub fn camel_to_snake(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Cache of resolved descriptors, keyed by type.
///
/// Construct one at startup and share it by reference; descriptors compute
/// lazily on first request and live for the registry's lifetime. Concurrent
/// readers and writers are safe; two threads racing on the same type at worst
/// compute the descriptor twice and the first writer wins.
pub struct SchemaRegistry {
    cache: RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self { cache: RwLock::new(HashMap::new()) }
    }

    /// The resolved descriptor for `T`, computed on first request.
    ///
    /// # Errors
    ///
    /// Propagates the configuration errors of [`TableDescriptor::from_spec`];
    /// a failed resolution is not cached.
    pub fn descriptor<T: TableSchema>(&self) -> Result<Arc<TableDescriptor<T>>> {
        let type_id = TypeId::of::<T>();
        {
            let cache = self.cache.read().unwrap_or_else(|e| e.into_inner());
            if let Some(entry) = cache.get(&type_id)
                && let Ok(descriptor) = entry.clone().downcast::<TableDescriptor<T>>()
            {
                return Ok(descriptor);
            }
        }

        let descriptor = Arc::new(TableDescriptor::from_spec(T::table_spec())?);
        let mut cache = self.cache.write().unwrap_or_else(|e| e.into_inner());
        let entry = cache.entry(type_id).or_insert_with(|| descriptor.clone());
        match entry.clone().downcast::<TableDescriptor<T>>() {
            Ok(cached) => Ok(cached),
            Err(_) => Ok(descriptor),
        }
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::FromSql;
    use crate::value::ToSql;

    #[derive(Clone, Debug, Default, PartialEq)]
    struct TestKey {
        id:    i64,
        label: String,
        score: Option<f64>,
    }

    impl TableSchema for TestKey {
        fn table_spec() -> TableSpec<Self> {
            TableSpec::new("TestKey")
                .field(FieldSpec::new(
                    "id",
                    SqlKind::BigInt,
                    |r: &Self| r.id.to_sql(),
                    |r: &mut Self, v| {
                        r.id = i64::from_sql_or_default(v)?;
                        Ok(())
                    },
                ))
                .field(FieldSpec::new(
                    "label",
                    SqlKind::Text,
                    |r: &Self| r.label.clone().to_sql(),
                    |r: &mut Self, v| {
                        r.label = String::from_sql(v)?;
                        Ok(())
                    },
                ))
                .field(FieldSpec::new(
                    "score",
                    SqlKind::Double,
                    |r: &Self| r.score.to_sql(),
                    |r: &mut Self, v| {
                        r.score = Option::<f64>::from_sql(v)?;
                        Ok(())
                    },
                ))
        }
    }

    #[test]
    fn test_camel_to_snake_simple() {
        assert_eq!(camel_to_snake("testKey"), "test_key");
    }

    #[test]
    fn test_camel_to_snake_consecutive_uppercase() {
        assert_eq!(camel_to_snake("ABCField"), "a_b_c_field");
    }

    #[test]
    fn test_camel_to_snake_leading_uppercase() {
        assert_eq!(camel_to_snake("TestKey"), "test_key");
    }

    #[test]
    fn test_camel_to_snake_already_snake() {
        assert_eq!(camel_to_snake("already_snake"), "already_snake");
        assert_eq!(camel_to_snake("x"), "x");
        assert_eq!(camel_to_snake(""), "");
    }

    #[test]
    fn test_implicit_key_is_first_field() {
        let d = TableDescriptor::from_spec(TestKey::table_spec()).unwrap();
        assert_eq!(d.key().name(), "id");
        assert_eq!(d.columns().len(), 2);
        assert_eq!(d.columns()[0].name(), "label");
        assert_eq!(d.columns()[1].name(), "score");
    }

    #[test]
    fn test_table_name_derived_from_type_name() {
        let d = TableDescriptor::from_spec(TestKey::table_spec()).unwrap();
        assert_eq!(d.table(), "test_key");
    }

    #[test]
    fn test_table_identity_resolution_order() {
        fn spec() -> TableSpec<TestKey> {
            TestKey::table_spec()
        }

        let d = TableDescriptor::from_spec(spec().table_name("keys").schema_name("app")).unwrap();
        assert_eq!(d.table(), "app.keys");

        let d = TableDescriptor::from_spec(spec().table_name("keys")).unwrap();
        assert_eq!(d.table(), "keys");

        let d = TableDescriptor::from_spec(spec().schema_name("app")).unwrap();
        assert_eq!(d.table(), "app.test_key");

        let d = TableDescriptor::from_spec(spec()).unwrap();
        assert_eq!(d.table(), "test_key");
    }

    #[test]
    fn test_explicit_key_wins_over_first_field() {
        let spec = TableSpec::<TestKey>::new("TestKey")
            .field(FieldSpec::new("id", SqlKind::BigInt, |r: &TestKey| r.id.to_sql(), |_, _| Ok(())))
            .field(FieldSpec::new("label", SqlKind::Text, |r: &TestKey| r.label.clone().to_sql(), |_, _| Ok(())).key());
        let d = TableDescriptor::from_spec(spec).unwrap();
        assert_eq!(d.key().name(), "label");
        assert_eq!(d.columns().len(), 1);
        assert_eq!(d.columns()[0].name(), "id");
    }

    #[test]
    fn test_two_explicit_keys_is_an_error() {
        let spec = TableSpec::<TestKey>::new("TestKey")
            .field(FieldSpec::new("id", SqlKind::BigInt, |r: &TestKey| r.id.to_sql(), |_, _| Ok(())).key())
            .field(FieldSpec::new("label", SqlKind::Text, |r: &TestKey| r.label.clone().to_sql(), |_, _| Ok(())).key());
        assert!(matches!(TableDescriptor::from_spec(spec), Err(Error::AmbiguousKey("TestKey"))));
    }

    #[test]
    fn test_empty_spec_is_an_error() {
        let spec = TableSpec::<TestKey>::new("TestKey");
        assert!(matches!(TableDescriptor::from_spec(spec), Err(Error::EmptyTableSpec("TestKey"))));
    }

    #[test]
    fn test_column_name_override() {
        let spec = TableSpec::<TestKey>::new("TestKey")
            .field(FieldSpec::new("id", SqlKind::BigInt, |r: &TestKey| r.id.to_sql(), |_, _| Ok(())))
            .field(
                FieldSpec::new("label", SqlKind::Text, |r: &TestKey| r.label.clone().to_sql(), |_, _| Ok(()))
                    .column_name("display_name"),
            );
        let d = TableDescriptor::from_spec(spec).unwrap();
        assert_eq!(d.columns()[0].name(), "display_name");
    }

    #[test]
    fn test_descriptor_determinism() {
        let a = TableDescriptor::from_spec(TestKey::table_spec()).unwrap();
        let b = TableDescriptor::from_spec(TestKey::table_spec()).unwrap();
        assert_eq!(a.table(), b.table());
        assert_eq!(a.key().name(), b.key().name());
        assert_eq!(a.key().kind(), b.key().kind());
        let a_cols: Vec<(&str, SqlKind)> = a.columns().iter().map(|c| (c.name(), c.kind())).collect();
        let b_cols: Vec<(&str, SqlKind)> = b.columns().iter().map(|c| (c.name(), c.kind())).collect();
        assert_eq!(a_cols, b_cols);
    }

    #[test]
    fn test_registry_caches_descriptor() {
        let registry = SchemaRegistry::new();
        let a = registry.descriptor::<TestKey>().unwrap();
        let b = registry.descriptor::<TestKey>().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_select_sql() {
        let d = TableDescriptor::from_spec(TestKey::table_spec()).unwrap();
        assert_eq!(d.select_sql(), "SELECT id, label, score FROM test_key WHERE id = :id");
        assert_eq!(d.select_all_sql(), "SELECT id, label, score FROM test_key");
        assert_eq!(d.select_in_sql(), "SELECT id, label, score FROM test_key WHERE id IN (:id)");
    }

    #[test]
    fn test_insert_update_delete_sql() {
        let d = TableDescriptor::from_spec(TestKey::table_spec()).unwrap();
        assert_eq!(d.insert_sql(), "INSERT INTO test_key (label, score) VALUES (:label, :score)");
        assert_eq!(d.update_sql(), "UPDATE test_key SET label = :label, score = :score WHERE id = :id");
        assert_eq!(d.delete_sql(), "DELETE FROM test_key WHERE id = :id");
    }

    #[test]
    fn test_insert_sql_key_only_table() {
        let spec = TableSpec::<TestKey>::new("TestKey").field(FieldSpec::new(
            "id",
            SqlKind::BigInt,
            |r: &TestKey| r.id.to_sql(),
            |_, _| Ok(()),
        ));
        let d = TableDescriptor::from_spec(spec).unwrap();
        assert_eq!(d.insert_sql(), "INSERT INTO test_key DEFAULT VALUES");
    }

    #[test]
    fn test_field_copy_and_read() {
        let d = TableDescriptor::from_spec(TestKey::table_spec()).unwrap();
        let origin = TestKey { id: 7, label: "a".to_string(), score: Some(1.5) };
        let mut target = TestKey::default();
        d.key().copy(&origin, &mut target).unwrap();
        for column in d.columns() {
            column.copy(&origin, &mut target).unwrap();
        }
        assert_eq!(origin, target);
        assert_eq!(d.key().read(&origin), SqlValue::BigInt(Some(7)));
        assert_eq!(d.key().param(&origin), turso::Value::Integer(7));
    }
}
