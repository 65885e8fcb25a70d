//! # tursql
//!
//! Named-parameter SQL statements and a joinless table mapper for
//! [Turso](https://turso.tech).
//!
//! ## Features
//!
//! - `:name` placeholders instead of positional indices, immune to quoted
//!   literals
//! - Array bindings for `IN (...)` predicates, expanded into the right
//!   number of positional markers at execution time
//! - Null-safe, typed value conversion over a closed set of SQL kinds
//! - A derive macro registering a struct's table shape, and a mapper that
//!   generates key-based CRUD from it (no joins, no relationship graph)
//!
//! ## Quick Start
//!
//! ```ignore
//! use tursql::prelude::*;
//!
//! // Register a table shape
//! #[derive(Clone, Debug, Default, Table)]
//! pub struct User {
//!     #[tursql(key)]
//!     pub id: i64,
//!     pub name: String,
//!     pub email: String,
//!     pub age: Option<i64>,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let db = tursql::turso::Builder::new_local(":memory:").build().await?;
//!     let conn = db.connect()?;
//!
//!     conn.execute(
//!         "CREATE TABLE user (
//!             id INTEGER PRIMARY KEY AUTOINCREMENT,
//!             name TEXT NOT NULL,
//!             email TEXT NOT NULL,
//!             age INTEGER
//!         )",
//!         (),
//!     ).await?;
//!
//!     // Descriptor-driven CRUD
//!     let mapper = Mapper::new();
//!     let user = User { name: "Alice".into(), email: "alice@example.com".into(), ..Default::default() };
//!     let user = mapper.insert(&conn, &user).await?;
//!     let found: Option<User> = mapper.find(&conn, user.id).await?;
//!     assert!(found.is_some());
//!
//!     // Named-parameter statements with array expansion
//!     let mut st = NamedStatement::parse(
//!         "SELECT name FROM user WHERE id IN (:ids) AND age > :min_age",
//!     )?;
//!     st.bind_array("ids", vec![1i64, 2, 3])?;
//!     st.bind("min_age", 21i64)?;
//!     let mut rows = st.query(&conn).await?;
//!     while let Some(row) = rows.next().await? {
//!         let name: String = row.get("name")?;
//!         println!("{name}");
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Table Attributes
//!
//! The `#[tursql(...)]` attribute supports:
//!
//! - `table_name = "..."` - Set the table name (default: struct name in
//!   snake_case)
//! - `schema_name = "..."` - Qualify the table with a schema
//! - `key` - Mark a field as the table key (default: the first field)
//! - `column_name = "..."` - Set a custom column name
//!
//! ## Array Bindings
//!
//! A placeholder bound with `bind_array` expands by the statement's
//! [`ArrayMode`]: `Expand` (default) rewrites the single marker into one `?`
//! per element; `Json` binds the whole array as one JSON text parameter for
//! use with `json_each`. An empty array in `Expand` mode still emits one
//! marker, bound to a value that matches no row, since `IN ()` is not valid
//! SQL.

pub mod error;
pub mod mapper;
pub mod prelude;
pub mod row;
pub mod schema;
pub mod statement;
pub mod support;
pub mod template;
pub mod value;
// Re-export main types at crate root
pub use error::Error;
pub use error::Result;
pub use mapper::Mapper;
pub use row::FromRow;
pub use row::Row;
pub use row::Rows;
pub use schema::FieldSpec;
pub use schema::SchemaRegistry;
pub use schema::TableDescriptor;
pub use schema::TableSchema;
pub use schema::TableSpec;
pub use schema::camel_to_snake;
pub use statement::ArrayMode;
pub use statement::NamedStatement;
pub use template::Segment;
pub use template::Template;
// Re-export the driver for callers that don't depend on turso directly
pub use turso;
// Re-export the derive macro
pub use tursql_macros::Table;
pub use value::FromSql;
pub use value::SqlKind;
pub use value::SqlValue;
pub use value::ToSql;
