//! Prelude module for tursql
//!
//! This module re-exports the most commonly used types and traits.
//!
//! ```ignore
//! use tursql::prelude::*;
//! ```

// Re-export the derive macro
pub use tursql_macros::Table;

pub use crate::error::Error;
pub use crate::error::Result;
pub use crate::mapper::Mapper;
pub use crate::row::FromRow;
pub use crate::row::Row;
pub use crate::row::Rows;
pub use crate::schema::FieldSpec;
pub use crate::schema::SchemaRegistry;
pub use crate::schema::TableSchema;
pub use crate::schema::TableSpec;
pub use crate::statement::ArrayMode;
pub use crate::statement::NamedStatement;
pub use crate::support;
pub use crate::value::FromSql;
pub use crate::value::SqlKind;
pub use crate::value::SqlValue;
pub use crate::value::ToSql;
