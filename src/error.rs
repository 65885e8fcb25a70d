use thiserror::Error;

use crate::value::SqlKind;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("database error: {0}")]
    Database(#[from] turso::Error),

    #[error("malformed template: {message}")]
    MalformedTemplate { message: String },

    #[error("no binding provided for placeholder '{0}'")]
    UnboundPlaceholder(String),

    #[error("placeholder '{0}' does not appear in the statement")]
    UnknownPlaceholder(String),

    #[error("statement already resolved, bindings are frozen")]
    StatementFrozen,

    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: SqlKind, actual: String },

    #[error("malformed data in column '{column}': {message}")]
    MalformedData { column: String, message: String },

    #[error("unexpected null value for non-nullable target")]
    UnexpectedNull,

    #[error("column not found: {0}")]
    ColumnNotFound(String),

    #[error("table type '{0}' marks more than one field as key")]
    AmbiguousKey(&'static str),

    #[error("table type '{0}' declares no fields")]
    EmptyTableSpec(&'static str),
}
