//! Value kinds and conversions for tursql
//!
//! The set of supported value kinds is a closed union: every kind the library
//! can move between a struct field and a statement parameter or row column is
//! a [`SqlValue`] variant, and every conversion is an exhaustive match. A
//! conversion the union cannot express fails at the Rust-type seam with
//! [`Error::TypeMismatch`] instead of a runtime table miss.
//!
//! Each variant carries an `Option` of its inner type, so "a null of kind T"
//! is representable for every kind. Binding a null never panics and always
//! encodes the driver-level NULL.

use chrono::NaiveDate;
use chrono::NaiveDateTime;
use chrono::NaiveTime;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;

use crate::error::Error;
use crate::error::Result;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The closed set of value kinds the library understands.
///
/// Covers the eight primitive kinds (`i8` through `f64`, `bool`, `char`) plus
/// text, decimal, the three temporal kinds, and binary blobs. SQLite has a
/// single textual affinity, so character large objects are plain [`Text`].
///
/// [`Text`]: SqlKind::Text
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SqlKind {
    TinyInt,
    SmallInt,
    Int,
    BigInt,
    Float,
    Double,
    Bool,
    Char,
    Text,
    Decimal,
    Date,
    Time,
    Timestamp,
    Blob,
}

impl std::fmt::Display for SqlKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// A typed, nullable value moving between fields, parameters and row columns.
#[derive(Clone, Debug, PartialEq)]
pub enum SqlValue {
    TinyInt(Option<i8>),
    SmallInt(Option<i16>),
    Int(Option<i32>),
    BigInt(Option<i64>),
    Float(Option<f32>),
    Double(Option<f64>),
    Bool(Option<bool>),
    Char(Option<char>),
    Text(Option<String>),
    Decimal(Option<Decimal>),
    Date(Option<NaiveDate>),
    Time(Option<NaiveTime>),
    Timestamp(Option<NaiveDateTime>),
    Blob(Option<Vec<u8>>),
}

impl SqlValue {
    /// The kind tag of this value.
    pub fn kind(&self) -> SqlKind {
        match self {
            SqlValue::TinyInt(_) => SqlKind::TinyInt,
            SqlValue::SmallInt(_) => SqlKind::SmallInt,
            SqlValue::Int(_) => SqlKind::Int,
            SqlValue::BigInt(_) => SqlKind::BigInt,
            SqlValue::Float(_) => SqlKind::Float,
            SqlValue::Double(_) => SqlKind::Double,
            SqlValue::Bool(_) => SqlKind::Bool,
            SqlValue::Char(_) => SqlKind::Char,
            SqlValue::Text(_) => SqlKind::Text,
            SqlValue::Decimal(_) => SqlKind::Decimal,
            SqlValue::Date(_) => SqlKind::Date,
            SqlValue::Time(_) => SqlKind::Time,
            SqlValue::Timestamp(_) => SqlKind::Timestamp,
            SqlValue::Blob(_) => SqlKind::Blob,
        }
    }

    /// The null of a given kind.
    pub fn null_of(kind: SqlKind) -> SqlValue {
        match kind {
            SqlKind::TinyInt => SqlValue::TinyInt(None),
            SqlKind::SmallInt => SqlValue::SmallInt(None),
            SqlKind::Int => SqlValue::Int(None),
            SqlKind::BigInt => SqlValue::BigInt(None),
            SqlKind::Float => SqlValue::Float(None),
            SqlKind::Double => SqlValue::Double(None),
            SqlKind::Bool => SqlValue::Bool(None),
            SqlKind::Char => SqlValue::Char(None),
            SqlKind::Text => SqlValue::Text(None),
            SqlKind::Decimal => SqlValue::Decimal(None),
            SqlKind::Date => SqlValue::Date(None),
            SqlKind::Time => SqlValue::Time(None),
            SqlKind::Timestamp => SqlValue::Timestamp(None),
            SqlKind::Blob => SqlValue::Blob(None),
        }
    }

    pub fn is_null(&self) -> bool {
        match self {
            SqlValue::TinyInt(v) => v.is_none(),
            SqlValue::SmallInt(v) => v.is_none(),
            SqlValue::Int(v) => v.is_none(),
            SqlValue::BigInt(v) => v.is_none(),
            SqlValue::Float(v) => v.is_none(),
            SqlValue::Double(v) => v.is_none(),
            SqlValue::Bool(v) => v.is_none(),
            SqlValue::Char(v) => v.is_none(),
            SqlValue::Text(v) => v.is_none(),
            SqlValue::Decimal(v) => v.is_none(),
            SqlValue::Date(v) => v.is_none(),
            SqlValue::Time(v) => v.is_none(),
            SqlValue::Timestamp(v) => v.is_none(),
            SqlValue::Blob(v) => v.is_none(),
        }
    }

    /// The value bound in place of an empty simulated array.
    ///
    /// `IN (...)` with zero markers is not valid SQL, so an empty array still
    /// emits one marker, bound to SQL `NULL`: `x IN (NULL)` matches no row,
    /// including rows where `x` is itself NULL.
    pub fn never_match() -> SqlValue {
        SqlValue::BigInt(None)
    }

    /// Encode this value as a driver parameter.
    ///
    /// A null of any kind encodes `NULL`. Integer kinds widen to the driver's
    /// 64-bit integer, `f32` widens to `REAL`, booleans store as 0/1, and
    /// char, decimal and the temporal kinds store as text.
    pub fn to_param(&self) -> turso::Value {
        match self {
            SqlValue::TinyInt(Some(v)) => turso::Value::Integer(*v as i64),
            SqlValue::SmallInt(Some(v)) => turso::Value::Integer(*v as i64),
            SqlValue::Int(Some(v)) => turso::Value::Integer(*v as i64),
            SqlValue::BigInt(Some(v)) => turso::Value::Integer(*v),
            SqlValue::Float(Some(v)) => turso::Value::Real(*v as f64),
            SqlValue::Double(Some(v)) => turso::Value::Real(*v),
            SqlValue::Bool(Some(v)) => turso::Value::Integer(if *v { 1 } else { 0 }),
            SqlValue::Char(Some(v)) => turso::Value::Text(v.to_string()),
            SqlValue::Text(Some(v)) => turso::Value::Text(v.clone()),
            SqlValue::Decimal(Some(v)) => turso::Value::Text(v.to_string()),
            SqlValue::Date(Some(v)) => turso::Value::Text(v.format(DATE_FORMAT).to_string()),
            SqlValue::Time(Some(v)) => turso::Value::Text(v.format(TIME_FORMAT).to_string()),
            SqlValue::Timestamp(Some(v)) => turso::Value::Text(v.format(TIMESTAMP_FORMAT).to_string()),
            SqlValue::Blob(Some(v)) => turso::Value::Blob(v.clone()),
            _ => turso::Value::Null,
        }
    }

    /// Decode a driver column value into the requested kind.
    ///
    /// `column` names the offending column in errors. A driver `NULL` decodes
    /// to the null of the requested kind; deciding whether null is acceptable
    /// is the caller's concern (see [`FromSql`]).
    ///
    /// # Errors
    ///
    /// [`Error::MalformedData`] when the stored value violates the kind's
    /// shape (a multi-character string for `Char`, unparseable decimal or
    /// temporal text), [`Error::TypeMismatch`] when the driver value cannot
    /// represent the kind at all.
    pub fn decode(kind: SqlKind, value: turso::Value, column: &str) -> Result<SqlValue> {
        if matches!(value, turso::Value::Null) {
            return Ok(SqlValue::null_of(kind));
        }
        match (kind, value) {
            (SqlKind::TinyInt, turso::Value::Integer(v)) => Ok(SqlValue::TinyInt(Some(v as i8))),
            (SqlKind::TinyInt, turso::Value::Real(v)) => Ok(SqlValue::TinyInt(Some(v as i8))),
            (SqlKind::SmallInt, turso::Value::Integer(v)) => Ok(SqlValue::SmallInt(Some(v as i16))),
            (SqlKind::SmallInt, turso::Value::Real(v)) => Ok(SqlValue::SmallInt(Some(v as i16))),
            (SqlKind::Int, turso::Value::Integer(v)) => Ok(SqlValue::Int(Some(v as i32))),
            (SqlKind::Int, turso::Value::Real(v)) => Ok(SqlValue::Int(Some(v as i32))),
            (SqlKind::BigInt, turso::Value::Integer(v)) => Ok(SqlValue::BigInt(Some(v))),
            (SqlKind::BigInt, turso::Value::Real(v)) => Ok(SqlValue::BigInt(Some(v as i64))),
            (SqlKind::Float, turso::Value::Real(v)) => Ok(SqlValue::Float(Some(v as f32))),
            (SqlKind::Float, turso::Value::Integer(v)) => Ok(SqlValue::Float(Some(v as f32))),
            (SqlKind::Double, turso::Value::Real(v)) => Ok(SqlValue::Double(Some(v))),
            (SqlKind::Double, turso::Value::Integer(v)) => Ok(SqlValue::Double(Some(v as f64))),
            (SqlKind::Bool, turso::Value::Integer(v)) => Ok(SqlValue::Bool(Some(v != 0))),
            (SqlKind::Char, turso::Value::Text(s)) => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(SqlValue::Char(Some(c))),
                    _ => Err(Error::MalformedData {
                        column:  column.to_string(),
                        message: format!("expected exactly one character, got {:?}", s),
                    }),
                }
            }
            (SqlKind::Text, turso::Value::Text(s)) => Ok(SqlValue::Text(Some(s))),
            (SqlKind::Decimal, turso::Value::Text(s)) => match s.parse::<Decimal>() {
                Ok(d) => Ok(SqlValue::Decimal(Some(d))),
                Err(_) => Err(Error::MalformedData {
                    column:  column.to_string(),
                    message: format!("unparseable decimal {:?}", s),
                }),
            },
            (SqlKind::Decimal, turso::Value::Integer(v)) => Ok(SqlValue::Decimal(Some(Decimal::from(v)))),
            (SqlKind::Decimal, turso::Value::Real(v)) => match Decimal::from_f64(v) {
                Some(d) => Ok(SqlValue::Decimal(Some(d))),
                None => Err(Error::MalformedData {
                    column:  column.to_string(),
                    message: format!("decimal cannot represent {}", v),
                }),
            },
            (SqlKind::Date, turso::Value::Text(s)) => match NaiveDate::parse_from_str(&s, DATE_FORMAT) {
                Ok(d) => Ok(SqlValue::Date(Some(d))),
                Err(_) => {
                    Err(Error::MalformedData { column: column.to_string(), message: format!("unparseable date {:?}", s) })
                }
            },
            (SqlKind::Time, turso::Value::Text(s)) => match NaiveTime::parse_from_str(&s, TIME_FORMAT) {
                Ok(t) => Ok(SqlValue::Time(Some(t))),
                Err(_) => {
                    Err(Error::MalformedData { column: column.to_string(), message: format!("unparseable time {:?}", s) })
                }
            },
            (SqlKind::Timestamp, turso::Value::Text(s)) => {
                match NaiveDateTime::parse_from_str(&s, TIMESTAMP_FORMAT)
                    .or_else(|_| NaiveDateTime::parse_from_str(&s, "%Y-%m-%dT%H:%M:%S"))
                {
                    Ok(ts) => Ok(SqlValue::Timestamp(Some(ts))),
                    Err(_) => Err(Error::MalformedData {
                        column:  column.to_string(),
                        message: format!("unparseable timestamp {:?}", s),
                    }),
                }
            }
            (SqlKind::Blob, turso::Value::Blob(b)) => Ok(SqlValue::Blob(Some(b))),
            (kind, other) => Err(Error::TypeMismatch { expected: kind, actual: format!("{:?}", other) }),
        }
    }

    /// JSON rendering used by [`ArrayMode::Json`](crate::statement::ArrayMode).
    pub(crate) fn to_json(&self) -> serde_json::Value {
        use serde_json::json;
        match self {
            SqlValue::TinyInt(Some(v)) => json!(v),
            SqlValue::SmallInt(Some(v)) => json!(v),
            SqlValue::Int(Some(v)) => json!(v),
            SqlValue::BigInt(Some(v)) => json!(v),
            SqlValue::Float(Some(v)) => json!(v),
            SqlValue::Double(Some(v)) => json!(v),
            SqlValue::Bool(Some(v)) => json!(v),
            SqlValue::Char(Some(v)) => json!(v.to_string()),
            SqlValue::Text(Some(v)) => json!(v),
            SqlValue::Decimal(Some(v)) => json!(v.to_string()),
            SqlValue::Date(Some(v)) => json!(v.format(DATE_FORMAT).to_string()),
            SqlValue::Time(Some(v)) => json!(v.format(TIME_FORMAT).to_string()),
            SqlValue::Timestamp(Some(v)) => json!(v.format(TIMESTAMP_FORMAT).to_string()),
            SqlValue::Blob(Some(v)) => json!(v),
            _ => serde_json::Value::Null,
        }
    }

    /// A value of an integral kind holding a driver-generated row id, or
    /// `None` when the kind is not integral.
    pub(crate) fn integer_of(kind: SqlKind, rowid: i64) -> Option<SqlValue> {
        match kind {
            SqlKind::TinyInt => Some(SqlValue::TinyInt(Some(rowid as i8))),
            SqlKind::SmallInt => Some(SqlValue::SmallInt(Some(rowid as i16))),
            SqlKind::Int => Some(SqlValue::Int(Some(rowid as i32))),
            SqlKind::BigInt => Some(SqlValue::BigInt(Some(rowid))),
            _ => None,
        }
    }
}

/// Conversion from a Rust value into a [`SqlValue`].
///
/// Implemented for the inner type of every kind and for `Option` of each, so
/// an explicit null still carries its kind: `None::<i64>` binds a null
/// `BigInt`, not an untyped hole.
pub trait ToSql {
    fn to_sql(self) -> SqlValue;
}

/// Conversion from a [`SqlValue`] back into a Rust value.
///
/// `KIND` is the kind this type decodes from; row accessors use it to decode
/// the driver value before handing it here.
pub trait FromSql: Sized {
    const KIND: SqlKind;

    /// # Errors
    ///
    /// [`Error::UnexpectedNull`] when the value is null and this type is not
    /// an `Option`, [`Error::TypeMismatch`] when the value's kind differs.
    fn from_sql(value: SqlValue) -> Result<Self>;

    /// Null handling for non-nullable targets.
    ///
    /// The eight primitive kinds fall back to their zero value, matching
    /// driver-level getters for typed columns. Every other kind propagates
    /// [`Error::UnexpectedNull`]: a bare `String` or `NaiveDate` field has no
    /// zero and a nullable column should be declared `Option`.
    fn from_sql_or_default(value: SqlValue) -> Result<Self> {
        Self::from_sql(value)
    }
}

impl ToSql for i8 {
    fn to_sql(self) -> SqlValue {
        SqlValue::TinyInt(Some(self))
    }
}

impl ToSql for Option<i8> {
    fn to_sql(self) -> SqlValue {
        SqlValue::TinyInt(self)
    }
}

impl ToSql for i16 {
    fn to_sql(self) -> SqlValue {
        SqlValue::SmallInt(Some(self))
    }
}

impl ToSql for Option<i16> {
    fn to_sql(self) -> SqlValue {
        SqlValue::SmallInt(self)
    }
}

impl ToSql for i32 {
    fn to_sql(self) -> SqlValue {
        SqlValue::Int(Some(self))
    }
}

impl ToSql for Option<i32> {
    fn to_sql(self) -> SqlValue {
        SqlValue::Int(self)
    }
}

impl ToSql for i64 {
    fn to_sql(self) -> SqlValue {
        SqlValue::BigInt(Some(self))
    }
}

impl ToSql for Option<i64> {
    fn to_sql(self) -> SqlValue {
        SqlValue::BigInt(self)
    }
}

impl ToSql for f32 {
    fn to_sql(self) -> SqlValue {
        SqlValue::Float(Some(self))
    }
}

impl ToSql for Option<f32> {
    fn to_sql(self) -> SqlValue {
        SqlValue::Float(self)
    }
}

impl ToSql for f64 {
    fn to_sql(self) -> SqlValue {
        SqlValue::Double(Some(self))
    }
}

impl ToSql for Option<f64> {
    fn to_sql(self) -> SqlValue {
        SqlValue::Double(self)
    }
}

impl ToSql for bool {
    fn to_sql(self) -> SqlValue {
        SqlValue::Bool(Some(self))
    }
}

impl ToSql for Option<bool> {
    fn to_sql(self) -> SqlValue {
        SqlValue::Bool(self)
    }
}

impl ToSql for char {
    fn to_sql(self) -> SqlValue {
        SqlValue::Char(Some(self))
    }
}

impl ToSql for Option<char> {
    fn to_sql(self) -> SqlValue {
        SqlValue::Char(self)
    }
}

impl ToSql for String {
    fn to_sql(self) -> SqlValue {
        SqlValue::Text(Some(self))
    }
}

impl ToSql for Option<String> {
    fn to_sql(self) -> SqlValue {
        SqlValue::Text(self)
    }
}

impl ToSql for &str {
    fn to_sql(self) -> SqlValue {
        SqlValue::Text(Some(self.to_string()))
    }
}

impl ToSql for Decimal {
    fn to_sql(self) -> SqlValue {
        SqlValue::Decimal(Some(self))
    }
}

impl ToSql for Option<Decimal> {
    fn to_sql(self) -> SqlValue {
        SqlValue::Decimal(self)
    }
}

impl ToSql for NaiveDate {
    fn to_sql(self) -> SqlValue {
        SqlValue::Date(Some(self))
    }
}

impl ToSql for Option<NaiveDate> {
    fn to_sql(self) -> SqlValue {
        SqlValue::Date(self)
    }
}

impl ToSql for NaiveTime {
    fn to_sql(self) -> SqlValue {
        SqlValue::Time(Some(self))
    }
}

impl ToSql for Option<NaiveTime> {
    fn to_sql(self) -> SqlValue {
        SqlValue::Time(self)
    }
}

impl ToSql for NaiveDateTime {
    fn to_sql(self) -> SqlValue {
        SqlValue::Timestamp(Some(self))
    }
}

impl ToSql for Option<NaiveDateTime> {
    fn to_sql(self) -> SqlValue {
        SqlValue::Timestamp(self)
    }
}

impl ToSql for Vec<u8> {
    fn to_sql(self) -> SqlValue {
        SqlValue::Blob(Some(self))
    }
}

impl ToSql for Option<Vec<u8>> {
    fn to_sql(self) -> SqlValue {
        SqlValue::Blob(self)
    }
}

impl ToSql for &[u8] {
    fn to_sql(self) -> SqlValue {
        SqlValue::Blob(Some(self.to_vec()))
    }
}

impl ToSql for SqlValue {
    fn to_sql(self) -> SqlValue {
        self
    }
}

impl FromSql for i8 {
    const KIND: SqlKind = SqlKind::TinyInt;

    fn from_sql(value: SqlValue) -> Result<Self> {
        match value {
            SqlValue::TinyInt(Some(v)) => Ok(v),
            SqlValue::TinyInt(None) => Err(Error::UnexpectedNull),
            other => Err(Error::TypeMismatch { expected: Self::KIND, actual: format!("{:?}", other) }),
        }
    }

    fn from_sql_or_default(value: SqlValue) -> Result<Self> {
        if value.is_null() { Ok(0) } else { Self::from_sql(value) }
    }
}

impl FromSql for i16 {
    const KIND: SqlKind = SqlKind::SmallInt;

    fn from_sql(value: SqlValue) -> Result<Self> {
        match value {
            SqlValue::SmallInt(Some(v)) => Ok(v),
            SqlValue::SmallInt(None) => Err(Error::UnexpectedNull),
            other => Err(Error::TypeMismatch { expected: Self::KIND, actual: format!("{:?}", other) }),
        }
    }

    fn from_sql_or_default(value: SqlValue) -> Result<Self> {
        if value.is_null() { Ok(0) } else { Self::from_sql(value) }
    }
}

impl FromSql for i32 {
    const KIND: SqlKind = SqlKind::Int;

    fn from_sql(value: SqlValue) -> Result<Self> {
        match value {
            SqlValue::Int(Some(v)) => Ok(v),
            SqlValue::Int(None) => Err(Error::UnexpectedNull),
            other => Err(Error::TypeMismatch { expected: Self::KIND, actual: format!("{:?}", other) }),
        }
    }

    fn from_sql_or_default(value: SqlValue) -> Result<Self> {
        if value.is_null() { Ok(0) } else { Self::from_sql(value) }
    }
}

impl FromSql for i64 {
    const KIND: SqlKind = SqlKind::BigInt;

    fn from_sql(value: SqlValue) -> Result<Self> {
        match value {
            SqlValue::BigInt(Some(v)) => Ok(v),
            SqlValue::BigInt(None) => Err(Error::UnexpectedNull),
            other => Err(Error::TypeMismatch { expected: Self::KIND, actual: format!("{:?}", other) }),
        }
    }

    fn from_sql_or_default(value: SqlValue) -> Result<Self> {
        if value.is_null() { Ok(0) } else { Self::from_sql(value) }
    }
}

impl FromSql for f32 {
    const KIND: SqlKind = SqlKind::Float;

    fn from_sql(value: SqlValue) -> Result<Self> {
        match value {
            SqlValue::Float(Some(v)) => Ok(v),
            SqlValue::Float(None) => Err(Error::UnexpectedNull),
            other => Err(Error::TypeMismatch { expected: Self::KIND, actual: format!("{:?}", other) }),
        }
    }

    fn from_sql_or_default(value: SqlValue) -> Result<Self> {
        if value.is_null() { Ok(0.0) } else { Self::from_sql(value) }
    }
}

impl FromSql for f64 {
    const KIND: SqlKind = SqlKind::Double;

    fn from_sql(value: SqlValue) -> Result<Self> {
        match value {
            SqlValue::Double(Some(v)) => Ok(v),
            SqlValue::Double(None) => Err(Error::UnexpectedNull),
            other => Err(Error::TypeMismatch { expected: Self::KIND, actual: format!("{:?}", other) }),
        }
    }

    fn from_sql_or_default(value: SqlValue) -> Result<Self> {
        if value.is_null() { Ok(0.0) } else { Self::from_sql(value) }
    }
}

impl FromSql for bool {
    const KIND: SqlKind = SqlKind::Bool;

    fn from_sql(value: SqlValue) -> Result<Self> {
        match value {
            SqlValue::Bool(Some(v)) => Ok(v),
            SqlValue::Bool(None) => Err(Error::UnexpectedNull),
            other => Err(Error::TypeMismatch { expected: Self::KIND, actual: format!("{:?}", other) }),
        }
    }

    fn from_sql_or_default(value: SqlValue) -> Result<Self> {
        if value.is_null() { Ok(false) } else { Self::from_sql(value) }
    }
}

impl FromSql for char {
    const KIND: SqlKind = SqlKind::Char;

    fn from_sql(value: SqlValue) -> Result<Self> {
        match value {
            SqlValue::Char(Some(v)) => Ok(v),
            SqlValue::Char(None) => Err(Error::UnexpectedNull),
            other => Err(Error::TypeMismatch { expected: Self::KIND, actual: format!("{:?}", other) }),
        }
    }

    fn from_sql_or_default(value: SqlValue) -> Result<Self> {
        if value.is_null() { Ok('\0') } else { Self::from_sql(value) }
    }
}

impl FromSql for String {
    const KIND: SqlKind = SqlKind::Text;

    fn from_sql(value: SqlValue) -> Result<Self> {
        match value {
            SqlValue::Text(Some(v)) => Ok(v),
            SqlValue::Text(None) => Err(Error::UnexpectedNull),
            other => Err(Error::TypeMismatch { expected: Self::KIND, actual: format!("{:?}", other) }),
        }
    }
}

impl FromSql for Decimal {
    const KIND: SqlKind = SqlKind::Decimal;

    fn from_sql(value: SqlValue) -> Result<Self> {
        match value {
            SqlValue::Decimal(Some(v)) => Ok(v),
            SqlValue::Decimal(None) => Err(Error::UnexpectedNull),
            other => Err(Error::TypeMismatch { expected: Self::KIND, actual: format!("{:?}", other) }),
        }
    }
}

impl FromSql for NaiveDate {
    const KIND: SqlKind = SqlKind::Date;

    fn from_sql(value: SqlValue) -> Result<Self> {
        match value {
            SqlValue::Date(Some(v)) => Ok(v),
            SqlValue::Date(None) => Err(Error::UnexpectedNull),
            other => Err(Error::TypeMismatch { expected: Self::KIND, actual: format!("{:?}", other) }),
        }
    }
}

impl FromSql for NaiveTime {
    const KIND: SqlKind = SqlKind::Time;

    fn from_sql(value: SqlValue) -> Result<Self> {
        match value {
            SqlValue::Time(Some(v)) => Ok(v),
            SqlValue::Time(None) => Err(Error::UnexpectedNull),
            other => Err(Error::TypeMismatch { expected: Self::KIND, actual: format!("{:?}", other) }),
        }
    }
}

impl FromSql for NaiveDateTime {
    const KIND: SqlKind = SqlKind::Timestamp;

    fn from_sql(value: SqlValue) -> Result<Self> {
        match value {
            SqlValue::Timestamp(Some(v)) => Ok(v),
            SqlValue::Timestamp(None) => Err(Error::UnexpectedNull),
            other => Err(Error::TypeMismatch { expected: Self::KIND, actual: format!("{:?}", other) }),
        }
    }
}

impl FromSql for Vec<u8> {
    const KIND: SqlKind = SqlKind::Blob;

    fn from_sql(value: SqlValue) -> Result<Self> {
        match value {
            SqlValue::Blob(Some(v)) => Ok(v),
            SqlValue::Blob(None) => Err(Error::UnexpectedNull),
            other => Err(Error::TypeMismatch { expected: Self::KIND, actual: format!("{:?}", other) }),
        }
    }
}

impl<T: FromSql> FromSql for Option<T> {
    const KIND: SqlKind = T::KIND;

    fn from_sql(value: SqlValue) -> Result<Self> {
        if value.is_null() { Ok(None) } else { T::from_sql(value).map(Some) }
    }

    fn from_sql_or_default(value: SqlValue) -> Result<Self> {
        Self::from_sql(value)
    }
}

// Optional UUID support
#[cfg(feature = "with-uuid")]
mod uuid_impl {
    use uuid::Uuid;

    use super::*;

    impl ToSql for Uuid {
        fn to_sql(self) -> SqlValue {
            SqlValue::Text(Some(self.to_string()))
        }
    }

    impl ToSql for Option<Uuid> {
        fn to_sql(self) -> SqlValue {
            SqlValue::Text(self.map(|u| u.to_string()))
        }
    }

    impl FromSql for Uuid {
        const KIND: SqlKind = SqlKind::Text;

        fn from_sql(value: SqlValue) -> Result<Self> {
            match value {
                SqlValue::Text(Some(s)) => Uuid::parse_str(&s)
                    .map_err(|_| Error::TypeMismatch { expected: SqlKind::Text, actual: format!("uuid {:?}", s) }),
                SqlValue::Text(None) => Err(Error::UnexpectedNull),
                other => Err(Error::TypeMismatch { expected: SqlKind::Text, actual: format!("{:?}", other) }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_of_value() {
        assert_eq!(42i64.to_sql().kind(), SqlKind::BigInt);
        assert_eq!("hello".to_sql().kind(), SqlKind::Text);
        assert_eq!('x'.to_sql().kind(), SqlKind::Char);
        assert_eq!(true.to_sql().kind(), SqlKind::Bool);
        assert_eq!(vec![1u8, 2].to_sql().kind(), SqlKind::Blob);
    }

    #[test]
    fn test_null_of_preserves_kind() {
        let kinds = [
            SqlKind::TinyInt,
            SqlKind::SmallInt,
            SqlKind::Int,
            SqlKind::BigInt,
            SqlKind::Float,
            SqlKind::Double,
            SqlKind::Bool,
            SqlKind::Char,
            SqlKind::Text,
            SqlKind::Decimal,
            SqlKind::Date,
            SqlKind::Time,
            SqlKind::Timestamp,
            SqlKind::Blob,
        ];
        for kind in kinds {
            let v = SqlValue::null_of(kind);
            assert_eq!(v.kind(), kind);
            assert!(v.is_null());
        }
    }

    #[test]
    fn test_null_of_every_kind_encodes_driver_null() {
        let kinds = [
            SqlKind::TinyInt,
            SqlKind::SmallInt,
            SqlKind::Int,
            SqlKind::BigInt,
            SqlKind::Float,
            SqlKind::Double,
            SqlKind::Bool,
            SqlKind::Char,
            SqlKind::Text,
            SqlKind::Decimal,
            SqlKind::Date,
            SqlKind::Time,
            SqlKind::Timestamp,
            SqlKind::Blob,
        ];
        for kind in kinds {
            assert_eq!(SqlValue::null_of(kind).to_param(), turso::Value::Null);
        }
    }

    #[test]
    fn test_option_none_keeps_kind() {
        let v = None::<i64>.to_sql();
        assert_eq!(v, SqlValue::BigInt(None));
        assert_eq!(v.to_param(), turso::Value::Null);
    }

    #[test]
    fn test_to_param_integer_widening() {
        assert_eq!(7i8.to_sql().to_param(), turso::Value::Integer(7));
        assert_eq!(7i16.to_sql().to_param(), turso::Value::Integer(7));
        assert_eq!(7i32.to_sql().to_param(), turso::Value::Integer(7));
        assert_eq!(7i64.to_sql().to_param(), turso::Value::Integer(7));
    }

    #[test]
    fn test_to_param_bool_stores_zero_one() {
        assert_eq!(true.to_sql().to_param(), turso::Value::Integer(1));
        assert_eq!(false.to_sql().to_param(), turso::Value::Integer(0));
    }

    #[test]
    fn test_to_param_char_stores_text() {
        assert_eq!('y'.to_sql().to_param(), turso::Value::Text("y".to_string()));
    }

    #[test]
    fn test_to_param_temporal_formats() {
        let date = NaiveDate::from_ymd_opt(2020, 3, 14).unwrap();
        assert_eq!(date.to_sql().to_param(), turso::Value::Text("2020-03-14".to_string()));

        let time = NaiveTime::from_hms_opt(9, 5, 0).unwrap();
        assert_eq!(time.to_sql().to_param(), turso::Value::Text("09:05:00".to_string()));

        let ts = date.and_hms_opt(9, 5, 0).unwrap();
        assert_eq!(ts.to_sql().to_param(), turso::Value::Text("2020-03-14 09:05:00".to_string()));
    }

    #[test]
    fn test_to_param_decimal_stores_text() {
        let d: Decimal = "12.50".parse().unwrap();
        assert_eq!(d.to_sql().to_param(), turso::Value::Text("12.50".to_string()));
    }

    #[test]
    fn test_decode_round_trip_bigint() {
        let decoded = SqlValue::decode(SqlKind::BigInt, turso::Value::Integer(42), "n").unwrap();
        assert_eq!(decoded, SqlValue::BigInt(Some(42)));
    }

    #[test]
    fn test_decode_null_is_null_of_kind() {
        let decoded = SqlValue::decode(SqlKind::Text, turso::Value::Null, "n").unwrap();
        assert_eq!(decoded, SqlValue::Text(None));
    }

    #[test]
    fn test_decode_char_rejects_multi_character() {
        let err = SqlValue::decode(SqlKind::Char, turso::Value::Text("ab".to_string()), "initial").unwrap_err();
        match err {
            Error::MalformedData { column, .. } => assert_eq!(column, "initial"),
            other => panic!("expected MalformedData, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_char_rejects_empty_string() {
        assert!(SqlValue::decode(SqlKind::Char, turso::Value::Text(String::new()), "c").is_err());
    }

    #[test]
    fn test_decode_char_single() {
        let decoded = SqlValue::decode(SqlKind::Char, turso::Value::Text("k".to_string()), "c").unwrap();
        assert_eq!(decoded, SqlValue::Char(Some('k')));
    }

    #[test]
    fn test_decode_bool_from_integer() {
        assert_eq!(SqlValue::decode(SqlKind::Bool, turso::Value::Integer(1), "b").unwrap(), SqlValue::Bool(Some(true)));
        assert_eq!(
            SqlValue::decode(SqlKind::Bool, turso::Value::Integer(0), "b").unwrap(),
            SqlValue::Bool(Some(false))
        );
    }

    #[test]
    fn test_decode_decimal_from_text() {
        let decoded = SqlValue::decode(SqlKind::Decimal, turso::Value::Text("3.14".to_string()), "d").unwrap();
        assert_eq!(decoded, SqlValue::Decimal(Some("3.14".parse().unwrap())));
    }

    #[test]
    fn test_decode_decimal_bad_text() {
        assert!(SqlValue::decode(SqlKind::Decimal, turso::Value::Text("pi".to_string()), "d").is_err());
    }

    #[test]
    fn test_decode_timestamp_accepts_t_separator() {
        let decoded =
            SqlValue::decode(SqlKind::Timestamp, turso::Value::Text("2020-03-14T09:05:00".to_string()), "ts").unwrap();
        let expected = NaiveDate::from_ymd_opt(2020, 3, 14).unwrap().and_hms_opt(9, 5, 0).unwrap();
        assert_eq!(decoded, SqlValue::Timestamp(Some(expected)));
    }

    #[test]
    fn test_decode_kind_mismatch() {
        let err = SqlValue::decode(SqlKind::Blob, turso::Value::Integer(1), "b").unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
    }

    #[test]
    fn test_from_sql_null_errors_for_bare_type() {
        assert!(i64::from_sql(SqlValue::BigInt(None)).is_err());
        assert!(String::from_sql(SqlValue::Text(None)).is_err());
    }

    #[test]
    fn test_from_sql_option_maps_null_to_none() {
        assert_eq!(Option::<i64>::from_sql(SqlValue::BigInt(None)).unwrap(), None);
        assert_eq!(Option::<i64>::from_sql(SqlValue::BigInt(Some(5))).unwrap(), Some(5));
    }

    #[test]
    fn test_from_sql_or_default_zeroes_primitives() {
        assert_eq!(i64::from_sql_or_default(SqlValue::BigInt(None)).unwrap(), 0);
        assert_eq!(i8::from_sql_or_default(SqlValue::TinyInt(None)).unwrap(), 0);
        assert_eq!(f64::from_sql_or_default(SqlValue::Double(None)).unwrap(), 0.0);
        assert!(!bool::from_sql_or_default(SqlValue::Bool(None)).unwrap());
        assert_eq!(char::from_sql_or_default(SqlValue::Char(None)).unwrap(), '\0');
    }

    #[test]
    fn test_from_sql_or_default_errors_for_text() {
        assert!(String::from_sql_or_default(SqlValue::Text(None)).is_err());
    }

    #[test]
    fn test_from_sql_kind_mismatch() {
        assert!(i64::from_sql(SqlValue::Text(Some("5".to_string()))).is_err());
    }

    #[test]
    fn test_never_match_is_null() {
        assert!(SqlValue::never_match().is_null());
        assert_eq!(SqlValue::never_match().to_param(), turso::Value::Null);
    }

    #[test]
    fn test_to_json_values() {
        assert_eq!(5i64.to_sql().to_json(), serde_json::json!(5));
        assert_eq!("a".to_sql().to_json(), serde_json::json!("a"));
        assert_eq!(SqlValue::BigInt(None).to_json(), serde_json::Value::Null);
    }

    #[test]
    fn test_integer_of() {
        assert_eq!(SqlValue::integer_of(SqlKind::BigInt, 9), Some(SqlValue::BigInt(Some(9))));
        assert_eq!(SqlValue::integer_of(SqlKind::Int, 9), Some(SqlValue::Int(Some(9))));
        assert_eq!(SqlValue::integer_of(SqlKind::Text, 9), None);
    }
}
