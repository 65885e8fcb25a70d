//! Named-parameter statement engine
//!
//! A [`NamedStatement`] defers everything physical until the bindings are
//! known. Bind calls buffer values per placeholder name; the first execution
//! resolves the buffered bindings, rewrites the template into driver-ready
//! positional SQL (expanding array bindings into the right number of
//! markers), and replays every value at its final position. After that the
//! statement is frozen: the resolved plan is reused and further bind calls
//! are rejected.
//!
//! # Example
//!
//! ```ignore
//! let mut stmt = NamedStatement::parse("SELECT * FROM t WHERE k = :k AND j IN (:j)")?;
//! stmt.bind("k", 5i64)?;
//! stmt.bind_array("j", vec![1i64, 2, 3])?;
//! let mut rows = stmt.query(&conn).await?;
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::Error;
use crate::error::Result;
use crate::row::Rows;
use crate::template::Segment;
use crate::template::Template;
use crate::value::SqlKind;
use crate::value::SqlValue;
use crate::value::ToSql;

/// How array bindings reach the driver, fixed at construction time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ArrayMode {
    /// Rewrite each occurrence of the placeholder into one positional marker
    /// per element, comma-joined. An empty array still emits one marker,
    /// bound to a value that matches no row (see [`SqlValue::never_match`]).
    /// This is the default; it works on any SQL dialect.
    #[default]
    Expand,
    /// Bind the whole array as a single parameter holding a JSON array, for
    /// queries written against the driver's JSON support
    /// (`IN (SELECT value FROM json_each(:name))`).
    Json,
}

#[derive(Clone, Debug)]
enum Binding {
    Scalar(SqlValue),
    Array(Vec<SqlValue>),
}

#[derive(Clone, Debug)]
struct Plan {
    sql:    String,
    params: Vec<turso::Value>,
}

/// A SQL statement with named placeholders and buffered bindings.
///
/// Not for concurrent use: the binding surface takes `&mut self`, and one
/// instance resolves exactly once.
#[derive(Clone, Debug)]
pub struct NamedStatement {
    template: Template,
    mode:     ArrayMode,
    bindings: HashMap<String, Binding>,
    plan:     Option<Plan>,
}

impl NamedStatement {
    /// Parse a template with the default [`ArrayMode::Expand`].
    ///
    /// # Errors
    ///
    /// [`Error::MalformedTemplate`] on a bare `:` marker or an unterminated
    /// quoted region.
    pub fn parse(sql: &str) -> Result<Self> {
        Self::parse_with(sql, ArrayMode::default())
    }

    /// Parse a template with an explicit array mode.
    pub fn parse_with(sql: &str, mode: ArrayMode) -> Result<Self> {
        let template = Template::parse(sql)?;
        Ok(Self { template, mode, bindings: HashMap::new(), plan: None })
    }

    pub fn array_mode(&self) -> ArrayMode {
        self.mode
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    /// Buffer a scalar value for a placeholder.
    ///
    /// `None` of an `Option` type binds an explicit null of that type's kind.
    /// Re-binding a name before resolution replaces the previous value.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownPlaceholder`] when the name is not in the template,
    /// [`Error::StatementFrozen`] after the first execution.
    pub fn bind(&mut self, name: &str, value: impl ToSql) -> Result<&mut Self> {
        self.check_open(name)?;
        self.bindings.insert(name.to_string(), Binding::Scalar(value.to_sql()));
        Ok(self)
    }

    /// Buffer an explicit null of the given kind.
    pub fn bind_null(&mut self, name: &str, kind: SqlKind) -> Result<&mut Self> {
        self.check_open(name)?;
        self.bindings.insert(name.to_string(), Binding::Scalar(SqlValue::null_of(kind)));
        Ok(self)
    }

    /// Buffer an ordered, possibly empty element sequence for a placeholder.
    ///
    /// How the sequence reaches the driver depends on the statement's
    /// [`ArrayMode`].
    pub fn bind_array<V: ToSql>(&mut self, name: &str, elements: Vec<V>) -> Result<&mut Self> {
        self.check_open(name)?;
        let elements: Vec<SqlValue> = elements.into_iter().map(ToSql::to_sql).collect();
        self.bindings.insert(name.to_string(), Binding::Array(elements));
        Ok(self)
    }

    fn check_open(&self, name: &str) -> Result<()> {
        if self.plan.is_some() {
            return Err(Error::StatementFrozen);
        }
        if !self.template.contains(name) {
            return Err(Error::UnknownPlaceholder(name.to_string()));
        }
        Ok(())
    }

    /// Resolve the buffered bindings into positional SQL and a parameter
    /// list, freezing the statement. Idempotent; the execute paths call this
    /// on first use.
    ///
    /// # Errors
    ///
    /// [`Error::UnboundPlaceholder`] when a template name has no binding;
    /// nothing is prepared or cached in that case.
    pub fn resolve(&mut self) -> Result<()> {
        self.plan()?;
        Ok(())
    }

    /// The resolved positional SQL, resolving first if needed.
    pub fn sql(&mut self) -> Result<&str> {
        Ok(&self.plan()?.sql)
    }

    /// The resolved parameters in final positional order.
    pub fn params(&mut self) -> Result<&[turso::Value]> {
        Ok(&self.plan()?.params)
    }

    fn plan(&mut self) -> Result<&Plan> {
        if self.plan.is_none() {
            let plan = self.build_plan()?;
            tracing::trace!("resolved SQL: {}", plan.sql);
            tracing::trace!("params: {:?}", plan.params);
            self.plan = Some(plan);
        }
        let Some(plan) = &self.plan else { unreachable!("plan populated above") };
        Ok(plan)
    }

    fn build_plan(&self) -> Result<Plan> {
        for name in self.template.names() {
            if !self.bindings.contains_key(name.as_str()) {
                return Err(Error::UnboundPlaceholder(name.clone()));
            }
        }

        let mut sql = String::with_capacity(self.template.raw().len());
        let mut params: Vec<turso::Value> = Vec::new();
        for segment in self.template.segments() {
            match segment {
                Segment::Sql(text) => sql.push_str(text),
                Segment::Param(name) => match self.bindings.get(name.as_str()) {
                    Some(Binding::Scalar(value)) => {
                        sql.push('?');
                        params.push(value.to_param());
                    }
                    Some(Binding::Array(elements)) => match self.mode {
                        ArrayMode::Expand => {
                            if elements.is_empty() {
                                sql.push('?');
                                params.push(SqlValue::never_match().to_param());
                            } else {
                                sql.push_str(&vec!["?"; elements.len()].join(", "));
                                params.extend(elements.iter().map(SqlValue::to_param));
                            }
                        }
                        ArrayMode::Json => {
                            sql.push('?');
                            let rendered = serde_json::Value::Array(elements.iter().map(SqlValue::to_json).collect());
                            params.push(turso::Value::Text(rendered.to_string()));
                        }
                    },
                    None => return Err(Error::UnboundPlaceholder(name.clone())),
                },
            }
        }

        Ok(Plan { sql, params })
    }

    /// Execute as a query, returning a row accessor whose column names come
    /// from the statement's result metadata. `INSERT ... RETURNING` runs
    /// through here as well, which is how generated keys come back addressable
    /// by name.
    ///
    /// # Errors
    ///
    /// Resolution errors, or [`Error::Database`] wrapping the driver failure.
    pub async fn query(&mut self, conn: &turso::Connection) -> Result<Rows> {
        let (sql, params) = {
            let plan = self.plan()?;
            (plan.sql.clone(), plan.params.clone())
        };
        let mut stmt = conn.prepare(&sql).await?;
        let columns: Vec<String> = stmt.columns().iter().map(|c| c.name().to_string()).collect();
        let rows = stmt.query(turso::params::Params::Positional(params)).await?;
        Ok(Rows::new(rows, Arc::new(columns)))
    }

    /// Execute as a data-modifying statement, returning the update count.
    pub async fn execute(&mut self, conn: &turso::Connection) -> Result<u64> {
        let (sql, params) = {
            let plan = self.plan()?;
            (plan.sql.clone(), plan.params.clone())
        };
        let affected = conn.execute(&sql, params).await?;
        Ok(affected)
    }
}
