//! Engine Module
//!
//! Thin wrapper over an in-memory SQLite connection.
//!
//! ## Responsibilities
//! - Prepare and run statements with named or positional parameters
//! - Map JSON values onto SQL parameter values
//! - Serialize the whole database to bytes and rebuild it from them
//!
//! The engine knows nothing about documents; the store layers the table
//! convention and codec on top.

use rusqlite::types::Value as SqlValue;
use rusqlite::{params_from_iter, Connection, Row, MAIN_DB};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{DocStoreError, Result};

/// Outcome of a mutating statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExecOutcome {
    /// Rows inserted, updated or deleted
    pub changes: usize,

    /// Rowid of the most recent successful insert on this connection
    pub last_insert_rowid: i64,
}

/// In-memory SQLite engine
pub struct SqliteEngine {
    conn: Connection,
}

impl SqliteEngine {
    /// Open a fresh, empty in-memory database
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
        })
    }

    /// Rebuild a database from an image produced by [`snapshot`](Self::snapshot)
    ///
    /// SQLite accepts any bytes at deserialize time and only checks the
    /// header on first read, so the image is probed before it is accepted.
    pub fn from_snapshot(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() {
            return Err(DocStoreError::InvalidInput(
                "cannot hydrate from an empty image".to_string(),
            ));
        }

        let mut conn = Connection::open_in_memory()?;
        conn.deserialize_read_exact(MAIN_DB, bytes, bytes.len(), false)?;
        conn.query_row("SELECT count(*) FROM sqlite_master", [], |row| {
            row.get::<_, i64>(0)
        })?;

        Ok(Self { conn })
    }

    /// Serialize the whole database
    pub fn snapshot(&self) -> Result<Vec<u8>> {
        let data = self.conn.serialize(MAIN_DB)?;
        Ok(data.to_vec())
    }

    /// Run a statement, binding `:name`, `@name` and `$name` parameters
    /// from `params`
    ///
    /// Keys in `params` that the statement does not use are ignored. The
    /// statement is stepped to completion, so row-returning statements run
    /// too; their rows are discarded and they report zero changes.
    pub fn execute_named(
        &self,
        sql: &str,
        params: Option<&Map<String, Value>>,
    ) -> Result<ExecOutcome> {
        let mut stmt = self.conn.prepare(sql)?;

        for index in 1..=stmt.parameter_count() {
            let name = stmt.parameter_name(index).map(str::to_owned).ok_or_else(|| {
                DocStoreError::InvalidInput(format!(
                    "positional parameter {} cannot be bound from a named context",
                    index
                ))
            })?;

            let key = name.trim_start_matches(|c: char| matches!(c, ':' | '@' | '$'));
            let value = params.and_then(|p| p.get(key)).ok_or_else(|| {
                DocStoreError::InvalidInput(format!("missing named parameter '{}'", key))
            })?;

            stmt.raw_bind_parameter(index, to_sql_value(value))?;
        }

        let readonly = stmt.readonly();
        {
            let mut rows = stmt.raw_query();
            while rows.next()?.is_some() {}
        }

        // changes() still holds the count of the last writing statement
        let changes = if readonly {
            0
        } else {
            self.conn.changes() as usize
        };

        Ok(ExecOutcome {
            changes,
            last_insert_rowid: self.conn.last_insert_rowid(),
        })
    }

    /// Run a statement with positional parameters
    pub fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<ExecOutcome> {
        let changes = self
            .conn
            .prepare(sql)?
            .execute(params_from_iter(params.iter()))?;

        Ok(ExecOutcome {
            changes,
            last_insert_rowid: self.conn.last_insert_rowid(),
        })
    }

    /// Run a query with positional parameters, mapping every row
    pub fn query<T, F>(&self, sql: &str, params: &[SqlValue], mut map: F) -> Result<Vec<T>>
    where
        F: FnMut(&Row<'_>) -> Result<T>,
    {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params_from_iter(params.iter()))?;

        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            out.push(map(row)?);
        }
        Ok(out)
    }
}

/// Map a JSON value onto a SQL parameter
///
/// Arrays and objects are bound as their JSON text.
pub fn to_sql_value(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => n.as_f64().map(SqlValue::Real).unwrap_or(SqlValue::Null),
        },
        Value::String(s) => SqlValue::Text(s.clone()),
        Value::Array(_) | Value::Object(_) => SqlValue::Text(value.to_string()),
    }
}
