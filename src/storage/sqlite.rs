// SQLite-backed query runner
// One connection per store, shared between callers behind a mutex

use super::{Row, Value};
use crate::config::DatabaseConfig;
use crate::error::{DataError, Result};
use crate::query::{ParameterizedQuery, QueryRunner, RowSet};
use parking_lot::Mutex;
use rusqlite::types::{ToSql, ToSqlOutput, ValueRef};
use rusqlite::{Connection, OpenFlags};
use std::time::Duration;

/// A relational store that runs `$n`-parameterized queries
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open the database described by the configuration
    pub fn open(config: &DatabaseConfig) -> Result<Self> {
        let conn = if config.is_in_memory() {
            Connection::open_in_memory()?
        } else {
            let flags = if config.read_only {
                OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_URI | OpenFlags::SQLITE_OPEN_NO_MUTEX
            } else {
                OpenFlags::default()
            };
            Connection::open_with_flags(&config.path, flags)?
        };

        conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;

        tracing::debug!(
            path = %config.path.display(),
            read_only = config.read_only,
            "opened sqlite store"
        );

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open a fresh in-memory database
    pub fn open_in_memory() -> Result<Self> {
        Self::open(&DatabaseConfig::in_memory())
    }

    /// Run a batch of plain SQL statements with no parameters (fixture loading)
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        self.conn.lock().execute_batch(sql)?;
        Ok(())
    }
}

impl QueryRunner for SqliteStore {
    fn run(&self, query: &ParameterizedQuery) -> Result<RowSet> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&query.sql)?;

        if stmt.parameter_count() != query.params.len() {
            return Err(DataError::Placeholder(format!(
                "statement expects {} parameter(s), {} bound",
                stmt.parameter_count(),
                query.params.len()
            )));
        }

        // Bind by name so "$3" always receives params[2], whatever the text order
        for (position, value) in query.params.iter().enumerate() {
            let name = format!("${}", position + 1);
            let index = stmt
                .parameter_index(&name)?
                .ok_or_else(|| DataError::Placeholder(format!("{} is not referenced by the query", name)))?;
            stmt.raw_bind_parameter(index, value)?;
        }

        let column_names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let column_count = column_names.len();

        let mut rows = Vec::new();
        let mut cursor = stmt.raw_query();
        while let Some(row) = cursor.next()? {
            let mut values = Vec::with_capacity(column_count);
            for index in 0..column_count {
                values.push(from_sql_ref(row.get_ref(index)?));
            }
            rows.push(Row::new(values));
        }

        tracing::trace!(rows = rows.len(), "query finished");

        Ok(RowSet::new(column_names, rows))
    }
}

fn from_sql_ref(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Integer(i),
        ValueRef::Real(f) => Value::Real(f),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Value::Text(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Owned(rusqlite::types::Value::Null),
            Value::Integer(i) => ToSqlOutput::from(*i),
            Value::Real(f) => ToSqlOutput::from(*f),
            Value::Text(s) => ToSqlOutput::from(s.as_str()),
            Value::Boolean(b) => ToSqlOutput::from(*b),
        })
    }
}
