//! Query execution gateway around the embedded SQL engine.
//!
//! The gateway owns the in-memory connection holding the fixed dataset and
//! forwards raw SQL text to it verbatim. No parsing happens here: whatever
//! the player typed, or the builder compiled, goes straight to the engine,
//! and whatever the engine answers is normalized into a [`QueryResult`]
//! (ordered column names plus ordered rows of [`Value`] cells). Engine
//! errors come back word for word inside [`SleuthError::Engine`].

use std::fmt;

use rusqlite::Connection;
use rusqlite::types::ValueRef;
use serde::{Deserialize, Serialize};

use crate::dataset;
use crate::error::{Result, SleuthError};

/// One cell of a result row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl Value {
    fn from_engine(value: ValueRef) -> Value {
        match value {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(i) => Value::Integer(i),
            ValueRef::Real(r) => Value::Real(r),
            ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => Value::Text(String::from_utf8_lossy(b).into_owned()),
        }
    }

    /// Numeric reading of a cell, tolerating digits stored as text.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            Value::Text(t) => t.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(t) => Some(t),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Null => write!(f, ""),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Real(r) => write!(f, "{}", r),
            Value::Text(t) => write!(f, "{}", t),
        }
    }
}

/// Normalized shape of everything the engine returns: a parallel list of
/// column names and an ordered list of rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl QueryResult {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// A result without rows or without column names is "nothing yet", not
    /// an error.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.columns.is_empty()
    }

    /// Position of a column by name, ignoring ASCII case, since the engine
    /// reports whatever casing the projection used.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|column| column.eq_ignore_ascii_case(name))
    }
}

/// Thin wrapper over the embedded engine with the dataset already loaded.
pub struct Gateway {
    connection: Connection,
}

impl Gateway {
    pub fn open() -> Result<Self> {
        let connection = Connection::open_in_memory()?;
        dataset::seed(&connection)?;
        Ok(Self { connection })
    }

    /// Run one SQL statement and collect the full result.
    pub fn execute(&self, sql: &str) -> Result<QueryResult> {
        let mut statement = self
            .connection
            .prepare(sql)
            .map_err(|e| SleuthError::Engine(e.to_string()))?;
        let columns: Vec<String> = statement
            .column_names()
            .iter()
            .map(|column| column.to_string())
            .collect();
        let width = columns.len();
        let mut collected = Vec::new();
        let mut rows = statement
            .query([])
            .map_err(|e| SleuthError::Engine(e.to_string()))?;
        while let Some(row) = rows.next().map_err(|e| SleuthError::Engine(e.to_string()))? {
            let mut cells = Vec::with_capacity(width);
            for index in 0..width {
                let cell = row
                    .get_ref(index)
                    .map_err(|e| SleuthError::Engine(e.to_string()))?;
                cells.push(Value::from_engine(cell));
            }
            collected.push(cells);
        }
        Ok(QueryResult {
            columns,
            rows: collected,
        })
    }
}
