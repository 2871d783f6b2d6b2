//! Visual query builder model and its SQL compiler.
//!
//! The model mirrors what the drag-and-drop surface holds: selected columns
//! in selection order, tables in first-referenced order, and conditions with
//! their connectors. [`QueryModel::to_sql`] is a pure function of the model;
//! every mutation goes through an explicit method, and registering a table
//! is its own step rather than a hidden side effect of rendering.
//!
//! The compiler degrades instead of failing: missing tables render as a
//! visible placeholder, incomplete conditions are left out of the emitted
//! text (but stay in the model), and the only rejected operation is leaving
//! the column stage with nothing selected.

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;

use crate::dataset;
use crate::error::{Result, SleuthError};

/// Rendered in place of a FROM clause so a half-built query is never
/// mistaken for runnable SQL.
pub const NO_TABLE: &str = "[no table selected]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connector {
    And,
    Or,
}

impl fmt::Display for Connector {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Connector::And => write!(f, "AND"),
            Connector::Or => write!(f, "OR"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    Like,
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let symbol = match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Lt => "<",
            Operator::Gt => ">",
            Operator::Le => "<=",
            Operator::Ge => ">=",
            Operator::Like => "LIKE",
        };
        write!(f, "{}", symbol)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedColumn {
    pub table: String,
    pub column: String,
}

#[derive(Debug, Clone)]
pub struct Condition {
    /// Qualified column name, e.g. `case_files.severity`.
    pub column: String,
    pub operator: Operator,
    pub value: String,
    /// How this condition attaches to the one before it. Ignored on the
    /// first rendered condition.
    pub connector: Connector,
}

lazy_static! {
    static ref NUMERIC_LITERAL: Regex = Regex::new(r"^-?\d+(\.\d+)?$").unwrap();
    /// Columns whose values are numbers by convention: identifiers, scores
    /// and flags.
    static ref NUMERIC_COLUMN: Regex =
        Regex::new(r"(?:^|[._])(id|[a-z]+_id|severity|suspicion|reliability|is_key)$").unwrap();
}

#[derive(Debug, Default)]
pub struct QueryModel {
    columns: Vec<SelectedColumn>,
    tables: Vec<String>,
    conditions: Vec<Condition>,
}

impl QueryModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select a column. Idempotent: re-adding a `(table, column)` pair that
    /// is already selected is a no-op and returns false. Selecting a column
    /// of a table the model has not seen registers that table.
    pub fn add_column(&mut self, table: &str, column: &str) -> bool {
        let already = self
            .columns
            .iter()
            .any(|selected| selected.table == table && selected.column == column);
        if already {
            return false;
        }
        self.register_table(table);
        self.columns.push(SelectedColumn {
            table: table.to_string(),
            column: column.to_string(),
        });
        true
    }

    /// Select every known column of a table, with per-column idempotence.
    /// Returns how many columns were newly added.
    pub fn add_all_columns(&mut self, table: &str) -> usize {
        let columns = match dataset::columns_of(table) {
            Some(columns) => columns,
            None => return 0,
        };
        let mut added = 0;
        for column in columns {
            if self.add_column(table, column) {
                added += 1;
            }
        }
        added
    }

    /// Make a table part of the FROM set, preserving first-referenced order.
    pub fn register_table(&mut self, table: &str) {
        if !self.tables.iter().any(|known| known == table) {
            self.tables.push(table.to_string());
        }
    }

    pub fn add_condition(
        &mut self,
        column: &str,
        operator: Operator,
        value: &str,
        connector: Connector,
    ) {
        self.conditions.push(Condition {
            column: column.to_string(),
            operator,
            value: value.to_string(),
            connector,
        });
    }

    pub fn columns(&self) -> &[SelectedColumn] {
        &self.columns
    }

    pub fn tables(&self) -> &[String] {
        &self.tables
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn clear(&mut self) {
        self.columns.clear();
        self.tables.clear();
        self.conditions.clear();
    }

    /// Gate between the column-picking stage and the condition stage. The
    /// single failing operation in this module.
    pub fn finish_column_stage(&self) -> Result<()> {
        if self.columns.is_empty() {
            return Err(SleuthError::Builder(
                "Select at least one column before moving on.".to_string(),
            ));
        }
        Ok(())
    }

    /// Render the model as SQL text. Pure: calling it any number of times
    /// changes nothing.
    pub fn to_sql(&self) -> String {
        let select = self.select_clause();
        let from = self.from_clause();
        let filter = self.where_clause();
        if filter.is_empty() {
            format!("SELECT {} {}", select, from)
        } else {
            format!("SELECT {} {} WHERE {}", select, from, filter)
        }
    }

    fn select_clause(&self) -> String {
        if self.columns.is_empty() {
            return "*".to_string();
        }
        self.columns
            .iter()
            .map(|selected| format!("{}.{}", selected.table, selected.column))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// One table is a plain FROM; several are joined naively on an `id`
    /// column, each subsequent table against the first. No foreign-key
    /// inference is attempted.
    fn from_clause(&self) -> String {
        match self.tables.len() {
            0 => format!("FROM {}", NO_TABLE),
            1 => format!("FROM {}", self.tables[0]),
            _ => {
                let first = &self.tables[0];
                let mut clause = format!("FROM {}", first);
                for table in &self.tables[1..] {
                    clause.push_str(&format!(" JOIN {} ON {}.id = {}.id", table, first, table));
                }
                clause
            }
        }
    }

    /// Conditions missing a column or a value are skipped here but kept in
    /// the model. Connectors attach left to right; when the connector flips
    /// and more than one condition has accumulated since the last grouping,
    /// the accumulated run is parenthesized before the next condition is
    /// appended. `A AND B OR C AND D` therefore renders as
    /// `((A AND B) OR C) AND D`.
    fn where_clause(&self) -> String {
        let complete = self
            .conditions
            .iter()
            .filter(|condition| !condition.column.is_empty() && !condition.value.trim().is_empty());
        let mut clause = String::new();
        let mut run = 0usize;
        let mut previous: Option<Connector> = None;
        for condition in complete {
            let fragment = render_condition(condition);
            if clause.is_empty() {
                clause = fragment;
                run = 1;
                continue;
            }
            if let Some(last) = previous {
                if last != condition.connector && run > 1 {
                    clause = format!("({})", clause);
                    run = 1;
                }
            }
            clause = format!("{} {} {}", clause, condition.connector, fragment);
            run += 1;
            previous = Some(condition.connector);
        }
        clause
    }
}

fn render_condition(condition: &Condition) -> String {
    let value = condition.value.trim();
    match condition.operator {
        Operator::Like => {
            let pattern = if value.contains('%') {
                value.to_string()
            } else {
                format!("%{}%", value)
            };
            format!("{} LIKE '{}'", condition.column, escape(&pattern))
        }
        operator => {
            if NUMERIC_LITERAL.is_match(value) && NUMERIC_COLUMN.is_match(&condition.column) {
                format!("{} {} {}", condition.column, operator, value)
            } else {
                format!("{} {} '{}'", condition.column, operator, escape(value))
            }
        }
    }
}

fn escape(value: &str) -> String {
    value.replace('\'', "''")
}
