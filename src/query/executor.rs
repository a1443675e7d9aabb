// Query execution seam
// A runner takes a parameterized query and returns the rows it produced

use super::ParameterizedQuery;
use crate::error::{DataError, Result};
use crate::storage::{Row, Value};
use serde::Serialize;

/// Anything that can run a parameterized query against a relational store
///
/// Implementations are shared between threads and may be called concurrently;
/// each call is independent of every other.
pub trait QueryRunner: Send + Sync {
    fn run(&self, query: &ParameterizedQuery) -> Result<RowSet>;
}

impl<R: QueryRunner + ?Sized> QueryRunner for &R {
    fn run(&self, query: &ParameterizedQuery) -> Result<RowSet> {
        (**self).run(query)
    }
}

impl<R: QueryRunner + ?Sized> QueryRunner for std::sync::Arc<R> {
    fn run(&self, query: &ParameterizedQuery) -> Result<RowSet> {
        (**self).run(query)
    }
}

/// Rows returned by a query together with their column names
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RowSet {
    pub column_names: Vec<String>,
    pub rows: Vec<Row>,
}

impl RowSet {
    pub fn new(column_names: Vec<String>, rows: Vec<Row>) -> Self {
        Self { column_names, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Iterate rows as name-addressable records
    pub fn records(&self) -> impl Iterator<Item = Record<'_>> {
        self.rows.iter().map(move |row| Record {
            column_names: &self.column_names,
            row,
        })
    }

    /// The first row, if any
    pub fn first(&self) -> Option<Record<'_>> {
        self.records().next()
    }

    /// Format the rows as a box-drawn table for display
    pub fn format(&self) -> String {
        if self.rows.is_empty() {
            return "No rows found".to_string();
        }

        // Calculate column widths
        let mut widths: Vec<usize> = self.column_names.iter().map(|c| c.chars().count()).collect();

        for row in &self.rows {
            for (i, value) in row.values.iter().enumerate().take(widths.len()) {
                widths[i] = widths[i].max(value.to_string().chars().count());
            }
        }

        let mut result = String::new();

        result.push_str(&Self::border('┌', '┬', '┐', &widths));

        // Column names
        result.push('│');
        for (name, width) in self.column_names.iter().zip(&widths) {
            result.push_str(&format!(" {:<width$} │", name, width = width));
        }
        result.push('\n');

        result.push_str(&Self::border('├', '┼', '┤', &widths));

        // Data rows
        for row in &self.rows {
            result.push('│');
            for (value, width) in row.values.iter().zip(&widths) {
                result.push_str(&format!(" {:<width$} │", value.to_string(), width = width));
            }
            result.push('\n');
        }

        result.push_str(&Self::border('└', '┴', '┘', &widths));

        result.push_str(&format!("\n{} row(s) returned", self.rows.len()));

        result
    }

    fn border(left: char, middle: char, right: char, widths: &[usize]) -> String {
        let mut line = String::new();
        line.push(left);
        for (i, width) in widths.iter().enumerate() {
            line.push_str(&"─".repeat(width + 2));
            if i < widths.len() - 1 {
                line.push(middle);
            }
        }
        line.push(right);
        line.push('\n');
        line
    }
}

/// One row viewed through its column names
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    column_names: &'a [String],
    row: &'a Row,
}

impl<'a> Record<'a> {
    /// Raw value of a column; the first column with that name wins
    pub fn get(&self, column: &str) -> Result<&'a Value> {
        self.column_names
            .iter()
            .position(|name| name == column)
            .and_then(|index| self.row.values.get(index))
            .ok_or_else(|| DataError::decode(column, "column not present in result"))
    }

    pub fn i64(&self, column: &str) -> Result<i64> {
        let value = self.get(column)?;
        value
            .as_i64()
            .ok_or_else(|| DataError::decode(column, format!("expected integer, got {}", value.type_name())))
    }

    pub fn opt_i64(&self, column: &str) -> Result<Option<i64>> {
        match self.get(column)? {
            Value::Null => Ok(None),
            _ => self.i64(column).map(Some),
        }
    }

    pub fn opt_f64(&self, column: &str) -> Result<Option<f64>> {
        let value = self.get(column)?;
        match value {
            Value::Null => Ok(None),
            // Some drivers hand back aggregates such as avg() as text
            Value::Text(text) => text
                .parse::<f64>()
                .map(Some)
                .map_err(|_| DataError::decode(column, format!("expected number, got {:?}", text))),
            _ => value
                .as_f64()
                .map(Some)
                .ok_or_else(|| DataError::decode(column, format!("expected number, got {}", value.type_name()))),
        }
    }

    pub fn text(&self, column: &str) -> Result<String> {
        let value = self.get(column)?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| DataError::decode(column, format!("expected text, got {}", value.type_name())))
    }

    pub fn opt_text(&self, column: &str) -> Result<Option<String>> {
        match self.get(column)? {
            Value::Null => Ok(None),
            _ => self.text(column).map(Some),
        }
    }

    pub fn bool(&self, column: &str) -> Result<bool> {
        let value = self.get(column)?;
        value
            .as_bool()
            .ok_or_else(|| DataError::decode(column, format!("expected boolean, got {}", value.type_name())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RowSet {
        RowSet::new(
            vec!["id".into(), "title".into(), "average_rating".into()],
            vec![
                Row::new(vec![Value::Integer(1), Value::from("Cabin"), Value::Real(4.5)]),
                Row::new(vec![Value::Integer(2), Value::from("Loft"), Value::Null]),
            ],
        )
    }

    #[test]
    fn records_decode_by_column_name() {
        let rows = sample();
        let first = rows.first().unwrap();
        assert_eq!(first.i64("id").unwrap(), 1);
        assert_eq!(first.text("title").unwrap(), "Cabin");
        assert_eq!(first.opt_f64("average_rating").unwrap(), Some(4.5));

        let second = rows.records().nth(1).unwrap();
        assert_eq!(second.opt_f64("average_rating").unwrap(), None);
    }

    #[test]
    fn decode_errors_name_the_column() {
        let rows = sample();
        let first = rows.first().unwrap();
        match first.i64("title") {
            Err(DataError::Decode { column, .. }) => assert_eq!(column, "title"),
            other => panic!("expected decode error, got {:?}", other),
        }
        assert!(matches!(first.get("missing"), Err(DataError::Decode { .. })));
    }

    #[test]
    fn numeric_text_decodes_as_float() {
        let rows = RowSet::new(
            vec!["average_rating".into()],
            vec![Row::new(vec![Value::from("3.25")])],
        );
        assert_eq!(rows.first().unwrap().opt_f64("average_rating").unwrap(), Some(3.25));
    }

    #[test]
    fn format_draws_a_table() {
        let table = sample().format();
        assert!(table.starts_with('┌'));
        assert!(table.contains("│ title │") || table.contains("│ title "));
        assert!(table.contains("Cabin"));
        assert!(table.contains("NULL"));
        assert!(table.ends_with("2 row(s) returned"));
    }

    #[test]
    fn format_empty_set() {
        assert_eq!(RowSet::default().format(), "No rows found");
    }
}
