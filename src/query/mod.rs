// Query module - builds parameterized SQL and hands it to a runner
pub mod executor;
pub mod parser;
pub mod search;
pub mod statements;

use crate::error::{DataError, Result};
use crate::storage::Value;
use serde::Serialize;

pub use executor::{QueryRunner, Record, RowSet};
pub use parser::{QueryParser, QueryShape};
pub use search::{PropertySearch, SearchCriteria, SearchForm};

/// A query text with `$n` placeholders plus the values bound to them
/// Placeholder `$n` refers to `params[n - 1]`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterizedQuery {
    pub sql: String,
    pub params: Vec<Value>,
}

impl ParameterizedQuery {
    pub fn new(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    /// Parse the query text and verify that its placeholders are exactly
    /// $1..=$N for N bound parameters
    pub fn check(&self) -> Result<QueryShape> {
        let shape = QueryParser::inspect(&self.sql)?;

        let mut ordinals = shape.placeholders.clone();
        ordinals.sort_unstable();
        ordinals.dedup();

        let expected: Vec<usize> = (1..=self.params.len()).collect();
        if ordinals != expected {
            return Err(DataError::Placeholder(format!(
                "query references {:?} but {} parameter(s) are bound",
                ordinals,
                self.params.len()
            )));
        }

        Ok(shape)
    }
}
