// Error types for the data access layer
// Every fallible library operation returns this error

use thiserror::Error;

/// Result type alias used across the crate
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors raised while building, running, or decoding queries
#[derive(Error, Debug)]
pub enum DataError {
    /// A search filter was malformed or out of range
    #[error("Invalid filter '{field}' = {value:?}: {reason}")]
    InvalidFilter {
        field: &'static str,
        value: String,
        reason: String,
    },

    /// The row limit must be a positive integer
    #[error("Invalid limit {0}: must be a positive integer")]
    InvalidLimit(i64),

    /// Placeholders in the query text do not line up with the bind list
    #[error("Placeholder mismatch: {0}")]
    Placeholder(String),

    /// The query text could not be parsed
    #[error("SQL error: {0}")]
    Sql(String),

    /// The store failed to run the query
    #[error("Query failed: {0}")]
    Query(#[from] rusqlite::Error),

    /// A returned row does not fit the record it is decoded into
    #[error("Cannot decode column '{column}': {reason}")]
    Decode { column: String, reason: String },

    /// An INSERT ... RETURNING statement came back without a row
    #[error("No row returned by {0}")]
    MissingRow(&'static str),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl DataError {
    /// True when the error comes from caller input rather than the store
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            DataError::InvalidFilter { .. } | DataError::InvalidLimit(_)
        )
    }

    pub(crate) fn invalid_filter(
        field: &'static str,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        DataError::InvalidFilter {
            field,
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn decode(column: &str, reason: impl Into<String>) -> Self {
        DataError::Decode {
            column: column.to_string(),
            reason: reason.into(),
        }
    }
}
