// LightBnB - data access layer for a property rental listing application
// This is the library root that exposes the public API

pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod query;
pub mod storage;

// Re-export commonly used types for convenience
pub use config::{Config, DatabaseConfig, SearchConfig};
pub use database::Database;
pub use error::{DataError, Result};
pub use models::{GuestReservation, NewProperty, NewUser, Property, User};
pub use query::{
    search::build_search_query, ParameterizedQuery, PropertySearch, QueryParser, QueryRunner,
    QueryShape, RowSet, SearchCriteria, SearchForm,
};
pub use storage::{Row, SqliteStore, Value};
