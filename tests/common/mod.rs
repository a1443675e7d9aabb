// Shared helpers for the integration tests

use lightbnb::{DataError, ParameterizedQuery, QueryRunner, Result, RowSet, SqliteStore};
use std::sync::{Arc, Mutex};

pub const SCHEMA: &str = include_str!("../fixtures/schema.sql");
pub const SEED: &str = include_str!("../fixtures/seed.sql");

/// In-memory store with the listing schema and seed data loaded
#[allow(dead_code)]
pub fn seeded_store() -> SqliteStore {
    let store = SqliteStore::open_in_memory().unwrap();
    store.execute_batch(SCHEMA).unwrap();
    store.execute_batch(SEED).unwrap();
    store
}

/// Runner that records every query and answers with a canned result
#[allow(dead_code)]
pub struct RecordingRunner {
    queries: Mutex<Vec<ParameterizedQuery>>,
    response: std::result::Result<RowSet, String>,
}

#[allow(dead_code)]
impl RecordingRunner {
    pub fn returning(rows: RowSet) -> Self {
        Self {
            queries: Mutex::new(Vec::new()),
            response: Ok(rows),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            queries: Mutex::new(Vec::new()),
            response: Err(message.to_string()),
        }
    }

    pub fn queries(&self) -> Vec<ParameterizedQuery> {
        self.queries.lock().unwrap().clone()
    }
}

impl QueryRunner for RecordingRunner {
    fn run(&self, query: &ParameterizedQuery) -> Result<RowSet> {
        self.queries.lock().unwrap().push(query.clone());
        match &self.response {
            Ok(rows) => Ok(rows.clone()),
            Err(message) => Err(DataError::Sql(message.clone())),
        }
    }
}

/// Captures tracing output for tests.
#[allow(dead_code)]
pub struct TestTracing {
    buffer: Arc<Mutex<Vec<u8>>>,
}

#[allow(dead_code)]
impl TestTracing {
    pub fn new() -> Self {
        Self {
            buffer: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let writer = self.buffer.clone();
        let make_writer = move || TestWriter(writer.clone());
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .without_time()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(make_writer)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn output(&self) -> String {
        let buf = self.buffer.lock().unwrap();
        String::from_utf8_lossy(&buf).to_string()
    }
}

#[allow(dead_code)]
pub struct TestWriter(Arc<Mutex<Vec<u8>>>);

impl std::io::Write for TestWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
