//! Scripted connections and drivers for tests that must not touch a database

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sqlrun_core::{
    Connection, ConnectionConfig, DatabaseDriver, QueryResult, Result, SqlRunError,
    StatementResult, Value,
};

type Responder = Box<dyn Fn(&str) -> Result<StatementResult> + Send + Sync>;

/// A connection that answers each statement with a caller-supplied function
/// and records what it was asked to run.
pub struct ScriptedConnection {
    responder: Responder,
    executed: Mutex<Vec<String>>,
    closed: AtomicBool,
    close_calls: AtomicUsize,
}

impl ScriptedConnection {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&str) -> Result<StatementResult> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            executed: Mutex::new(Vec::new()),
            closed: AtomicBool::new(false),
            close_calls: AtomicUsize::new(0),
        }
    }

    /// Statements executed so far, in order
    pub fn executed(&self) -> Vec<String> {
        self.executed
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// How many times `close` was called
    pub fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connection for ScriptedConnection {
    fn driver_name(&self) -> &str {
        "scripted"
    }

    async fn simple_query(&self, sql: &str) -> Result<StatementResult> {
        if self.is_closed() {
            return Err(SqlRunError::Closed);
        }
        self.executed
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(sql.to_string());
        (self.responder)(sql)
    }

    async fn close(&self) -> Result<()> {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

/// A driver that hands out one shared [`ScriptedConnection`], or refuses to
/// connect at all.
pub struct ScriptedDriver {
    connection: Option<Arc<ScriptedConnection>>,
    connect_calls: AtomicUsize,
}

impl ScriptedDriver {
    pub fn new(connection: Arc<ScriptedConnection>) -> Self {
        Self {
            connection: Some(connection),
            connect_calls: AtomicUsize::new(0),
        }
    }

    /// A driver whose every connection attempt fails
    pub fn unreachable() -> Self {
        Self {
            connection: None,
            connect_calls: AtomicUsize::new(0),
        }
    }

    pub fn connect_calls(&self) -> usize {
        self.connect_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DatabaseDriver for ScriptedDriver {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn url_schemes(&self) -> &'static [&'static str] {
        &["scripted"]
    }

    async fn connect(&self, config: &ConnectionConfig) -> Result<Arc<dyn Connection>> {
        self.connect_calls.fetch_add(1, Ordering::SeqCst);
        match &self.connection {
            Some(connection) => Ok(connection.clone()),
            None => Err(SqlRunError::Connection(format!(
                "could not reach {}",
                config.url
            ))),
        }
    }
}

/// A statement result holding the given text rows
pub fn text_rows(columns: &[&str], rows: &[&[Option<&str>]]) -> StatementResult {
    let columns = columns.iter().map(|c| c.to_string()).collect();
    let rows = rows
        .iter()
        .map(|row| row.iter().map(|cell| Value::from(*cell)).collect())
        .collect();
    StatementResult::rows(QueryResult::from_rows(columns, rows))
}
