//! PostgreSQL connection implementation

use async_trait::async_trait;
use sqlrun_core::security::TlsMode;
use sqlrun_core::{
    Connection, ConnectionConfig, QueryResult, Result, SqlRunError, StatementResult, Value,
};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_postgres::{Client, NoTls, SimpleQueryMessage};

use crate::tls::{PostgresTlsConnector, ssl_mode_for};

/// Convert a server error into a [`SqlRunError::Database`] carrying its SQLSTATE
fn format_postgres_error(error: &tokio_postgres::Error) -> SqlRunError {
    let Some(db_error) = error.as_db_error() else {
        if error.is_closed() {
            return SqlRunError::Closed;
        }
        return SqlRunError::Query(error.to_string());
    };

    let mut message = db_error.message().to_string();

    if let Some(detail) = db_error.detail()
        && !detail.trim().is_empty()
    {
        message.push_str(&format!(" (detail: {})", detail));
    }

    if let Some(hint) = db_error.hint()
        && !hint.trim().is_empty()
    {
        message.push_str(&format!(" (hint: {})", hint));
    }

    SqlRunError::Database {
        code: Some(db_error.code().code().to_string()),
        message,
    }
}

/// Message for a failed connection attempt
fn connect_error(error: tokio_postgres::Error) -> SqlRunError {
    let message = match error.as_db_error() {
        Some(db_error) => db_error.message().to_string(),
        None => error.to_string(),
    };
    SqlRunError::Connection(message)
}

/// Drive the connection's socket until the client is dropped
fn spawn_connection<S, T>(connection: tokio_postgres::Connection<S, T>) -> JoinHandle<()>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    T: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            tracing::error!(error = %e, "PostgreSQL connection error");
        }
    })
}

/// Fold the messages of one simple-query exchange into a single result.
///
/// A query string may hold several commands; the last one wins.
fn collect_messages(messages: Vec<SimpleQueryMessage>) -> StatementResult {
    let mut last = StatementResult::default();
    let mut columns: Option<Vec<String>> = None;
    let mut rows: Vec<Vec<Value>> = Vec::new();

    for message in messages {
        match message {
            SimpleQueryMessage::RowDescription(description) => {
                columns = Some(description.iter().map(|c| c.name().to_string()).collect());
                rows.clear();
            }
            SimpleQueryMessage::Row(row) => {
                if columns.is_none() {
                    columns = Some(row.columns().iter().map(|c| c.name().to_string()).collect());
                }
                let values = (0..row.len()).map(|idx| Value::from(row.get(idx))).collect();
                rows.push(values);
            }
            SimpleQueryMessage::CommandComplete(count) => {
                last = match columns.take() {
                    Some(columns) => {
                        let result = QueryResult::from_rows(columns, std::mem::take(&mut rows));
                        StatementResult {
                            result: Some(result),
                            affected_rows: Some(count),
                        }
                    }
                    None => StatementResult::command(Some(count)),
                };
            }
            _ => {}
        }
    }

    last
}

/// PostgreSQL connection wrapper
pub struct PostgresConnection {
    client: Mutex<Option<Client>>,
    driver_task: Mutex<Option<JoinHandle<()>>>,
    closed: AtomicBool,
}

impl PostgresConnection {
    /// Connect using a connection string and the TLS settings in `config`
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let mut pg_config: tokio_postgres::Config = config.url.parse().map_err(|e| {
            SqlRunError::Configuration(format!("invalid connection string: {}", e))
        })?;

        pg_config.ssl_mode(ssl_mode_for(config.tls.mode));
        if let Some(timeout) = config.connect_timeout {
            pg_config.connect_timeout(timeout);
        }
        if let Some(name) = &config.application_name
            && pg_config.get_application_name().is_none()
        {
            pg_config.application_name(name);
        }

        tracing::debug!(
            hosts = ?pg_config.get_hosts(),
            database = pg_config.get_dbname(),
            tls_mode = %config.tls.mode,
            "connecting to PostgreSQL database"
        );

        let (client, driver_task) = if config.tls.mode == TlsMode::Disable {
            let (client, connection) = pg_config.connect(NoTls).await.map_err(connect_error)?;
            (client, spawn_connection(connection))
        } else {
            let tls = PostgresTlsConnector::build(&config.tls)?;
            let (client, connection) = pg_config.connect(tls).await.map_err(connect_error)?;
            (client, spawn_connection(connection))
        };

        tracing::info!(
            database = pg_config.get_dbname(),
            "PostgreSQL connection established"
        );

        Ok(Self {
            client: Mutex::new(Some(client)),
            driver_task: Mutex::new(Some(driver_task)),
            closed: AtomicBool::new(false),
        })
    }
}

#[async_trait]
impl Connection for PostgresConnection {
    fn driver_name(&self) -> &str {
        "postgres"
    }

    #[tracing::instrument(skip(self, sql), fields(sql_preview = %sql.chars().take(100).collect::<String>()))]
    async fn simple_query(&self, sql: &str) -> Result<StatementResult> {
        let guard = self.client.lock().await;
        let client = guard.as_ref().ok_or(SqlRunError::Closed)?;

        let messages = client
            .simple_query(sql)
            .await
            .map_err(|e| format_postgres_error(&e))?;

        let result = collect_messages(messages);
        tracing::debug!(
            affected_rows = result.affected_rows,
            has_rows = result.result.is_some(),
            "statement executed"
        );
        Ok(result)
    }

    async fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        tracing::debug!("closing PostgreSQL connection");

        // Dropping the client ends the connection future.
        drop(self.client.lock().await.take());

        if let Some(task) = self.driver_task.lock().await.take()
            && let Err(e) = task.await
        {
            tracing::warn!(error = %e, "PostgreSQL connection task did not finish cleanly");
        }

        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}
