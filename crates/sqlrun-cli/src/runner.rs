//! One run of a SQL file: connect, read, split, execute, report

use std::io::{self, Write};
use std::path::PathBuf;

use sqlrun_core::{Connection, DatabaseDriver, SqlRunError, with_connection};
use sqlrun_query::{BatchExecutor, BatchSummary, split_statements};

use crate::config::RunConfig;
use crate::report::Reporter;

/// Failures that end a run
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Failed to read {}: {source}", path.display())]
    ReadScript { path: PathBuf, source: io::Error },

    #[error("Failed to write report: {0}")]
    Output(#[from] io::Error),
}

fn connection_message(err: SqlRunError) -> String {
    match err {
        SqlRunError::Connection(message) => message,
        other => other.to_string(),
    }
}

/// Run every statement of the configured file.
///
/// The connection is opened before the file is read and is closed before
/// this returns, whatever the outcome. Failed statements are reported and do
/// not make the run fail.
pub async fn run<O: Write, E: Write>(
    config: &RunConfig,
    driver: &dyn DatabaseDriver,
    reporter: &mut Reporter<O, E>,
) -> Result<BatchSummary, RunError> {
    let conn = driver
        .connect(&config.connection)
        .await
        .map_err(|e| RunError::Connect(connection_message(e)))?;

    let summary = with_connection(conn, |conn| {
        let reporter = &mut *reporter;
        async move { run_script(conn.as_ref(), config, reporter).await }
    })
    .await?;

    reporter.done()?;
    Ok(summary)
}

async fn run_script<O: Write, E: Write>(
    conn: &dyn Connection,
    config: &RunConfig,
    reporter: &mut Reporter<O, E>,
) -> Result<BatchSummary, RunError> {
    reporter.connected()?;

    let script = tokio::fs::read_to_string(&config.sql_file)
        .await
        .map_err(|source| RunError::ReadScript {
            path: config.sql_file.clone(),
            source,
        })?;

    let statements = split_statements(&script);
    tracing::info!(
        file = %config.sql_file.display(),
        statements = statements.len(),
        "script loaded"
    );

    let mut write_error = None;
    let summary = BatchExecutor::new()
        .execute(conn, &statements, |result| {
            if let Err(e) = reporter.statement(result) {
                write_error.get_or_insert(e);
            }
        })
        .await;

    match write_error {
        Some(e) => Err(RunError::Output(e)),
        None => Ok(summary),
    }
}
