//! Sequential batch executor
//!
//! Runs statements one at a time, in order, on a single connection. A failed
//! statement is recorded and execution moves on to the next one; there is no
//! transaction around the batch and nothing is retried.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use sqlrun_core::{Connection, QueryResult, Result, SqlRunError, StatementResult};

use super::{command_verb, reports_row_count, statement_preview};

/// Error information for a failed statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementError {
    /// Error message
    pub message: String,
    /// Error code (if available from database)
    pub code: Option<String>,
}

impl StatementError {
    /// Create a new statement error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
        }
    }

    /// Create a statement error with a code
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

impl From<SqlRunError> for StatementError {
    fn from(err: SqlRunError) -> Self {
        match err {
            SqlRunError::Database { code, message } => Self { message, code },
            SqlRunError::Query(message) => Self::new(message),
            other => Self::new(other.to_string()),
        }
    }
}

impl std::fmt::Display for StatementError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(code) = &self.code {
            write!(f, "[{}] {}", code, self.message)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

/// What happened to one statement
#[derive(Debug, Clone)]
pub enum StatementOutcome {
    /// The statement returned at least one row
    Rows(QueryResult),
    /// The statement completed without rows.
    ///
    /// `affected_rows` is `None` when the engine does not report a count for
    /// this kind of statement.
    Command {
        command: String,
        affected_rows: Option<u64>,
    },
    /// The statement failed
    Failed(StatementError),
}

impl StatementOutcome {
    /// Classify a driver result for `sql`
    pub fn from_result(sql: &str, result: Result<StatementResult>) -> Self {
        match result {
            Ok(StatementResult {
                result: Some(rows), ..
            }) if rows.has_rows() => StatementOutcome::Rows(rows),
            Ok(StatementResult { affected_rows, .. }) => {
                let command = command_verb(sql).unwrap_or_else(|| "UNKNOWN".to_string());
                let affected_rows = if reports_row_count(&command) {
                    affected_rows
                } else {
                    None
                };
                StatementOutcome::Command {
                    command,
                    affected_rows,
                }
            }
            Err(e) => StatementOutcome::Failed(e.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        !self.is_failed()
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, StatementOutcome::Failed(_))
    }
}

/// Result of executing a single statement in the batch
#[derive(Debug, Clone)]
pub struct BatchResult {
    /// Index of this statement in the batch (0-based)
    pub index: usize,
    /// The SQL that was executed
    pub sql: String,
    /// What the statement produced
    pub outcome: StatementOutcome,
    /// Execution time for this statement
    pub execution_time: Duration,
}

impl BatchResult {
    pub fn new(index: usize, sql: String, outcome: StatementOutcome, duration: Duration) -> Self {
        Self {
            index,
            sql,
            outcome,
            execution_time: duration,
        }
    }

    /// Check if this result represents a successful execution
    pub fn is_success(&self) -> bool {
        self.outcome.is_success()
    }

    /// Check if this result represents a failed execution
    pub fn is_failed(&self) -> bool {
        self.outcome.is_failed()
    }

    /// One-line preview of the statement
    pub fn preview(&self, max_chars: usize) -> String {
        statement_preview(&self.sql, max_chars)
    }
}

/// Counters for a finished batch.
///
/// Individual results are handed to the caller as they complete and are not
/// kept here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Number of statements executed
    pub statement_count: usize,
    /// Number of successful statements
    pub success_count: usize,
    /// Number of failed statements
    pub failure_count: usize,
    /// Total execution time for the entire batch
    pub total_execution_time: Duration,
}

impl BatchSummary {
    fn record(&mut self, result: &BatchResult) {
        self.statement_count += 1;
        if result.is_failed() {
            self.failure_count += 1;
        } else {
            self.success_count += 1;
        }
    }

    /// Check if all statements executed successfully
    pub fn all_succeeded(&self) -> bool {
        self.failure_count == 0
    }

    /// Check if any statement failed
    pub fn has_failures(&self) -> bool {
        self.failure_count > 0
    }
}

/// Batch executor for running a script's statements
#[derive(Debug, Clone, Default)]
pub struct BatchExecutor;

impl BatchExecutor {
    pub fn new() -> Self {
        Self
    }

    /// Execute `statements` in order on `conn`.
    ///
    /// `on_result` is called with every statement's result as soon as it
    /// completes. A failed statement never stops the batch.
    pub async fn execute<F>(
        &self,
        conn: &dyn Connection,
        statements: &[String],
        mut on_result: F,
    ) -> BatchSummary
    where
        F: FnMut(&BatchResult),
    {
        let batch_start = Instant::now();
        let mut summary = BatchSummary::default();

        tracing::debug!(
            statements = statements.len(),
            driver = conn.driver_name(),
            "executing batch"
        );

        for (index, sql) in statements.iter().enumerate() {
            let result = self.execute_single(conn, index, sql).await;
            summary.record(&result);
            on_result(&result);
        }

        summary.total_execution_time = batch_start.elapsed();

        tracing::debug!(
            succeeded = summary.success_count,
            failed = summary.failure_count,
            elapsed_ms = summary.total_execution_time.as_millis() as u64,
            "batch finished"
        );

        summary
    }

    /// Execute a single statement
    pub async fn execute_single(&self, conn: &dyn Connection, index: usize, sql: &str) -> BatchResult {
        let start = Instant::now();
        let result = conn.simple_query(sql).await;
        let duration = start.elapsed();

        let outcome = StatementOutcome::from_result(sql, result);
        match &outcome {
            StatementOutcome::Failed(error) => tracing::warn!(
                index,
                code = error.code.as_deref(),
                error = %error.message,
                "statement failed"
            ),
            _ => tracing::debug!(
                index,
                elapsed_ms = duration.as_millis() as u64,
                "statement succeeded"
            ),
        }

        BatchResult::new(index, sql.to_string(), outcome, duration)
    }
}
