//! Connection trait and scoped connection lifetime

use crate::{Result, StatementResult};
use async_trait::async_trait;
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

/// A database connection
#[async_trait]
pub trait Connection: Send + Sync {
    /// Get the driver name (e.g., "postgresql")
    fn driver_name(&self) -> &str;

    /// Execute one SQL statement as-is, without parameters.
    ///
    /// Drivers send the text through their plain-text protocol so that any
    /// statement the engine accepts interactively can be run.
    async fn simple_query(&self, sql: &str) -> Result<StatementResult>;

    /// Close the connection. Closing twice is a no-op.
    async fn close(&self) -> Result<()>;

    /// Check if the connection is closed
    fn is_closed(&self) -> bool;
}

/// Run `body` with `conn`, then close the connection.
///
/// The connection is closed whether the body returns normally, returns an
/// error, or panics. A panic is resumed once the connection is closed.
pub async fn with_connection<F, Fut, T>(conn: Arc<dyn Connection>, body: F) -> T
where
    F: FnOnce(Arc<dyn Connection>) -> Fut,
    Fut: Future<Output = T>,
{
    let outcome = AssertUnwindSafe(body(Arc::clone(&conn)))
        .catch_unwind()
        .await;

    if let Err(e) = conn.close().await {
        tracing::warn!(error = %e, driver = conn.driver_name(), "failed to close connection");
    } else {
        tracing::debug!(driver = conn.driver_name(), "connection closed");
    }

    match outcome {
        Ok(value) => value,
        Err(panic) => std::panic::resume_unwind(panic),
    }
}
