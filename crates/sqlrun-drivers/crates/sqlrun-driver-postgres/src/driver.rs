//! PostgreSQL driver implementation

use async_trait::async_trait;
use sqlrun_core::{Connection, ConnectionConfig, DatabaseDriver, Result};
use std::sync::Arc;

use crate::PostgresConnection;

/// PostgreSQL database driver
pub struct PostgresDriver;

impl PostgresDriver {
    /// Create a new PostgreSQL driver instance
    pub fn new() -> Self {
        tracing::debug!("PostgreSQL driver initialized");
        Self
    }
}

impl Default for PostgresDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DatabaseDriver for PostgresDriver {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn display_name(&self) -> &'static str {
        "PostgreSQL"
    }

    fn url_schemes(&self) -> &'static [&'static str] {
        &["postgres", "postgresql"]
    }

    fn default_port(&self) -> Option<u16> {
        Some(5432)
    }

    #[tracing::instrument(skip(self, config), fields(tls_mode = %config.tls.mode))]
    async fn connect(&self, config: &ConnectionConfig) -> Result<Arc<dyn Connection>> {
        let conn = PostgresConnection::connect(config).await.inspect_err(|e| {
            tracing::error!(error = %e, "failed to connect to PostgreSQL database");
        })?;

        Ok(Arc::new(conn))
    }
}
