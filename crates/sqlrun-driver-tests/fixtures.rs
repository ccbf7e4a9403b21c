//! Core test fixtures: logging, connection strings and connections.

use anyhow::{Context, Result};
use sqlrun_core::security::TlsConfig;
use sqlrun_core::{Connection, ConnectionConfig, DatabaseDriver};
use sqlrun_driver_postgres::PostgresDriver;
use std::env;
use std::sync::{Arc, Once};

use crate::test_containers::postgres_container;

/// Environment variable naming an existing server to test against
pub const DATABASE_URL_ENV: &str = "SQLRUN_TEST_DATABASE_URL";

static LOGGING: Once = Once::new();

/// Route tracing output through the test harness, once per process
pub fn init_test_logging() {
    LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}

/// Connection settings for the test server.
///
/// TLS is disabled because the container does not offer it.
pub async fn test_config() -> Result<ConnectionConfig> {
    init_test_logging();

    let url = match env::var(DATABASE_URL_ENV) {
        Ok(url) if !url.trim().is_empty() => url,
        _ => postgres_container().await?.url(),
    };

    Ok(ConnectionConfig::new(url)
        .with_tls(TlsConfig::disabled())
        .with_application_name("sqlrun-driver-tests"))
}

/// A fresh connection to the test server
pub async fn test_connection() -> Result<Arc<dyn Connection>> {
    let config = test_config().await?;
    PostgresDriver::new()
        .connect(&config)
        .await
        .context("failed to connect to the PostgreSQL test server")
}
