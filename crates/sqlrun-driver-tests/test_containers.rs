//! Docker container management for integration tests.
//!
//! The first test that asks for a PostgreSQL server starts one; later tests
//! reuse it. The container lives until the test process exits.

use std::sync::Mutex;
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;

/// Information about a running test container
#[derive(Debug, Clone)]
pub struct ContainerInfo {
    /// Host address (typically 127.0.0.1)
    pub host: String,
    /// Port number (randomly assigned by testcontainers)
    pub port: u16,
    /// Database name
    pub database: String,
    /// Username for authentication
    pub username: String,
    /// Password for authentication
    pub password: String,
}

impl ContainerInfo {
    /// Connection URL for the container
    pub fn url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database
        )
    }
}

struct PostgresContainer {
    #[allow(dead_code)]
    inner: ContainerAsync<Postgres>,
    info: ContainerInfo,
}

static POSTGRES_CONTAINER: Mutex<Option<PostgresContainer>> = Mutex::new(None);

/// Start (or reuse) the PostgreSQL test container
pub async fn postgres_container() -> anyhow::Result<ContainerInfo> {
    {
        let guard = POSTGRES_CONTAINER
            .lock()
            .map_err(|e| anyhow::anyhow!("failed to lock postgres container: {}", e))?;

        if let Some(ref container) = *guard {
            return Ok(container.info.clone());
        }
    }

    tracing::info!("starting PostgreSQL test container");

    let container = Postgres::default()
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("failed to start postgres container: {}", e))?;

    let host_port = container
        .get_host_port_ipv4(5432)
        .await
        .map_err(|e| anyhow::anyhow!("failed to get postgres port: {}", e))?;

    // testcontainers-modules Postgres defaults: postgres user/password with "postgres" database
    let info = ContainerInfo {
        host: "127.0.0.1".to_string(),
        port: host_port,
        database: "postgres".to_string(),
        username: "postgres".to_string(),
        password: "postgres".to_string(),
    };

    tracing::info!(port = host_port, "PostgreSQL test container started");

    let mut guard = POSTGRES_CONTAINER
        .lock()
        .map_err(|e| anyhow::anyhow!("failed to lock postgres container: {}", e))?;

    // Another test may have won the race; keep the first container.
    if let Some(ref existing) = *guard {
        return Ok(existing.info.clone());
    }

    *guard = Some(PostgresContainer {
        inner: container,
        info: info.clone(),
    });

    Ok(info)
}
