//! Run configuration resolved from command-line flags and environment

use std::path::PathBuf;
use std::time::Duration;

use sqlrun_core::security::{TlsConfig, TlsMode};
use sqlrun_core::{ConnectionConfig, SqlRunError};

use crate::Cli;

/// Application name reported to the server
const APPLICATION_NAME: &str = "sqlrun";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("DATABASE_URL environment variable is not set")]
    MissingDatabaseUrl,

    #[error("preview width must be at least 1")]
    InvalidPreviewWidth,

    #[error(transparent)]
    Invalid(#[from] SqlRunError),
}

/// Everything a run needs, validated
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub sql_file: PathBuf,
    pub connection: ConnectionConfig,
    pub preview_width: usize,
}

impl RunConfig {
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let url = cli
            .database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or(ConfigError::MissingDatabaseUrl)?;

        if cli.preview_width == 0 {
            return Err(ConfigError::InvalidPreviewWidth);
        }

        let mode: TlsMode = cli.tls_mode.parse()?;
        let mut tls = TlsConfig::new(mode);
        if cli.verify_server {
            tls = tls.verify_server(true);
        }
        if let Some(ca_cert) = &cli.ca_cert {
            tls = tls.ca_cert(ca_cert.clone());
        }
        tls.validate()?;

        let mut connection = ConnectionConfig::new(url)
            .with_tls(tls)
            .with_application_name(APPLICATION_NAME);
        if let Some(secs) = cli.connect_timeout {
            connection = connection.with_connect_timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            sql_file: cli.sql_file.clone(),
            connection,
            preview_width: cli.preview_width,
        })
    }
}
