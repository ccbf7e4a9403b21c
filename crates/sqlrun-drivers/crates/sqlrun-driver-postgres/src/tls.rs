//! PostgreSQL TLS Support
//!
//! Builds the native-tls connector handed to tokio-postgres and maps
//! [`TlsMode`] onto the driver's own `sslmode` setting.

use native_tls::{Certificate, TlsConnector as NativeTlsConnector, TlsConnectorBuilder};
use postgres_native_tls::MakeTlsConnector;
use sqlrun_core::SqlRunError;
use sqlrun_core::security::{TlsConfig, TlsMode};
use std::fs;
use std::path::Path;
use tokio_postgres::config::SslMode;
use tracing::debug;

/// Error types for TLS operations
#[derive(Debug, thiserror::Error)]
pub enum TlsError {
    /// Failed to load CA certificate
    #[error("Failed to load CA certificate from {path}: {source}")]
    CaCertLoadFailed {
        path: String,
        source: std::io::Error,
    },

    /// Invalid CA certificate format
    #[error("Invalid CA certificate format: {0}")]
    InvalidCaCert(String),

    /// TLS configuration error
    #[error("TLS configuration error: {0}")]
    ConfigurationError(String),

    /// TLS mode not supported
    #[error("TLS mode {mode} is not supported for this operation")]
    UnsupportedMode { mode: TlsMode },
}

impl From<TlsError> for SqlRunError {
    fn from(err: TlsError) -> Self {
        SqlRunError::Tls(err.to_string())
    }
}

/// A PostgreSQL TLS connector builder
///
/// Builds TLS connectors suitable for use with tokio-postgres based on
/// the provided TLS configuration.
#[derive(Debug, Clone)]
pub struct PostgresTlsConnector;

impl PostgresTlsConnector {
    /// Build a TLS connector from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The configuration does not validate
    /// - The TLS mode is Disable (use `NoTls` instead)
    /// - The CA certificate cannot be read or parsed
    pub fn build(config: &TlsConfig) -> sqlrun_core::Result<MakeTlsConnector> {
        config.validate()?;

        if config.mode == TlsMode::Disable {
            return Err(TlsError::UnsupportedMode { mode: config.mode }.into());
        }

        debug!(mode = %config.mode, verify_server = config.verify_server, "building PostgreSQL TLS connector");

        let mut builder = NativeTlsConnector::builder();

        configure_verification(&mut builder, config);

        if let Some(ca_cert_path) = &config.ca_cert {
            apply_ca_cert(&mut builder, ca_cert_path)?;
        }

        let connector = builder
            .build()
            .map_err(|e| TlsError::ConfigurationError(e.to_string()))?;

        Ok(MakeTlsConnector::new(connector))
    }
}

/// Configure certificate verification based on TLS mode
fn configure_verification(builder: &mut TlsConnectorBuilder, config: &TlsConfig) {
    if config.accepts_invalid_certs() {
        debug!("certificate verification disabled (verify_server = false)");
        builder.danger_accept_invalid_certs(true);
        builder.danger_accept_invalid_hostnames(true);
    } else if config.mode.requires_ca_verification()
        && !config.mode.requires_hostname_verification()
    {
        debug!("CA verification only, hostname not checked");
        builder.danger_accept_invalid_hostnames(true);
    }
}

/// Load and apply a PEM-encoded CA certificate to the TLS builder
fn apply_ca_cert(builder: &mut TlsConnectorBuilder, path: &Path) -> Result<(), TlsError> {
    debug!(path = %path.display(), "loading CA certificate");

    let pem_data = fs::read(path).map_err(|e| TlsError::CaCertLoadFailed {
        path: path.display().to_string(),
        source: e,
    })?;

    let cert =
        Certificate::from_pem(&pem_data).map_err(|e| TlsError::InvalidCaCert(e.to_string()))?;

    builder.add_root_certificate(cert);

    Ok(())
}

/// The tokio-postgres `sslmode` for a TLS mode.
///
/// tokio-postgres only knows `disable`, `prefer` and `require`; certificate
/// checks for the verify modes happen in the connector.
pub fn ssl_mode_for(mode: TlsMode) -> SslMode {
    if mode == TlsMode::Disable {
        SslMode::Disable
    } else if mode.requires_encryption() {
        SslMode::Require
    } else {
        SslMode::Prefer
    }
}
