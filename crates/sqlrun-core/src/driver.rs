//! Database driver trait definition

use crate::{Connection, Result, TlsConfig};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Core driver trait that all database drivers must implement
#[async_trait]
pub trait DatabaseDriver: Send + Sync {
    /// Unique identifier for this driver (e.g., "postgres")
    fn id(&self) -> &'static str {
        self.name()
    }

    /// Short driver name
    fn name(&self) -> &'static str;

    /// Display name for diagnostics
    fn display_name(&self) -> &'static str {
        self.name()
    }

    /// URL schemes this driver accepts (e.g., `postgres` for `postgres://...`)
    fn url_schemes(&self) -> &'static [&'static str];

    /// Default connection port (None for file-based databases)
    fn default_port(&self) -> Option<u16> {
        None
    }

    /// Open a connection
    async fn connect(&self, config: &ConnectionConfig) -> Result<Arc<dyn Connection>>;
}

/// Connection configuration
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Connection string, either a URL or the driver's key=value form
    pub url: String,
    /// TLS settings
    pub tls: TlsConfig,
    /// Give up connecting after this long
    pub connect_timeout: Option<Duration>,
    /// Application name reported to the server
    pub application_name: Option<String>,
}

impl ConnectionConfig {
    /// Create a configuration for the given connection string
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            tls: TlsConfig::default(),
            connect_timeout: None,
            application_name: None,
        }
    }

    pub fn with_tls(mut self, tls: TlsConfig) -> Self {
        self.tls = tls;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn with_application_name(mut self, name: impl Into<String>) -> Self {
        self.application_name = Some(name.into());
        self
    }

    /// The URL scheme of the connection string, lower-cased.
    ///
    /// Returns `None` for key=value connection strings.
    pub fn scheme(&self) -> Option<String> {
        let (scheme, _) = self.url.split_once("://")?;
        let valid = !scheme.is_empty()
            && scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
        valid.then(|| scheme.to_ascii_lowercase())
    }
}
