//! TLS/SSL Configuration Types
//!
//! Maintenance scripts are often pointed at managed databases that present
//! self-signed certificates, so the default configuration encrypts when the
//! server offers TLS but does not validate the server certificate.

use crate::{Result, SqlRunError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// TLS/SSL mode for database connections
///
/// These modes follow PostgreSQL's `sslmode` conventions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TlsMode {
    /// Disable TLS entirely
    Disable,
    /// Try unencrypted first, use TLS if the server insists
    Allow,
    /// Try TLS first, fall back to unencrypted if unavailable
    #[default]
    Prefer,
    /// Require TLS
    Require,
    /// Require TLS and verify the server certificate against the CA
    VerifyCa,
    /// Require TLS, verify CA, and verify the server hostname matches
    VerifyFull,
}

impl TlsMode {
    /// Returns true if this mode requires encryption
    pub fn requires_encryption(&self) -> bool {
        matches!(
            self,
            TlsMode::Require | TlsMode::VerifyCa | TlsMode::VerifyFull
        )
    }

    /// Returns true if this mode requires certificate verification
    pub fn requires_ca_verification(&self) -> bool {
        matches!(self, TlsMode::VerifyCa | TlsMode::VerifyFull)
    }

    /// Returns true if this mode requires hostname verification
    pub fn requires_hostname_verification(&self) -> bool {
        matches!(self, TlsMode::VerifyFull)
    }

    /// The libpq `sslmode` spelling of this mode
    pub fn as_str(&self) -> &'static str {
        match self {
            TlsMode::Disable => "disable",
            TlsMode::Allow => "allow",
            TlsMode::Prefer => "prefer",
            TlsMode::Require => "require",
            TlsMode::VerifyCa => "verify-ca",
            TlsMode::VerifyFull => "verify-full",
        }
    }
}

impl std::fmt::Display for TlsMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TlsMode {
    type Err = SqlRunError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "disable" => Ok(TlsMode::Disable),
            "allow" => Ok(TlsMode::Allow),
            "prefer" => Ok(TlsMode::Prefer),
            "require" => Ok(TlsMode::Require),
            "verify-ca" | "verify_ca" => Ok(TlsMode::VerifyCa),
            "verify-full" | "verify_full" => Ok(TlsMode::VerifyFull),
            other => Err(SqlRunError::Configuration(format!(
                "unknown TLS mode '{}' (expected disable, allow, prefer, require, verify-ca or verify-full)",
                other
            ))),
        }
    }
}

/// Configuration for TLS/SSL database connections
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TlsConfig {
    /// TLS mode determining the level of security
    pub mode: TlsMode,
    /// Path to the CA certificate file for server verification
    pub ca_cert: Option<PathBuf>,
    /// Whether to verify the server's certificate
    #[serde(default)]
    pub verify_server: bool,
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self::new(TlsMode::default())
    }
}

impl TlsConfig {
    /// Create a new TLS configuration with the specified mode.
    ///
    /// Server verification is only switched on for the `verify-*` modes.
    pub fn new(mode: TlsMode) -> Self {
        Self {
            mode,
            ca_cert: None,
            verify_server: mode.requires_ca_verification(),
        }
    }

    /// Create a disabled TLS configuration
    pub fn disabled() -> Self {
        Self::new(TlsMode::Disable)
    }

    /// Create a TLS configuration that requires encryption
    pub fn require() -> Self {
        Self::new(TlsMode::Require)
    }

    /// Create a TLS configuration with full verification
    pub fn verify_full() -> Self {
        Self::new(TlsMode::VerifyFull)
    }

    /// Set the CA certificate path for server verification
    pub fn ca_cert(mut self, path: impl Into<PathBuf>) -> Self {
        self.ca_cert = Some(path.into());
        self
    }

    /// Override the server verification setting
    pub fn verify_server(mut self, verify: bool) -> Self {
        self.verify_server = verify;
        self
    }

    /// Whether invalid or self-signed server certificates are accepted
    pub fn accepts_invalid_certs(&self) -> bool {
        !self.verify_server && !self.mode.requires_ca_verification()
    }

    /// Validate the TLS configuration
    pub fn validate(&self) -> Result<()> {
        if self.mode.requires_ca_verification() && self.ca_cert.is_none() {
            return Err(SqlRunError::Configuration(
                "TLS mode requires CA certificate but none provided".to_string(),
            ));
        }

        if let Some(ca_cert) = &self.ca_cert
            && ca_cert.as_os_str().is_empty()
        {
            return Err(SqlRunError::Configuration(
                "CA certificate path cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}
