//! Error types for sqlrun

use thiserror::Error;

/// Core error type for sqlrun operations
#[derive(Error, Debug)]
pub enum SqlRunError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query error: {0}")]
    Query(String),

    /// An error reported by the database server itself
    #[error("{message}")]
    Database {
        /// SQLSTATE or engine-specific error code
        code: Option<String>,
        message: String,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("TLS error: {0}")]
    Tls(String),

    #[error("Connection is closed")]
    Closed,
}

/// Result type alias for sqlrun operations
pub type Result<T> = std::result::Result<T, SqlRunError>;
