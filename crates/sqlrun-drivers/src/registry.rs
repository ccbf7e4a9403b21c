//! Driver registry for managing available database drivers

use std::collections::HashMap;
use std::sync::Arc;
use sqlrun_core::{ConnectionConfig, DatabaseDriver, Result, SqlRunError};

/// Driver used for connection strings without a URL scheme
const KEY_VALUE_DRIVER: &str = "postgres";

/// Registry of available database drivers
pub struct DriverRegistry {
    drivers: HashMap<String, Arc<dyn DatabaseDriver>>,
}

impl DriverRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            drivers: HashMap::new(),
        }
    }

    /// Create a registry with all built-in drivers registered
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        #[cfg(feature = "postgres")]
        registry.register(Arc::new(crate::postgres::PostgresDriver::new()));

        registry
    }

    /// Register a new driver
    pub fn register(&mut self, driver: Arc<dyn DatabaseDriver>) {
        let name = driver.name().to_string();
        tracing::debug!(driver = %name, "registering database driver");
        self.drivers.insert(name, driver);
    }

    /// Get a driver by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn DatabaseDriver>> {
        let driver = self.drivers.get(name).cloned();
        if driver.is_none() {
            tracing::warn!(driver = %name, "driver not found in registry");
        }
        driver
    }

    /// List all registered driver names
    pub fn list(&self) -> Vec<&str> {
        self.drivers.keys().map(|s| s.as_str()).collect()
    }

    /// Check if a driver is registered
    pub fn has(&self, name: &str) -> bool {
        self.drivers.contains_key(name)
    }

    /// Find the driver that accepts a URL scheme
    pub fn for_scheme(&self, scheme: &str) -> Option<Arc<dyn DatabaseDriver>> {
        self.drivers
            .values()
            .find(|driver| {
                driver
                    .url_schemes()
                    .iter()
                    .any(|s| s.eq_ignore_ascii_case(scheme))
            })
            .cloned()
    }

    /// Pick the driver for a connection configuration.
    ///
    /// URLs resolve by scheme; key=value strings go to PostgreSQL.
    pub fn for_config(&self, config: &ConnectionConfig) -> Result<Arc<dyn DatabaseDriver>> {
        match config.scheme() {
            Some(scheme) => self.for_scheme(&scheme).ok_or_else(|| {
                SqlRunError::Configuration(format!(
                    "no driver for connection scheme '{}://'",
                    scheme
                ))
            }),
            None => self.get(KEY_VALUE_DRIVER).ok_or_else(|| {
                SqlRunError::Configuration(
                    "key=value connection strings need the postgres driver".to_string(),
                )
            }),
        }
    }
}

impl Default for DriverRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
