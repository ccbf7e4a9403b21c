//! sqlrun Drivers - Database driver implementations
//!
//! This crate bundles the concrete drivers behind the traits defined in
//! `sqlrun-core` and picks one for a connection string.

#[cfg(feature = "postgres")]
pub use sqlrun_driver_postgres as postgres;

mod registry;

pub use registry::DriverRegistry;

/// Re-export commonly used types from sqlrun-core
pub use sqlrun_core::{
    Connection, ConnectionConfig, DatabaseDriver, QueryResult, Result, Row, SqlRunError,
    StatementResult, Value,
};
