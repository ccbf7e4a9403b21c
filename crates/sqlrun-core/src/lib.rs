//! sqlrun Core - Core abstractions shared by the sqlrun crates
//!
//! This crate provides the fundamental traits and types that all other
//! sqlrun crates depend on. It defines:
//!
//! - `DatabaseDriver` - Trait for database driver implementations
//! - `Connection` - Trait for database connections
//! - `with_connection` - Scoped connection lifetime (always closed)
//! - Common types like `Value`, `Row`, `QueryResult`, etc.

mod connection;
mod driver;
mod error;
pub mod security;
mod types;

pub use connection::*;
pub use driver::*;
pub use error::*;
pub use security::*;
pub use types::*;
