//! PostgreSQL driver implementation

mod connection;
mod driver;
mod tls;

pub use connection::PostgresConnection;
pub use driver::PostgresDriver;
pub use tls::{PostgresTlsConnector, TlsError, ssl_mode_for};
