//! Database driver implementations.
//!
//! Each driver implements the [`SourceConnector`](crate::SourceConnector) /
//! [`SourceConnection`](crate::SourceConnection) pair from `core::traits`:
//!
//! - [`postgres`]: PostgreSQL driver (native arrays, large objects)
//! - [`mysql`]: MySQL/MariaDB driver (inline blobs, no arrays)
//! - [`common`]: shared TLS setup
//!
//! # Adding New Databases
//!
//! 1. Create a new module under `drivers/` (e.g. `drivers/mssql/`)
//! 2. Implement `SourceConnector` and `SourceConnection`
//! 3. Normalize zoned temporal types to naive values at the driver boundary
//!    and hand arrays/large objects to the engine via `NativeValue`

pub mod common;
pub mod mysql;
pub mod postgres;

pub use common::SslMode;
pub use mysql::MysqlConnector;
pub use postgres::PgConnector;
