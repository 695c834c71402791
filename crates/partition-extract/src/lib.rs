//! # partition-extract
//!
//! Partition-scoped extraction engine for relational-to-generic data movement.
//!
//! Given one bounded slice of a source table or query (a partition), this
//! library renders the partition's SQL from a template, executes it as a
//! forward-only streaming cursor on a dedicated connection, normalizes each
//! column value into a fixed intermediate type system, and streams the
//! resulting records to a caller-supplied sink.
//!
//! Partition computation, connection pooling, and the orchestration layer
//! that schedules many partitions across workers live outside this crate;
//! the engine does one partition per call and reports the row count back.
//!
//! ## Example
//!
//! ```rust,no_run
//! use partition_extract::{
//!     ColumnType, Extractor, MemorySink, PartitionSpec, QueryTemplate, Schema, SchemaColumn,
//! };
//! use partition_extract::config::SourceConfig;
//! use partition_extract::drivers::postgres::PgConnector;
//!
//! #[tokio::main]
//! async fn main() -> partition_extract::Result<()> {
//!     let template = QueryTemplate::new("SELECT id, created FROM events WHERE ${CONDITIONS}");
//!     let partition = PartitionSpec::new("id BETWEEN 1 AND 100000");
//!     let schema = Schema::new(vec![
//!         SchemaColumn::new("id", ColumnType::FixedPoint),
//!         SchemaColumn::new("created", ColumnType::DateTime),
//!     ]);
//!
//!     let config = SourceConfig::default_for_host("db.internal", "app");
//!     let mut sink = MemorySink::new();
//!     let extractor = Extractor::new();
//!     let report = extractor
//!         .extract(&PgConnector, &config, &template, &partition, &schema, &mut sink)
//!         .await?;
//!     println!("extracted {} rows", report.rows_read);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod core;
pub mod drivers;
pub mod error;
pub mod extract;

// Re-exports for convenient access
pub use crate::core::native::{ElementType, LargeObject, NativeArray, NativeRow, NativeValue};
pub use crate::core::partition::{PartitionSpec, QueryTemplate, CONDITIONS_TOKEN};
pub use crate::core::schema::{ColumnType, Schema, SchemaColumn};
pub use crate::core::traits::{MemorySink, RecordSink, RowCursor, SourceConnection, SourceConnector};
pub use crate::core::value::{Record, Value};
pub use error::{ExtractError, Result};
pub use extract::{ExtractReport, Extractor};
