//! Core model shared by the extraction engine and the drivers.
//!
//! - [`schema`]: column type taxonomy and the ordered schema contract
//! - [`value`]: emitted intermediate values and records
//! - [`native`]: values as read from the source, before normalization
//! - [`partition`]: partition descriptor and query templating
//! - [`traits`]: the sink and source seams

pub mod native;
pub mod partition;
pub mod schema;
pub mod traits;
pub mod value;

pub use native::{ElementType, LargeObject, NativeArray, NativeRow, NativeValue};
pub use partition::{PartitionSpec, QueryTemplate, CONDITIONS_TOKEN};
pub use schema::{ColumnType, Schema, SchemaColumn};
pub use traits::{MemorySink, RecordSink, RowCursor, SourceConnection, SourceConnector};
pub use value::{Record, Value};
