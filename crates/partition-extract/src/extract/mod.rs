//! The partition extraction engine.
//!
//! One [`Extractor::extract`] call owns one connection and one streaming
//! cursor for its whole lifetime: it renders the partition-bounded query,
//! checks the schema against the live result metadata, normalizes each row,
//! and hands records to the sink in result-set order. There is no resume or
//! offset capability: a failed partition is redone from scratch by the
//! orchestrator, and records already delivered are not retracted.

use std::sync::atomic::{AtomicI64, Ordering};

use tracing::{debug, info};

use crate::config::SourceConfig;
use crate::core::native::{NativeArray, NativeValue};
use crate::core::partition::{PartitionSpec, QueryTemplate};
use crate::core::schema::{ColumnType, Schema, SchemaColumn};
use crate::core::traits::{RecordSink, SourceConnection, SourceConnector};
use crate::core::value::Value;
use crate::error::{ExtractError, Result};

/// Outcome of one successful partition extraction.
#[derive(Debug, Clone)]
pub struct ExtractReport {
    /// Number of records handed to the sink.
    pub rows_read: i64,

    /// The refined schema: a copy of the input schema with `Array` columns
    /// re-typed to their inferred element type once a row reported element
    /// metadata. Non-array columns are untouched copies.
    pub schema: Schema,
}

/// Per-partition extraction engine.
///
/// Holds only the row counter; all other state lives for a single `extract`
/// call. The counter is reset at the start of each call and stays readable
/// after completion, success or failure.
#[derive(Debug, Default)]
pub struct Extractor {
    rows_read: AtomicI64,
}

impl Extractor {
    /// Create an engine with a zeroed row counter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records handed to the sink during the most recent `extract` call.
    pub fn rows_read(&self) -> i64 {
        self.rows_read.load(Ordering::Relaxed)
    }

    /// Extract one partition.
    ///
    /// Renders `template` with the partition's condition fragment, opens one
    /// connection through `connector`, streams the result set, and pushes one
    /// normalized [`Record`](crate::Record) per row into `sink`. The
    /// connection is released on every exit path.
    ///
    /// On success the report carries the row count and the refined schema.
    /// On failure, records already accepted by the sink remain delivered and
    /// counted; the caller decides whether to redo the partition.
    pub async fn extract<C, S>(
        &self,
        connector: &C,
        config: &SourceConfig,
        template: &QueryTemplate,
        partition: &PartitionSpec,
        schema: &Schema,
        sink: &mut S,
    ) -> Result<ExtractReport>
    where
        C: SourceConnector,
        S: RecordSink + ?Sized,
    {
        self.rows_read.store(0, Ordering::Relaxed);

        if schema.is_empty() {
            return Err(ExtractError::Config("schema must not be empty".into()));
        }

        let sql = template.render(partition)?;
        info!(query = %sql, "executing partition query");

        let mut conn = connector.connect(config).await?;
        let result = self.drain(&mut conn, &sql, schema, sink).await;
        conn.close().await;
        result
    }

    /// Stream the cursor to the sink. Runs inside the connection scope so
    /// cleanup in `extract` is unconditional.
    async fn drain<Conn, S>(
        &self,
        conn: &mut Conn,
        sql: &str,
        schema: &Schema,
        sink: &mut S,
    ) -> Result<ExtractReport>
    where
        Conn: SourceConnection,
        S: RecordSink + ?Sized,
    {
        let mut cursor = conn.run_query(sql).await?;

        if cursor.column_count() != schema.len() {
            return Err(ExtractError::SchemaMismatch {
                schema_columns: schema.len(),
                result_columns: cursor.column_count(),
            });
        }

        let mut refined = schema.clone();
        let mut probed = vec![false; schema.len()];

        while let Some(row) = cursor.next_row().await {
            let row = row?;
            if row.len() != schema.len() {
                return Err(ExtractError::SchemaMismatch {
                    schema_columns: schema.len(),
                    result_columns: row.len(),
                });
            }

            let mut record = Vec::with_capacity(row.len());
            for (idx, native) in row.into_iter().enumerate() {
                let value = self
                    .convert_cell(schema.column(idx), &mut refined, &mut probed, idx, native)
                    .await?;
                record.push(value);
            }

            sink.accept(record).await?;
            self.rows_read.fetch_add(1, Ordering::Relaxed);
        }

        let rows_read = self.rows_read();
        info!(rows_read, "partition extraction complete");
        Ok(ExtractReport {
            rows_read,
            schema: refined,
        })
    }

    /// Normalize one cell. Dispatch is always on the DECLARED column type;
    /// refinement only updates the reported output schema.
    async fn convert_cell(
        &self,
        declared: &SchemaColumn,
        refined: &mut Schema,
        probed: &mut [bool],
        idx: usize,
        native: NativeValue,
    ) -> Result<Value> {
        if matches!(native, NativeValue::Null) {
            return Ok(Value::Null);
        }

        let value = match declared.column_type {
            ColumnType::Date => match native {
                NativeValue::Date(d) => Value::Date(d),
                NativeValue::Timestamp(ts) => Value::Date(ts.date()),
                other => passthrough(other)?,
            },

            ColumnType::DateTime => match native {
                NativeValue::Timestamp(ts) => Value::DateTime(ts),
                other => passthrough(other)?,
            },

            ColumnType::Time => match native {
                NativeValue::Time(t) => Value::Time(t),
                NativeValue::Timestamp(ts) => Value::Time(ts.time()),
                other => passthrough(other)?,
            },

            ColumnType::Array => match native {
                NativeValue::Array(array) => {
                    if !probed[idx] {
                        if let Some(element) = &array.element {
                            let refined_column = declared.refine_from_element(element);
                            debug!(
                                column = %declared.name,
                                element = %element.type_name,
                                refined = ?refined_column.column_type,
                                "re-typed array column from element metadata"
                            );
                            refined.replace(idx, refined_column);
                            probed[idx] = true;
                        }
                    }
                    array_value(array)?
                }
                other => passthrough(other)?,
            },

            // Terminal case: a large-object handle is materialized into its
            // full byte sequence and nothing runs after it for this cell.
            ColumnType::Binary => match native {
                NativeValue::Bytes(b) => Value::Bytes(b),
                NativeValue::Blob(lob) => Value::Bytes(lob.read_all().await?),
                other => passthrough(other)?,
            },

            _ => passthrough(native)?,
        };

        Ok(value)
    }
}

/// Pass a native value through unconverted. Large-object handles cannot be
/// represented in an emitted record and are only consumed by the `Binary`
/// conversion path.
fn passthrough(native: NativeValue) -> Result<Value> {
    Ok(match native {
        NativeValue::Null => Value::Null,
        NativeValue::Bool(v) => Value::Bool(v),
        NativeValue::I16(v) => Value::I16(v),
        NativeValue::I32(v) => Value::I32(v),
        NativeValue::I64(v) => Value::I64(v),
        NativeValue::F32(v) => Value::F32(v),
        NativeValue::F64(v) => Value::F64(v),
        NativeValue::Decimal(v) => Value::Decimal(v),
        NativeValue::Text(v) => Value::Text(v),
        NativeValue::Bytes(v) => Value::Bytes(v),
        NativeValue::Uuid(v) => Value::Uuid(v),
        NativeValue::Date(v) => Value::Date(v),
        NativeValue::Timestamp(v) => Value::DateTime(v),
        NativeValue::Time(v) => Value::Time(v),
        NativeValue::Array(array) => array_value(array)?,
        NativeValue::Blob(_) => {
            return Err(ExtractError::Unsupported(
                "large-object handle outside a BINARY column".into(),
            ))
        }
    })
}

fn array_value(array: NativeArray) -> Result<Value> {
    let values = array
        .values
        .into_iter()
        .map(passthrough)
        .collect::<Result<Vec<_>>>()?;
    Ok(Value::Array(values))
}
