//! The seams of the extraction engine: record sinks and source connections.
//!
//! Sinks and sources are traits so loader backends and database drivers vary
//! independently of the engine. Rows cross the source seam through a bounded
//! channel ([`RowCursor`]), which keeps memory bounded for large partitions:
//! the pump task can run at most one row ahead of the engine.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::config::SourceConfig;
use crate::core::native::NativeRow;
use crate::core::value::Record;
use crate::error::Result;

/// Rows buffered between the driver's pump task and the engine.
pub(crate) const CURSOR_BUFFER_ROWS: usize = 1;

/// Append-only consumer of extracted records.
///
/// Called once per source row, in result-set order. An error from the sink
/// is fatal to the extraction and propagates to the caller.
#[async_trait]
pub trait RecordSink: Send {
    /// Accept one record, taking ownership.
    async fn accept(&mut self, record: Record) -> Result<()>;
}

/// Factory for source connections.
///
/// `extract` acquires exactly one connection through this seam and releases
/// it on every exit path.
#[async_trait]
pub trait SourceConnector: Send + Sync {
    /// The connection type produced by this connector.
    type Conn: SourceConnection;

    /// Open one connection to the configured source.
    async fn connect(&self, config: &SourceConfig) -> Result<Self::Conn>;
}

/// One live source connection executing one streaming query at a time.
#[async_trait]
pub trait SourceConnection: Send {
    /// Execute `sql` as a forward-only, read-only streaming cursor.
    ///
    /// The returned cursor reports the result set's column count from
    /// statement metadata, before the first row is fetched.
    async fn run_query(&mut self, sql: &str) -> Result<RowCursor>;

    /// Release the connection. Best-effort: failures are logged, not
    /// surfaced, since close runs on error paths too.
    async fn close(self);
}

/// Streaming handle over one executed query.
///
/// Wraps a bounded row channel fed by the driver's pump task plus the
/// statement's column count.
pub struct RowCursor {
    column_count: usize,
    rx: mpsc::Receiver<Result<NativeRow>>,
}

impl RowCursor {
    /// Create a cursor from statement metadata and a row channel.
    pub fn new(column_count: usize, rx: mpsc::Receiver<Result<NativeRow>>) -> Self {
        Self { column_count, rx }
    }

    /// Create a cursor together with the sender side of its row channel.
    pub fn channel(column_count: usize) -> (mpsc::Sender<Result<NativeRow>>, Self) {
        let (tx, rx) = mpsc::channel(CURSOR_BUFFER_ROWS);
        (tx, Self::new(column_count, rx))
    }

    /// Column count of the live result set, from statement metadata.
    pub fn column_count(&self) -> usize {
        self.column_count
    }

    /// Next row, or `None` once the cursor is exhausted.
    pub async fn next_row(&mut self) -> Option<Result<NativeRow>> {
        self.rx.recv().await
    }
}

/// In-memory sink collecting every accepted record.
///
/// Useful in tests and for small probe extractions; production loads supply
/// their own [`RecordSink`].
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Vec<Record>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records accepted so far, in arrival order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Consume the sink, returning the collected records.
    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}

#[async_trait]
impl RecordSink for MemorySink {
    async fn accept(&mut self, record: Record) -> Result<()> {
        self.records.push(record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::native::NativeValue;
    use crate::core::value::Value;

    #[tokio::test]
    async fn test_memory_sink_preserves_order() {
        let mut sink = MemorySink::new();
        sink.accept(vec![Value::I32(1)]).await.unwrap();
        sink.accept(vec![Value::I32(2)]).await.unwrap();

        let records = sink.into_records();
        assert_eq!(records, vec![vec![Value::I32(1)], vec![Value::I32(2)]]);
    }

    #[tokio::test]
    async fn test_row_cursor_drains_channel_then_ends() {
        let (tx, mut cursor) = RowCursor::channel(1);
        assert_eq!(cursor.column_count(), 1);

        tokio::spawn(async move {
            tx.send(Ok(vec![NativeValue::I64(7)])).await.unwrap();
        });

        let row = cursor.next_row().await.unwrap().unwrap();
        assert_eq!(row.len(), 1);
        assert!(cursor.next_row().await.is_none());
    }
}
