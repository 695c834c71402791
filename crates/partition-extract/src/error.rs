//! Error types for partition extraction.

use thiserror::Error;

/// Main error type for extraction operations.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Configuration error (empty schema, missing template token, bad ssl_mode, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// The supplied schema disagrees with the live result set. Fatal and
    /// never retried: it means a stale or wrong schema was handed to this
    /// partition.
    #[error(
        "Schema mismatch: schema defines {schema_columns} columns but the result set has {result_columns}"
    )]
    SchemaMismatch {
        schema_columns: usize,
        result_columns: usize,
    },

    /// PostgreSQL source error (connect, execute, or fetch).
    #[error("Source database error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    /// MySQL source error (connect, execute, or fetch).
    #[error("Source database error: {0}")]
    Mysql(#[from] sqlx::Error),

    /// The streaming cursor ended abnormally (pump task died, channel closed).
    #[error("Cursor error: {0}")]
    Cursor(String),

    /// The downstream sink rejected a record. Fatal to the partition.
    #[error("Sink error: {0}")]
    Sink(String),

    /// A native value that cannot be represented for its declared column type.
    #[error("Unsupported column value: {0}")]
    Unsupported(String),
}

impl ExtractError {
    /// Whether the caller may reasonably retry the whole partition.
    ///
    /// Schema mismatches and configuration errors will fail the same way on
    /// every attempt; database-level failures are left to the orchestrator's
    /// retry policy.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            ExtractError::Config(_)
                | ExtractError::SchemaMismatch { .. }
                | ExtractError::Unsupported(_)
        )
    }

    /// Format error with full details including the error chain.
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_mismatch_is_not_retryable() {
        let err = ExtractError::SchemaMismatch {
            schema_columns: 2,
            result_columns: 3,
        };
        assert!(!err.is_retryable());
        assert!(err.to_string().contains("2"));
        assert!(err.to_string().contains("3"));
    }

    #[test]
    fn test_config_is_not_retryable() {
        assert!(!ExtractError::Config("bad".into()).is_retryable());
        assert!(!ExtractError::Unsupported("blob".into()).is_retryable());
    }

    #[test]
    fn test_cursor_and_sink_are_retryable() {
        assert!(ExtractError::Cursor("gone".into()).is_retryable());
        assert!(ExtractError::Sink("closed".into()).is_retryable());
    }

    #[test]
    fn test_format_detailed_includes_message() {
        let err = ExtractError::Config("schema must not be empty".into());
        assert!(err.format_detailed().starts_with("Error: Configuration error"));
    }
}
