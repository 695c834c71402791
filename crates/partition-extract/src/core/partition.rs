//! Partition descriptors and query templating.
//!
//! The splitting component hands each worker an opaque SQL predicate; the
//! engine's only text transformation is substituting that predicate into the
//! query template's placeholder token. The token format is a contract with
//! the splitter and must be preserved exactly.

use serde::{Deserialize, Serialize};

use crate::error::{ExtractError, Result};

/// Placeholder token the engine replaces with the partition's condition text.
pub const CONDITIONS_TOKEN: &str = "${CONDITIONS}";

/// One partition of the source row space: an opaque condition fragment
/// produced by the splitting component. The fragment is trusted and inserted
/// verbatim; no escaping or validation happens here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionSpec {
    conditions: String,
}

impl PartitionSpec {
    /// Create a partition descriptor from its condition fragment.
    pub fn new(conditions: impl Into<String>) -> Self {
        Self {
            conditions: conditions.into(),
        }
    }

    /// The condition fragment.
    pub fn conditions(&self) -> &str {
        &self.conditions
    }
}

/// A SQL query template containing the [`CONDITIONS_TOKEN`] placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryTemplate {
    sql: String,
}

impl QueryTemplate {
    /// Create a template from its SQL text.
    pub fn new(sql: impl Into<String>) -> Self {
        Self { sql: sql.into() }
    }

    /// The raw template text.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Render the concrete partition query: one verbatim substring
    /// replacement of the placeholder token, no other reformatting.
    ///
    /// A template without the token cannot be bounded to a partition and is
    /// a configuration error.
    pub fn render(&self, partition: &PartitionSpec) -> Result<String> {
        if !self.sql.contains(CONDITIONS_TOKEN) {
            return Err(ExtractError::Config(format!(
                "query template is missing the {} placeholder",
                CONDITIONS_TOKEN
            )));
        }
        Ok(self.sql.replace(CONDITIONS_TOKEN, partition.conditions()))
    }
}
