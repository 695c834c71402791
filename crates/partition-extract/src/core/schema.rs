//! Schema types: the ordered, positionally-aligned type contract between
//! source columns and emitted record fields.

use serde::{Deserialize, Serialize};

use crate::core::native::ElementType;

/// Intermediate column type taxonomy.
///
/// A closed set with an explicit catch-all: any type without dedicated
/// conversion handling is declared [`ColumnType::Unknown`] and its values
/// pass through unconverted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    /// Boolean / single-bit values.
    Bit,
    /// Exact integer types (smallint through bigint).
    FixedPoint,
    /// Approximate float types (real, double precision).
    FloatingPoint,
    /// Exact decimal/numeric types with precision and scale.
    Decimal,
    /// Character data.
    Text,
    /// Binary data, inline or large-object.
    Binary,
    /// Calendar date, no time-of-day component.
    Date,
    /// Timezone-naive date and time.
    DateTime,
    /// Timezone-naive time-of-day.
    Time,
    /// Native array/sequence values.
    Array,
    /// Anything else; values pass through unconverted.
    Unknown,
}

impl ColumnType {
    /// Map a source-native type name to an intermediate column type.
    ///
    /// Used when re-typing an `Array` column from its element metadata. Type
    /// names are matched case-insensitively and cover the common PostgreSQL
    /// and MySQL spellings.
    pub fn from_native(type_name: &str) -> Self {
        match type_name.to_lowercase().as_str() {
            "bool" | "boolean" | "bit" => ColumnType::Bit,

            "int2" | "smallint" | "tinyint" | "int4" | "int" | "integer" | "mediumint"
            | "int8" | "bigint" => ColumnType::FixedPoint,

            "float4" | "real" | "float8" | "float" | "double" | "double precision" => {
                ColumnType::FloatingPoint
            }

            "numeric" | "decimal" | "money" => ColumnType::Decimal,

            "char" | "bpchar" | "varchar" | "text" | "name" | "enum" | "set" => ColumnType::Text,

            "bytea" | "binary" | "varbinary" | "blob" => ColumnType::Binary,

            "date" => ColumnType::Date,
            "timestamp" | "timestamptz" | "datetime" => ColumnType::DateTime,
            "time" | "timetz" => ColumnType::Time,

            _ => ColumnType::Unknown,
        }
    }
}

/// One entry of the extraction schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaColumn {
    /// Column name.
    pub name: String,

    /// Declared intermediate type.
    pub column_type: ColumnType,

    /// Numeric precision, where the source reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<u16>,

    /// Numeric scale, where the source reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<u16>,
}

impl SchemaColumn {
    /// Create a column with no precision/scale.
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            precision: None,
            scale: None,
        }
    }

    /// Attach precision and scale.
    pub fn with_precision(mut self, precision: u16, scale: u16) -> Self {
        self.precision = Some(precision);
        self.scale = Some(scale);
        self
    }

    /// Derive the refined column for an `Array` column from its element
    /// metadata: same name, element's type and precision/scale.
    pub fn refine_from_element(&self, element: &ElementType) -> SchemaColumn {
        SchemaColumn {
            name: self.name.clone(),
            column_type: ColumnType::from_native(&element.type_name),
            precision: element.precision,
            scale: element.scale,
        }
    }
}

/// Ordered sequence of schema columns, positionally aligned 1:1 with the
/// executed query's result columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    columns: Vec<SchemaColumn>,
}

impl Schema {
    /// Create a schema from ordered columns.
    pub fn new(columns: Vec<SchemaColumn>) -> Self {
        Self { columns }
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the schema has no columns. An empty schema is rejected by the
    /// extraction engine before connecting.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// The column at position `idx`.
    pub fn column(&self, idx: usize) -> &SchemaColumn {
        &self.columns[idx]
    }

    /// All columns in order.
    pub fn columns(&self) -> &[SchemaColumn] {
        &self.columns
    }

    /// Replace the column at position `idx` (used to build refined schemas).
    pub(crate) fn replace(&mut self, idx: usize, column: SchemaColumn) {
        self.columns[idx] = column;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_native_integer_types() {
        assert_eq!(ColumnType::from_native("int4"), ColumnType::FixedPoint);
        assert_eq!(ColumnType::from_native("BIGINT"), ColumnType::FixedPoint);
        assert_eq!(ColumnType::from_native("smallint"), ColumnType::FixedPoint);
    }

    #[test]
    fn test_from_native_temporal_types() {
        assert_eq!(ColumnType::from_native("date"), ColumnType::Date);
        assert_eq!(ColumnType::from_native("timestamptz"), ColumnType::DateTime);
        assert_eq!(ColumnType::from_native("datetime"), ColumnType::DateTime);
        assert_eq!(ColumnType::from_native("time"), ColumnType::Time);
    }

    #[test]
    fn test_from_native_falls_back_to_unknown() {
        assert_eq!(ColumnType::from_native("xml"), ColumnType::Unknown);
        assert_eq!(ColumnType::from_native("geography"), ColumnType::Unknown);
    }

    #[test]
    fn test_refine_from_element() {
        let col = SchemaColumn::new("scores", ColumnType::Array);
        let element = ElementType {
            type_name: "numeric".into(),
            precision: Some(10),
            scale: Some(2),
        };

        let refined = col.refine_from_element(&element);
        assert_eq!(refined.name, "scores");
        assert_eq!(refined.column_type, ColumnType::Decimal);
        assert_eq!(refined.precision, Some(10));
        assert_eq!(refined.scale, Some(2));
    }

    #[test]
    fn test_schema_roundtrips_through_serde() {
        let schema = Schema::new(vec![
            SchemaColumn::new("id", ColumnType::FixedPoint),
            SchemaColumn::new("price", ColumnType::Decimal).with_precision(12, 4),
        ]);

        let json = serde_json::to_string(&schema).unwrap();
        let back: Schema = serde_json::from_str(&json).unwrap();
        assert_eq!(back, schema);
    }
}
