//! Native values: what a driver reads off the wire, before normalization.
//!
//! The engine dispatches on the declared schema type over these values. The
//! two non-scalar shapes carry the metadata the engine needs: arrays report
//! their element type for schema refinement, and large objects stay lazy
//! until the `Binary` conversion materializes them.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::Result;

/// A database value as read from the source, one per result column.
pub enum NativeValue {
    /// SQL NULL.
    Null,

    /// Boolean value.
    Bool(bool),

    /// 16-bit signed integer.
    I16(i16),

    /// 32-bit signed integer.
    I32(i32),

    /// 64-bit signed integer.
    I64(i64),

    /// 32-bit floating point.
    F32(f32),

    /// 64-bit floating point.
    F64(f64),

    /// Decimal value.
    Decimal(Decimal),

    /// Character data.
    Text(String),

    /// Inline binary data.
    Bytes(Vec<u8>),

    /// UUID/GUID value.
    Uuid(Uuid),

    /// Date, already timezone-naive.
    Date(NaiveDate),

    /// Timestamp, already normalized to timezone-naive by the driver.
    Timestamp(NaiveDateTime),

    /// Time-of-day, already timezone-naive.
    Time(NaiveTime),

    /// Native array with optional element-type metadata.
    Array(NativeArray),

    /// Large-object handle; contents are fetched only on materialization.
    Blob(Box<dyn LargeObject>),
}

impl std::fmt::Debug for NativeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NativeValue::Null => write!(f, "Null"),
            NativeValue::Bool(v) => write!(f, "Bool({v})"),
            NativeValue::I16(v) => write!(f, "I16({v})"),
            NativeValue::I32(v) => write!(f, "I32({v})"),
            NativeValue::I64(v) => write!(f, "I64({v})"),
            NativeValue::F32(v) => write!(f, "F32({v})"),
            NativeValue::F64(v) => write!(f, "F64({v})"),
            NativeValue::Decimal(v) => write!(f, "Decimal({v})"),
            NativeValue::Text(v) => write!(f, "Text({v:?})"),
            NativeValue::Bytes(v) => write!(f, "Bytes({} bytes)", v.len()),
            NativeValue::Uuid(v) => write!(f, "Uuid({v})"),
            NativeValue::Date(v) => write!(f, "Date({v})"),
            NativeValue::Timestamp(v) => write!(f, "Timestamp({v})"),
            NativeValue::Time(v) => write!(f, "Time({v})"),
            NativeValue::Array(v) => write!(f, "Array({} values)", v.values.len()),
            NativeValue::Blob(_) => write!(f, "Blob(<handle>)"),
        }
    }
}

/// A native array value plus the element metadata the source reports for it.
#[derive(Debug)]
pub struct NativeArray {
    /// Element values, in array order.
    pub values: Vec<NativeValue>,

    /// Element-type metadata, when the source exposes it. Drives re-typing
    /// of `Array` schema columns.
    pub element: Option<ElementType>,
}

/// Element-type metadata of a native array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementType {
    /// Source-native type name of the elements (e.g. "int4", "numeric").
    pub type_name: String,

    /// Element precision, where reported.
    pub precision: Option<u16>,

    /// Element scale, where reported.
    pub scale: Option<u16>,
}

impl ElementType {
    /// Element type with a name only.
    pub fn named(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            precision: None,
            scale: None,
        }
    }
}

/// A lazy large-object handle (e.g. a PostgreSQL `oid` reference).
///
/// The engine materializes these eagerly for `Binary` columns: the handle is
/// consumed and the object's full contents land in memory as one byte
/// sequence.
#[async_trait]
pub trait LargeObject: Send {
    /// Read the object's full contents.
    async fn read_all(self: Box<Self>) -> Result<Vec<u8>>;
}

/// One row of native values, positionally aligned with the result columns.
pub type NativeRow = Vec<NativeValue>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_is_size_bounded_for_payload_variants() {
        let bytes = NativeValue::Bytes(vec![0u8; 4096]);
        assert_eq!(format!("{bytes:?}"), "Bytes(4096 bytes)");

        let array = NativeValue::Array(NativeArray {
            values: vec![NativeValue::I32(1), NativeValue::Null],
            element: Some(ElementType::named("int4")),
        });
        assert_eq!(format!("{array:?}"), "Array(2 values)");
    }
}
