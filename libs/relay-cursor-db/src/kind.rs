//! Logical column types understood by the adapter.

use std::fmt;

use relay_cursor::ValueKind;

/// Logical type of a mapped column.
///
/// Drives coercion of predicate values into `sea_orm::Value` and conversion
/// of model values back into cursor keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    String,
    I64,
    F64,
    Bool,
    Uuid,
    DateTimeUtc,
    Date,
    Time,
    Decimal,
}

impl FieldKind {
    /// Cursor value kind produced for this column.
    #[must_use]
    pub fn value_kind(self) -> ValueKind {
        match self {
            FieldKind::String => ValueKind::String,
            FieldKind::I64 => ValueKind::I64,
            FieldKind::F64 => ValueKind::F64,
            FieldKind::Bool => ValueKind::Bool,
            FieldKind::Uuid => ValueKind::Uuid,
            FieldKind::DateTimeUtc => ValueKind::DateTime,
            FieldKind::Date => ValueKind::Date,
            FieldKind::Time => ValueKind::Time,
            FieldKind::Decimal => ValueKind::Decimal,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::String => write!(f, "String"),
            FieldKind::I64 => write!(f, "I64"),
            FieldKind::F64 => write!(f, "F64"),
            FieldKind::Bool => write!(f, "Bool"),
            FieldKind::Uuid => write!(f, "Uuid"),
            FieldKind::DateTimeUtc => write!(f, "DateTimeUtc"),
            FieldKind::Date => write!(f, "Date"),
            FieldKind::Time => write!(f, "Time"),
            FieldKind::Decimal => write!(f, "Decimal"),
        }
    }
}
