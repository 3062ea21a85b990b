//! Scalar values carried by cursor keys and predicates.
//!
//! Every value has a canonical text form (`to_canonical` / `parse_canonical`)
//! that is lossless for its kind: integers stay integers, floats keep their
//! exact bit pattern, instants keep nanosecond precision.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, Utc};
use uuid::Uuid;

/// A single sortable scalar.
#[derive(Clone, Debug)]
pub enum Value {
    Bool(bool),
    I64(i64),
    F64(f64),
    Decimal(BigDecimal),
    String(String),
    Uuid(Uuid),
    DateTime(DateTime<Utc>),
    Date(NaiveDate),
    Time(NaiveTime),
}

/// The kind (type marker) of a [`Value`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Bool,
    I64,
    F64,
    Decimal,
    String,
    Uuid,
    DateTime,
    Date,
    Time,
}

impl ValueKind {
    /// Stable marker used inside encoded cursors.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ValueKind::Bool => "bool",
            ValueKind::I64 => "i64",
            ValueKind::F64 => "f64",
            ValueKind::Decimal => "decimal",
            ValueKind::String => "string",
            ValueKind::Uuid => "uuid",
            ValueKind::DateTime => "datetime",
            ValueKind::Date => "date",
            ValueKind::Time => "time",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValueKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "bool" => ValueKind::Bool,
            "i64" => ValueKind::I64,
            "f64" => ValueKind::F64,
            "decimal" => ValueKind::Decimal,
            "string" => ValueKind::String,
            "uuid" => ValueKind::Uuid,
            "datetime" => ValueKind::DateTime,
            "date" => ValueKind::Date,
            "time" => ValueKind::Time,
            other => return Err(other.to_owned()),
        })
    }
}

impl Value {
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Bool(_) => ValueKind::Bool,
            Value::I64(_) => ValueKind::I64,
            Value::F64(_) => ValueKind::F64,
            Value::Decimal(_) => ValueKind::Decimal,
            Value::String(_) => ValueKind::String,
            Value::Uuid(_) => ValueKind::Uuid,
            Value::DateTime(_) => ValueKind::DateTime,
            Value::Date(_) => ValueKind::Date,
            Value::Time(_) => ValueKind::Time,
        }
    }

    /// Order two values of the same kind. Values of different kinds are
    /// incomparable and yield `None`.
    ///
    /// Floats use IEEE 754 total ordering, so `-0.0 < 0.0` and NaN has a place.
    #[must_use]
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::I64(a), Value::I64(b)) => Some(a.cmp(b)),
            (Value::F64(a), Value::F64(b)) => Some(a.total_cmp(b)),
            (Value::Decimal(a), Value::Decimal(b)) => Some(a.cmp(b)),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::Uuid(a), Value::Uuid(b)) => Some(a.cmp(b)),
            (Value::DateTime(a), Value::DateTime(b)) => Some(a.cmp(b)),
            (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
            (Value::Time(a), Value::Time(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Lossless text rendering of the payload (without the kind marker).
    #[must_use]
    pub fn to_canonical(&self) -> String {
        match self {
            Value::Bool(b) => b.to_string(),
            Value::I64(i) => i.to_string(),
            Value::F64(f) => format!("{:016x}", f.to_bits()),
            Value::Decimal(d) => d.normalized().to_string(),
            Value::String(s) => s.clone(),
            Value::Uuid(u) => u.hyphenated().to_string(),
            Value::DateTime(dt) => dt.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            Value::Date(d) => d.format("%Y-%m-%d").to_string(),
            Value::Time(t) => t.format("%H:%M:%S%.f").to_string(),
        }
    }

    /// Inverse of [`Value::to_canonical`]. Returns `None` if `s` is not a
    /// canonical rendering for `kind`.
    #[must_use]
    pub fn parse_canonical(kind: ValueKind, s: &str) -> Option<Value> {
        match kind {
            ValueKind::Bool => s.parse().ok().map(Value::Bool),
            ValueKind::I64 => s.parse().ok().map(Value::I64),
            ValueKind::F64 => {
                if s.len() != 16 {
                    return None;
                }
                u64::from_str_radix(s, 16)
                    .ok()
                    .map(|bits| Value::F64(f64::from_bits(bits)))
            }
            ValueKind::Decimal => BigDecimal::from_str(s).ok().map(Value::Decimal),
            ValueKind::String => Some(Value::String(s.to_owned())),
            ValueKind::Uuid => Uuid::parse_str(s).ok().map(Value::Uuid),
            ValueKind::DateTime => DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| Value::DateTime(dt.with_timezone(&Utc))),
            ValueKind::Date => NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .map(Value::Date),
            ValueKind::Time => NaiveTime::parse_from_str(s, "%H:%M:%S%.f")
                .ok()
                .map(Value::Time),
        }
    }
}

// Equality follows `compare`, so it agrees with the sort order used for paging.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == Some(Ordering::Equal)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::I64(i) => write!(f, "{i}"),
            Value::F64(x) => write!(f, "{x}"),
            Value::Decimal(d) => write!(f, "{d}"),
            Value::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Value::Uuid(u) => write!(f, "{u}"),
            Value::DateTime(dt) => write!(f, "{}", dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            Value::Date(d) => write!(f, "{d}"),
            Value::Time(t) => write!(f, "{t}"),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::I64(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::I64(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::F64(v)
    }
}

impl From<BigDecimal> for Value {
    fn from(v: BigDecimal) -> Self {
        Value::Decimal(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_owned())
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Value::Uuid(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::DateTime(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl From<NaiveTime> for Value {
    fn from(v: NaiveTime) -> Self {
        Value::Time(v)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn samples() -> Vec<Value> {
        vec![
            Value::Bool(true),
            Value::I64(i64::MIN),
            Value::F64(-0.0),
            Value::F64(f64::NAN),
            Value::Decimal(BigDecimal::from_str("12345678901234567890.000000001").unwrap()),
            Value::String("h\u{e9}llo, w\u{f6}rld \u{1F600}".to_owned()),
            Value::Uuid(Uuid::from_u128(0x0123_4567_89ab_cdef_0123_4567_89ab_cdef)),
            Value::DateTime(Utc.timestamp_opt(1_700_000_000, 123_456_789).unwrap()),
            Value::Date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()),
            Value::Time(NaiveTime::from_hms_nano_opt(23, 59, 59, 1).unwrap()),
        ]
    }

    #[test]
    fn canonical_text_round_trips_every_kind() {
        for v in samples() {
            let text = v.to_canonical();
            let back = Value::parse_canonical(v.kind(), &text).unwrap();
            assert_eq!(back, v, "kind {}", v.kind());
        }
    }

    #[test]
    fn kind_markers_round_trip() {
        for v in samples() {
            let kind = v.kind();
            assert_eq!(kind.as_str().parse::<ValueKind>().unwrap(), kind);
        }
        assert_eq!("blob".parse::<ValueKind>().unwrap_err(), "blob");
    }

    #[test]
    fn float_equality_is_bitwise() {
        assert_ne!(Value::F64(0.0), Value::F64(-0.0));
        assert_eq!(Value::F64(f64::NAN), Value::F64(f64::NAN));
    }

    #[test]
    fn different_kinds_are_incomparable() {
        assert_eq!(Value::I64(1).compare(&Value::String("1".into())), None);
        assert_ne!(Value::I64(1), Value::F64(1.0));
    }

    #[test]
    fn equal_decimals_share_one_canonical_form() {
        let short = Value::Decimal(BigDecimal::from_str("10.25").unwrap());
        let padded = Value::Decimal(BigDecimal::from_str("10.2500").unwrap());

        assert_eq!(short, padded);
        assert_eq!(short.to_canonical(), padded.to_canonical());
        assert_eq!(short.to_canonical(), "10.25");
    }

    #[test]
    fn display_doubles_embedded_quotes() {
        assert_eq!(Value::from("o'neil").to_string(), "'o''neil'");
        assert_eq!(Value::from("plain").to_string(), "'plain'");
    }

    #[test]
    fn parse_canonical_rejects_garbage() {
        assert!(Value::parse_canonical(ValueKind::I64, "12a").is_none());
        assert!(Value::parse_canonical(ValueKind::F64, "3ff").is_none());
        assert!(Value::parse_canonical(ValueKind::DateTime, "yesterday").is_none());
        assert!(Value::parse_canonical(ValueKind::Bool, "yes").is_none());
    }
}
