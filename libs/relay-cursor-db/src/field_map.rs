//! Field name → column mapping, shared by predicate translation, ordering and
//! cursor key extraction.

use std::collections::HashMap;

use bigdecimal::BigDecimal;
use chrono::Utc;
use relay_cursor::{CursorKey, Error, KeyExtractor, SortSpec, Value, ValueKind};
use sea_orm::{EntityTrait, ModelTrait};

use crate::kind::FieldKind;

#[derive(Clone, Debug)]
pub struct Field<E: EntityTrait> {
    pub col: E::Column,
    pub kind: FieldKind,
}

/// Case-insensitive map from API field names to entity columns.
#[derive(Clone, Debug)]
#[must_use]
pub struct FieldMap<E: EntityTrait> {
    map: HashMap<String, Field<E>>,
}

impl<E: EntityTrait> Default for FieldMap<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: EntityTrait> FieldMap<E> {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    pub fn insert(mut self, api_name: impl Into<String>, col: E::Column, kind: FieldKind) -> Self {
        self.map
            .insert(api_name.into().to_lowercase(), Field { col, kind });
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Field<E>> {
        self.map.get(&name.to_lowercase())
    }

    /// Value of `name` on `model` as a cursor value, `None` if the field is
    /// unmapped, NULL, or stored with a different type than declared.
    #[must_use]
    pub fn model_value(&self, model: &E::Model, name: &str) -> Option<Value>
    where
        E::Column: Copy,
    {
        let field = self.get(name)?;
        column_value_to_value(field.kind, model.get(field.col))
    }
}

impl<E> KeyExtractor<E::Model> for FieldMap<E>
where
    E: EntityTrait,
    E::Column: Copy,
{
    fn extract_key(&self, model: &E::Model, order: &SortSpec) -> Result<CursorKey, Error> {
        order
            .iter()
            .map(|f| {
                self.model_value(model, &f.name)
                    .ok_or_else(|| Error::MissingSortField(f.name.clone()))
            })
            .collect()
    }

    fn key_kind(&self, field: &str) -> Option<ValueKind> {
        self.get(field).map(|f| f.kind.value_kind())
    }
}

fn column_value_to_value(kind: FieldKind, value: sea_orm::Value) -> Option<Value> {
    use sea_orm::Value as V;

    let out = match (kind, value) {
        (FieldKind::String, V::String(Some(s))) => Value::String(*s),
        (FieldKind::I64, V::BigInt(Some(i))) => Value::I64(i),
        (FieldKind::I64, V::Int(Some(i))) => Value::I64(i64::from(i)),
        (FieldKind::I64, V::SmallInt(Some(i))) => Value::I64(i64::from(i)),
        (FieldKind::I64, V::TinyInt(Some(i))) => Value::I64(i64::from(i)),
        (FieldKind::I64, V::Unsigned(Some(u))) => Value::I64(i64::from(u)),
        (FieldKind::I64, V::BigUnsigned(Some(u))) => Value::I64(i64::try_from(u).ok()?),
        (FieldKind::F64, V::Double(Some(f))) => Value::F64(f),
        (FieldKind::F64, V::Float(Some(f))) => Value::F64(f64::from(f)),
        (FieldKind::Bool, V::Bool(Some(b))) => Value::Bool(b),
        (FieldKind::Uuid, V::Uuid(Some(u))) => Value::Uuid(*u),
        (FieldKind::DateTimeUtc, V::ChronoDateTimeUtc(Some(dt))) => Value::DateTime(*dt),
        (FieldKind::DateTimeUtc, V::ChronoDateTimeWithTimeZone(Some(dt))) => {
            Value::DateTime(dt.with_timezone(&Utc))
        }
        (FieldKind::Date, V::ChronoDate(Some(d))) => Value::Date(*d),
        (FieldKind::Time, V::ChronoTime(Some(t))) => Value::Time(*t),
        (FieldKind::Decimal, V::Decimal(Some(d))) => {
            Value::Decimal(d.to_string().parse::<BigDecimal>().ok()?)
        }
        _ => return None,
    };
    Some(out)
}
