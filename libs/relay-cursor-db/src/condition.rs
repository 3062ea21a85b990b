//! `Predicate` → `sea_orm::Condition` and `SortSpec` → `ORDER BY`.

use bigdecimal::BigDecimal;
use relay_cursor::{CompareOp, Comparison, Predicate, SortDir, SortSpec, Value};
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::{Expr, Order},
    ColumnTrait, Condition, EntityTrait, QueryOrder, Select,
};
use thiserror::Error;

use crate::field_map::FieldMap;
use crate::kind::FieldKind;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("unknown field: {0}")]
    UnknownField(String),

    #[error("type mismatch: expected {expected}, got {got}")]
    TypeMismatch {
        expected: FieldKind,
        got: &'static str,
    },

    #[error("{0}")]
    Other(&'static str),
}

pub type BuildResult<T> = Result<T, BuildError>;

/* ---------- coercion helpers ---------- */

fn bigdecimal_to_decimal(bd: &BigDecimal) -> BuildResult<Decimal> {
    let s = bd.normalized().to_string();
    Decimal::from_str_exact(&s)
        .or_else(|_| s.parse::<Decimal>())
        .map_err(|_| BuildError::Other("decimal out of range"))
}

/// Convert a predicate value into the column's SQL value.
///
/// # Errors
/// Returns `BuildError::TypeMismatch` if `value` does not fit `kind`.
pub fn coerce(kind: FieldKind, value: &Value) -> BuildResult<sea_orm::Value> {
    use sea_orm::Value as V;

    Ok(match (kind, value) {
        (FieldKind::String, Value::String(s)) => V::String(Some(Box::new(s.clone()))),
        (FieldKind::I64, Value::I64(i)) => V::BigInt(Some(*i)),
        (FieldKind::F64, Value::F64(f)) => V::Double(Some(*f)),
        (FieldKind::Decimal, Value::Decimal(d)) => {
            V::Decimal(Some(Box::new(bigdecimal_to_decimal(d)?)))
        }
        (FieldKind::Decimal, Value::I64(i)) => V::Decimal(Some(Box::new(Decimal::from(*i)))),
        (FieldKind::Bool, Value::Bool(b)) => V::Bool(Some(*b)),
        (FieldKind::Uuid, Value::Uuid(u)) => V::Uuid(Some(Box::new(*u))),
        (FieldKind::DateTimeUtc, Value::DateTime(dt)) => V::ChronoDateTimeUtc(Some(Box::new(*dt))),
        (FieldKind::Date, Value::Date(d)) => V::ChronoDate(Some(Box::new(*d))),
        (FieldKind::Time, Value::Time(t)) => V::ChronoTime(Some(Box::new(*t))),
        (expected, other) => {
            return Err(BuildError::TypeMismatch {
                expected,
                got: other.kind().as_str(),
            });
        }
    })
}

fn always() -> Condition {
    Condition::all().add(Expr::cust("1=1"))
}

fn never() -> Condition {
    Condition::all().add(Expr::cust("1=0"))
}

fn comparison_to_condition<E: EntityTrait>(
    cmp: &Comparison,
    fmap: &FieldMap<E>,
) -> BuildResult<Condition>
where
    E::Column: ColumnTrait + Copy,
{
    let field = fmap
        .get(&cmp.field)
        .ok_or_else(|| BuildError::UnknownField(cmp.field.clone()))?;
    let col = field.col;
    let value = coerce(field.kind, &cmp.value)?;

    let expr = match cmp.op {
        CompareOp::Eq => Expr::col(col).eq(value),
        CompareOp::Ne => Expr::col(col).ne(value),
        CompareOp::Gt => Expr::col(col).gt(value),
        CompareOp::Ge => Expr::col(col).gte(value),
        CompareOp::Lt => Expr::col(col).lt(value),
        CompareOp::Le => Expr::col(col).lte(value),
    };
    Ok(Condition::all().add(expr))
}

/// Translate a predicate into a `Condition` over the mapped columns.
///
/// Constant predicates render as `1=1` / `1=0` so they keep their meaning
/// when nested.
///
/// # Errors
/// Returns `BuildError` for unmapped fields or values of the wrong type.
pub fn predicate_to_condition<E: EntityTrait>(
    pred: &Predicate,
    fmap: &FieldMap<E>,
) -> BuildResult<Condition>
where
    E::Column: ColumnTrait + Copy,
{
    Ok(match pred {
        Predicate::Always => always(),
        Predicate::Never => never(),
        Predicate::Compare(cmp) => comparison_to_condition(cmp, fmap)?,
        Predicate::And(parts) if parts.is_empty() => always(),
        Predicate::And(parts) => parts.iter().try_fold(Condition::all(), |acc, p| {
            predicate_to_condition(p, fmap).map(|c| acc.add(c))
        })?,
        Predicate::Or(parts) if parts.is_empty() => never(),
        Predicate::Or(parts) => parts.iter().try_fold(Condition::any(), |acc, p| {
            predicate_to_condition(p, fmap).map(|c| acc.add(c))
        })?,
        Predicate::Not(inner) => Condition::all()
            .add(predicate_to_condition(inner, fmap)?)
            .not(),
    })
}

/// Append `ORDER BY` clauses for every field of `order`.
///
/// # Errors
/// Returns `BuildError::UnknownField` for an unmapped sort field.
pub fn apply_order<E: EntityTrait>(
    select: Select<E>,
    order: &SortSpec,
    fmap: &FieldMap<E>,
) -> BuildResult<Select<E>>
where
    E::Column: ColumnTrait + Copy,
{
    order.iter().try_fold(select, |query, key| {
        let field = fmap
            .get(&key.name)
            .ok_or_else(|| BuildError::UnknownField(key.name.clone()))?;
        let sea_order = match key.dir {
            SortDir::Asc => Order::Asc,
            SortDir::Desc => Order::Desc,
        };
        Ok(query.order_by(field.col, sea_order))
    })
}
