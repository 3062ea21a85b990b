//! Typed, composable row predicates and the keyset (seek) predicate builder.

use std::cmp::Ordering;
use std::fmt;

use crate::cursor::CursorKey;
use crate::errors::CursorError;
use crate::executor::Record;
use crate::order::{SortDir, SortSpec};
use crate::value::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl CompareOp {
    /// Whether `lhs <op> rhs` holds given `lhs.cmp(rhs) == ord`.
    #[must_use]
    pub fn holds(self, ord: Ordering) -> bool {
        match self {
            CompareOp::Eq => ord == Ordering::Equal,
            CompareOp::Ne => ord != Ordering::Equal,
            CompareOp::Gt => ord == Ordering::Greater,
            CompareOp::Ge => ord != Ordering::Less,
            CompareOp::Lt => ord == Ordering::Less,
            CompareOp::Le => ord != Ordering::Greater,
        }
    }

    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "<>",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
        }
    }
}

/// `field <op> value`
#[derive(Clone, Debug, PartialEq)]
pub struct Comparison {
    pub field: String,
    pub op: CompareOp,
    pub value: Value,
}

/// Boolean condition over rows.
///
/// Build with the helper constructors and [`Predicate::and`] / [`Predicate::or`];
/// those keep the tree flat and fold away `Always`/`Never`.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Predicate {
    #[default]
    Always,
    Never,
    Compare(Comparison),
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
}

impl Predicate {
    #[must_use]
    pub fn compare(field: impl Into<String>, op: CompareOp, value: impl Into<Value>) -> Self {
        Predicate::Compare(Comparison {
            field: field.into(),
            op,
            value: value.into(),
        })
    }

    #[must_use]
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, CompareOp::Eq, value)
    }

    #[must_use]
    pub fn ne(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, CompareOp::Ne, value)
    }

    #[must_use]
    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, CompareOp::Gt, value)
    }

    #[must_use]
    pub fn ge(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, CompareOp::Ge, value)
    }

    #[must_use]
    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, CompareOp::Lt, value)
    }

    #[must_use]
    pub fn le(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, CompareOp::Le, value)
    }

    /// Conjunction of all `preds`. Empty input is `Always`.
    #[must_use]
    pub fn all(preds: impl IntoIterator<Item = Predicate>) -> Self {
        let mut parts = Vec::new();
        for p in preds {
            match p {
                Predicate::Always => {}
                Predicate::Never => return Predicate::Never,
                Predicate::And(inner) => parts.extend(inner),
                other => parts.push(other),
            }
        }
        collapse(parts, Predicate::Always, Predicate::And)
    }

    /// Disjunction of all `preds`. Empty input is `Never`.
    #[must_use]
    pub fn any(preds: impl IntoIterator<Item = Predicate>) -> Self {
        let mut parts = Vec::new();
        for p in preds {
            match p {
                Predicate::Never => {}
                Predicate::Always => return Predicate::Always,
                Predicate::Or(inner) => parts.extend(inner),
                other => parts.push(other),
            }
        }
        collapse(parts, Predicate::Never, Predicate::Or)
    }

    /// Combine two predicates with AND: `self and other`
    #[must_use]
    pub fn and(self, other: Predicate) -> Predicate {
        Predicate::all([self, other])
    }

    /// Combine two predicates with OR: `self or other`
    #[must_use]
    pub fn or(self, other: Predicate) -> Predicate {
        Predicate::any([self, other])
    }

    #[must_use]
    pub fn is_always(&self) -> bool {
        matches!(self, Predicate::Always)
    }

    /// Evaluate against a row. A comparison on a missing field, or between
    /// values of different kinds, is false.
    #[must_use]
    pub fn matches<R: Record + ?Sized>(&self, row: &R) -> bool {
        match self {
            Predicate::Always => true,
            Predicate::Never => false,
            Predicate::Compare(c) => row
                .field(&c.field)
                .and_then(|v| v.compare(&c.value))
                .is_some_and(|ord| c.op.holds(ord)),
            Predicate::And(items) => items.iter().all(|p| p.matches(row)),
            Predicate::Or(items) => items.iter().any(|p| p.matches(row)),
            Predicate::Not(inner) => !inner.matches(row),
        }
    }
}

fn collapse(
    mut parts: Vec<Predicate>,
    empty: Predicate,
    wrap: fn(Vec<Predicate>) -> Predicate,
) -> Predicate {
    match parts.len() {
        0 => empty,
        1 => parts.pop().unwrap_or(empty),
        _ => wrap(parts),
    }
}

impl std::ops::Not for Predicate {
    type Output = Predicate;

    fn not(self) -> Self::Output {
        match self {
            Predicate::Always => Predicate::Never,
            Predicate::Never => Predicate::Always,
            Predicate::Not(inner) => *inner,
            other => Predicate::Not(Box::new(other)),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join(f: &mut fmt::Formatter<'_>, items: &[Predicate], sep: &str) -> fmt::Result {
            f.write_str("(")?;
            for (i, p) in items.iter().enumerate() {
                if i > 0 {
                    f.write_str(sep)?;
                }
                write!(f, "{p}")?;
            }
            f.write_str(")")
        }

        match self {
            Predicate::Always => f.write_str("true"),
            Predicate::Never => f.write_str("false"),
            Predicate::Compare(c) => write!(f, "{} {} {}", c.field, c.op.symbol(), c.value),
            Predicate::And(items) => join(f, items, " and "),
            Predicate::Or(items) => join(f, items, " or "),
            Predicate::Not(inner) => write!(f, "not {inner}"),
        }
    }
}

/// Which side of a cursor a seek predicate selects.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Seek {
    /// Rows strictly after the key in sort order.
    After,
    /// Rows strictly before the key in sort order.
    Before,
}

impl Seek {
    fn strict_op(self, dir: SortDir) -> CompareOp {
        match (self, dir) {
            (Seek::After, SortDir::Asc) | (Seek::Before, SortDir::Desc) => CompareOp::Gt,
            (Seek::After, SortDir::Desc) | (Seek::Before, SortDir::Asc) => CompareOp::Lt,
        }
    }
}

/// Build the keyset predicate selecting rows strictly after (or before) `key`
/// under `order`.
///
/// For `order = [f0, f1, .., fn]` this is the lexicographic OR-chain
/// `(f0 > k0) or (f0 = k0 and f1 > k1) or ... or (f0 = k0 and .. and fn > kn)`,
/// with each strict comparison flipped for descending fields and for `Before`.
///
/// # Errors
/// Returns `CursorError::ArityMismatch` if `key` does not have one component per sort field.
pub fn seek(order: &SortSpec, key: &CursorKey, side: Seek) -> Result<Predicate, CursorError> {
    if key.len() != order.len() {
        return Err(CursorError::ArityMismatch {
            expected: order.len(),
            got: key.len(),
        });
    }

    let pairs: Vec<_> = order.iter().zip(key.values()).collect();
    let branches = (0..pairs.len()).map(|i| {
        let prefix = pairs[..i]
            .iter()
            .map(|(field, value)| Predicate::eq(field.name.clone(), (*value).clone()));
        let (field, value) = pairs[i];
        let tie_break =
            Predicate::compare(field.name.clone(), side.strict_op(field.dir), value.clone());
        Predicate::all(prefix.chain(std::iter::once(tie_break)))
    });

    Ok(Predicate::any(branches))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    type Row = BTreeMap<String, Value>;

    fn row(a: i64, b: &str, c: bool) -> Row {
        BTreeMap::from([
            ("a".to_owned(), Value::I64(a)),
            ("b".to_owned(), Value::String(b.to_owned())),
            ("c".to_owned(), Value::Bool(c)),
        ])
    }

    fn grid() -> Vec<Row> {
        let mut rows = Vec::new();
        for a in 0..3 {
            for b in ["x", "y", "z"] {
                for c in [false, true] {
                    rows.push(row(a, b, c));
                }
            }
        }
        rows
    }

    fn key_of(r: &Row, order: &SortSpec) -> CursorKey {
        order.iter().map(|f| r[&f.name].clone()).collect()
    }

    fn cmp_rows(lhs: &Row, rhs: &Row, order: &SortSpec) -> Ordering {
        for f in order {
            let ord = lhs[&f.name].compare(&rhs[&f.name]).unwrap();
            let ord = match f.dir {
                SortDir::Asc => ord,
                SortDir::Desc => ord.reverse(),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }

    #[test]
    fn single_field_seek_is_a_plain_comparison() {
        let order: SortSpec = "-a".parse().unwrap();
        let key = CursorKey::new(vec![Value::I64(5)]);

        assert_eq!(
            seek(&order, &key, Seek::After).unwrap(),
            Predicate::lt("a", 5_i64)
        );
        assert_eq!(
            seek(&order, &key, Seek::Before).unwrap(),
            Predicate::gt("a", 5_i64)
        );
    }

    #[test]
    fn two_field_seek_has_prefix_equality_branches() {
        let order: SortSpec = "+a,-b".parse().unwrap();
        let key = CursorKey::new(vec![Value::I64(1), Value::String("y".into())]);

        let p = seek(&order, &key, Seek::After).unwrap();

        assert_eq!(
            p,
            Predicate::Or(vec![
                Predicate::gt("a", 1_i64),
                Predicate::And(vec![Predicate::eq("a", 1_i64), Predicate::lt("b", "y")]),
            ])
        );
        assert_eq!(p.to_string(), "(a > 1 or (a = 1 and b < 'y'))");
    }

    #[test]
    fn seek_selects_exactly_the_strictly_later_or_earlier_rows() {
        let rows = grid();
        for tokens in ["+a,+b,+c", "-a,+b,-c", "+b,-c,-a", "-c,-b,-a"] {
            let order: SortSpec = tokens.parse().unwrap();
            for pivot in &rows {
                let key = key_of(pivot, &order);
                let after = seek(&order, &key, Seek::After).unwrap();
                let before = seek(&order, &key, Seek::Before).unwrap();
                for candidate in &rows {
                    let ord = cmp_rows(candidate, pivot, &order);
                    assert_eq!(after.matches(candidate), ord == Ordering::Greater, "{tokens}");
                    assert_eq!(before.matches(candidate), ord == Ordering::Less, "{tokens}");
                }
            }
        }
    }

    #[test]
    fn seek_rejects_wrong_arity() {
        let order: SortSpec = "+a,+b".parse().unwrap();
        let key = CursorKey::new(vec![Value::I64(1)]);
        assert_eq!(
            seek(&order, &key, Seek::After).unwrap_err(),
            CursorError::ArityMismatch {
                expected: 2,
                got: 1
            }
        );
    }

    #[test]
    fn and_or_fold_constants_and_flatten() {
        let p = Predicate::eq("a", 1_i64);
        assert_eq!(Predicate::Always.and(p.clone()), p);
        assert_eq!(p.clone().and(Predicate::Never), Predicate::Never);
        assert_eq!(p.clone().or(Predicate::Always), Predicate::Always);
        assert_eq!(Predicate::Never.or(p.clone()), p);
        assert_eq!(Predicate::all([]), Predicate::Always);
        assert_eq!(Predicate::any([]), Predicate::Never);

        let nested = p.clone().and(Predicate::eq("b", "x")).and(Predicate::eq("c", true));
        assert!(matches!(nested, Predicate::And(ref items) if items.len() == 3));
    }

    #[test]
    fn matches_is_false_for_missing_fields_and_kind_mismatch() {
        let r = row(1, "x", true);
        assert!(!Predicate::eq("missing", 1_i64).matches(&r));
        assert!(!Predicate::eq("a", "1").matches(&r));
        assert!((!Predicate::eq("a", "1")).matches(&r));
        assert!(Predicate::ne("b", "y").matches(&r));
    }
}
