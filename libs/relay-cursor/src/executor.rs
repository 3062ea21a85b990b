//! The data source seam: an ordered query executor plus cursor key extraction.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::cursor::CursorKey;
use crate::errors::Error;
use crate::order::SortSpec;
use crate::predicate::Predicate;
use crate::value::{Value, ValueKind};

/// Capability the pagination engine needs from a data source.
///
/// Implementations own query translation, snapshot consistency and retries.
/// The engine never retries and passes `Self::Error` through unchanged.
#[async_trait]
pub trait OrderedQueryExecutor: Send + Sync {
    type Row: Send + Sync;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Rows matching `predicate`, sorted by `order`, truncated to `limit` if given.
    async fn fetch(
        &self,
        predicate: &Predicate,
        order: &SortSpec,
        limit: Option<u64>,
    ) -> Result<Vec<Self::Row>, Self::Error>;

    /// `min(number of rows matching predicate, bound)`; must not scan past `bound` rows.
    async fn count_up_to(&self, predicate: &Predicate, bound: u64) -> Result<u64, Self::Error>;
}

/// Direct field lookup by name.
pub trait Record {
    fn field(&self, name: &str) -> Option<Value>;

    /// Kind every row holds for `name`, if fixed. Cursors whose components
    /// disagree are rejected before any query runs.
    fn field_kind(_name: &str) -> Option<ValueKind>
    where
        Self: Sized,
    {
        None
    }
}

impl Record for BTreeMap<String, Value> {
    fn field(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}

/// Extracts the cursor key of a row for a given sort order.
pub trait KeyExtractor<R>: Send + Sync {
    /// # Errors
    /// Returns `Error::MissingSortField` when the row has no value for a sort field.
    fn extract_key(&self, row: &R, order: &SortSpec) -> Result<CursorKey, Error>;

    /// Kind of the key component extracted for `field`, when known up front.
    fn key_kind(&self, _field: &str) -> Option<ValueKind> {
        None
    }
}

/// Default extractor: looks every sort field up through [`Record`].
#[derive(Clone, Copy, Debug, Default)]
pub struct FieldLookup;

impl<R: Record> KeyExtractor<R> for FieldLookup {
    fn extract_key(&self, row: &R, order: &SortSpec) -> Result<CursorKey, Error> {
        order
            .iter()
            .map(|f| {
                row.field(&f.name)
                    .ok_or_else(|| Error::MissingSortField(f.name.clone()))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(CursorKey::new)
    }

    fn key_kind(&self, field: &str) -> Option<ValueKind> {
        R::field_kind(field)
    }
}

impl<R, F> KeyExtractor<R> for F
where
    F: Fn(&R, &SortSpec) -> Result<CursorKey, Error> + Send + Sync,
{
    fn extract_key(&self, row: &R, order: &SortSpec) -> Result<CursorKey, Error> {
        self(row, order)
    }
}
