//! In-memory [`OrderedQueryExecutor`] over a vector of [`Record`]s.
//!
//! Mostly useful in tests: it counts every fetch and probe it serves, so
//! callers can assert how many queries a page actually cost.

use std::cmp::Ordering;
use std::convert::Infallible;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

use async_trait::async_trait;

use crate::executor::{OrderedQueryExecutor, Record};
use crate::order::{SortDir, SortSpec};
use crate::predicate::Predicate;

#[derive(Debug, Default)]
pub struct InMemoryExecutor<R> {
    rows: Vec<R>,
    fetches: AtomicUsize,
    probes: AtomicUsize,
}

impl<R> InMemoryExecutor<R> {
    #[must_use]
    pub fn new(rows: Vec<R>) -> Self {
        Self {
            rows,
            fetches: AtomicUsize::new(0),
            probes: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    /// Number of `fetch` calls served so far.
    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(AtomicOrdering::SeqCst)
    }

    /// Number of `count_up_to` calls served so far.
    #[must_use]
    pub fn probe_count(&self) -> usize {
        self.probes.load(AtomicOrdering::SeqCst)
    }

    pub fn reset_counters(&self) {
        self.fetches.store(0, AtomicOrdering::SeqCst);
        self.probes.store(0, AtomicOrdering::SeqCst);
    }
}

/// Order two records by `order`. Missing values sort first; values of
/// different kinds compare equal.
#[must_use]
pub fn compare_rows<R: Record + ?Sized>(a: &R, b: &R, order: &SortSpec) -> Ordering {
    for field in order {
        let ord = match (a.field(&field.name), b.field(&field.name)) {
            (Some(x), Some(y)) => x.compare(&y).unwrap_or(Ordering::Equal),
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        let ord = match field.dir {
            SortDir::Asc => ord,
            SortDir::Desc => ord.reverse(),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

#[async_trait]
impl<R> OrderedQueryExecutor for InMemoryExecutor<R>
where
    R: Record + Clone + Send + Sync,
{
    type Row = R;
    type Error = Infallible;

    async fn fetch(
        &self,
        predicate: &Predicate,
        order: &SortSpec,
        limit: Option<u64>,
    ) -> Result<Vec<R>, Infallible> {
        self.fetches.fetch_add(1, AtomicOrdering::SeqCst);

        let mut rows: Vec<R> = self
            .rows
            .iter()
            .filter(|r| predicate.matches(*r))
            .cloned()
            .collect();
        rows.sort_by(|a, b| compare_rows(a, b, order));
        if let Some(limit) = limit {
            rows.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        }
        Ok(rows)
    }

    async fn count_up_to(&self, predicate: &Predicate, bound: u64) -> Result<u64, Infallible> {
        self.probes.fetch_add(1, AtomicOrdering::SeqCst);

        let bound = usize::try_from(bound).unwrap_or(usize::MAX);
        let seen = self
            .rows
            .iter()
            .filter(|r| predicate.matches(*r))
            .take(bound)
            .count();
        Ok(u64::try_from(seen).unwrap_or(u64::MAX))
    }
}
