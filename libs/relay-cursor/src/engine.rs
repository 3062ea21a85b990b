//! Keyset pagination engine.
//!
//! One engine serves one page request:
//!
//! 1. `EngineBuilder::build` validates arguments, decodes cursors and derives
//!    the [`QueryPlan`] (predicate, fetch order, limit). Nothing is queried yet.
//! 2. The first call that needs rows issues exactly one `fetch`; the rows are
//!    memoized and reused by every later call.
//! 3. `has_next_page` / `has_previous_page` each run at most one bounded
//!    probe, independently and lazily, also memoized.
//!
//! # Example
//!
//! ```ignore
//! let engine = PaginationEngine::builder(&executor, "+created,+slug".parse()?)
//!     .filter(Predicate::eq("category", "Foo"))
//!     .build(&ConnectionArgs::forward(10).with_after(cursor))?;
//! let page = engine.resolve().await?;
//! ```

use tokio::sync::OnceCell;
use tracing::debug;

use crate::args::ConnectionArgs;
use crate::config::PaginationConfig;
use crate::cursor::{self, CursorKey};
use crate::errors::Error;
use crate::executor::{FieldLookup, KeyExtractor, OrderedQueryExecutor};
use crate::order::SortSpec;
use crate::page::{Connection, Edge, PageInfo};
use crate::predicate::{seek, Predicate, Seek};
use crate::value::ValueKind;

/// A bounded count query answering one page-info flag.
///
/// The flag is true iff `count_up_to(predicate, bound) > threshold`.
#[derive(Clone, Debug, PartialEq)]
pub struct Probe {
    pub predicate: Predicate,
    pub bound: u64,
    pub threshold: u64,
}

impl Probe {
    fn more_than(predicate: Predicate, n: u64) -> Self {
        Self {
            predicate,
            bound: n.saturating_add(1),
            threshold: n,
        }
    }

    fn exists(predicate: Predicate) -> Self {
        Self {
            predicate,
            bound: 1,
            threshold: 0,
        }
    }
}

/// Everything derived from the arguments before any query runs.
#[derive(Clone, Debug)]
pub struct QueryPlan {
    order: SortSpec,
    fetch_order: SortSpec,
    base: Predicate,
    predicate: Predicate,
    limit: Option<u64>,
    first: Option<u64>,
    last: Option<u64>,
    after_key: Option<CursorKey>,
    before_key: Option<CursorKey>,
}

impl QueryPlan {
    /// Derive the plan for `args` over `order`, restricted by `base`.
    ///
    /// # Errors
    /// - `Error::InvalidArgument` if `first` and `last` are both set or exceed the configured cap
    /// - `Error::MalformedCursor` if `after` / `before` do not decode to a key for `order`
    pub fn build(
        order: SortSpec,
        args: &ConnectionArgs,
        base: Predicate,
        config: &PaginationConfig,
    ) -> Result<Self, Error> {
        Self::build_typed(order, args, base, config, &[])
    }

    /// [`QueryPlan::build`], also checking every cursor component against
    /// `kinds` (one optional kind per sort field; `None` skips the check).
    ///
    /// # Errors
    /// As [`QueryPlan::build`]; a component of another kind is
    /// `Error::MalformedCursor(CursorError::KindMismatch { .. })`.
    pub fn build_typed(
        order: SortSpec,
        args: &ConnectionArgs,
        base: Predicate,
        config: &PaginationConfig,
        kinds: &[Option<ValueKind>],
    ) -> Result<Self, Error> {
        if args.first().is_some() && args.last().is_some() {
            return Err(Error::first_and_last());
        }
        if let Some(first) = args.first() {
            config.check_page_size("first", first)?;
        }
        if let Some(last) = args.last() {
            config.check_page_size("last", last)?;
        }

        let after_key = decode_bound(args.after(), &order, kinds, "after")?;
        let before_key = decode_bound(args.before(), &order, kinds, "before")?;

        let mut predicate = base.clone();
        if let Some(key) = &after_key {
            predicate = predicate.and(seek(&order, key, Seek::After)?);
        }
        if let Some(key) = &before_key {
            predicate = predicate.and(seek(&order, key, Seek::Before)?);
        }

        let fetch_order = if args.is_backward() {
            order.reversed()
        } else {
            order.clone()
        };

        debug!(
            order = %order.to_signed_tokens(),
            first = ?args.first(),
            last = ?args.last(),
            after = after_key.is_some(),
            before = before_key.is_some(),
            "built pagination plan"
        );

        Ok(Self {
            order,
            fetch_order,
            base,
            predicate,
            limit: args.limit(),
            first: args.first(),
            last: args.last(),
            after_key,
            before_key,
        })
    }

    /// Logical sort order; cursors are always taken in this order.
    #[must_use]
    pub fn order(&self) -> &SortSpec {
        &self.order
    }

    /// Order the main fetch runs with (reversed for `last`).
    #[must_use]
    pub fn fetch_order(&self) -> &SortSpec {
        &self.fetch_order
    }

    /// Caller filter AND cursor bounds.
    #[must_use]
    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    #[must_use]
    pub fn limit(&self) -> Option<u64> {
        self.limit
    }

    #[must_use]
    pub fn is_backward(&self) -> bool {
        self.last.is_some()
    }

    #[must_use]
    pub fn after_key(&self) -> Option<&CursorKey> {
        self.after_key.as_ref()
    }

    #[must_use]
    pub fn before_key(&self) -> Option<&CursorKey> {
        self.before_key.as_ref()
    }

    /// Probe for `hasNextPage`: more than `first` rows in range, else any row
    /// after `before`, else none (the flag is false).
    #[must_use]
    pub fn next_page_probe(&self) -> Option<Probe> {
        if let Some(first) = self.first {
            return Some(Probe::more_than(self.predicate.clone(), first));
        }
        let key = self.before_key.as_ref()?;
        self.outside(key, Seek::After).map(Probe::exists)
    }

    /// Probe for `hasPreviousPage`: more than `last` rows in range, else any
    /// row before `after`, else none (the flag is false).
    #[must_use]
    pub fn previous_page_probe(&self) -> Option<Probe> {
        if let Some(last) = self.last {
            return Some(Probe::more_than(self.predicate.clone(), last));
        }
        let key = self.after_key.as_ref()?;
        self.outside(key, Seek::Before).map(Probe::exists)
    }

    fn outside(&self, key: &CursorKey, side: Seek) -> Option<Predicate> {
        // Arity was checked when the key was decoded.
        seek(&self.order, key, side)
            .ok()
            .map(|p| self.base.clone().and(p))
    }
}

fn decode_bound(
    token: Option<&str>,
    order: &SortSpec,
    kinds: &[Option<ValueKind>],
    arg: &'static str,
) -> Result<Option<CursorKey>, Error> {
    token
        .map(|t| {
            cursor::decode_for(t, order)
                .and_then(|key| key.check_kinds(kinds).map(|()| key))
                .map_err(|e| {
                    debug!(arg, error = %e, "rejecting malformed cursor");
                    Error::MalformedCursor(e)
                })
        })
        .transpose()
}

/// Fluent builder for [`PaginationEngine`].
///
/// ```ignore
/// PaginationEngine::builder(&executor, order)
///     .filter(base_filter)            // optional, defaults to no filter
///     .config(cfg)                    // optional, defaults to PaginationConfig::default()
///     .extractor(|row: &Row, order: &SortSpec| ...) // optional, defaults to FieldLookup
///     .build(&args)?
/// ```
#[must_use]
pub struct EngineBuilder<'a, X, K> {
    executor: &'a X,
    order: SortSpec,
    filter: Predicate,
    config: PaginationConfig,
    extractor: K,
}

impl<'a, X, K> EngineBuilder<'a, X, K>
where
    X: OrderedQueryExecutor,
{
    /// AND `filter` into the base filter.
    pub fn filter(mut self, filter: Predicate) -> Self {
        self.filter = std::mem::take(&mut self.filter).and(filter);
        self
    }

    pub fn config(mut self, config: PaginationConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the cursor key extractor.
    pub fn extractor<K2>(self, extractor: K2) -> EngineBuilder<'a, X, K2>
    where
        K2: KeyExtractor<X::Row>,
    {
        EngineBuilder {
            executor: self.executor,
            order: self.order,
            filter: self.filter,
            config: self.config,
            extractor,
        }
    }

    /// Validate `args` and derive the query plan. Never touches the executor.
    ///
    /// # Errors
    /// See [`QueryPlan::build`].
    pub fn build(self, args: &ConnectionArgs) -> Result<PaginationEngine<'a, X, K>, Error>
    where
        K: KeyExtractor<X::Row>,
    {
        let kinds: Vec<Option<ValueKind>> = self
            .order
            .iter()
            .map(|f| self.extractor.key_kind(&f.name))
            .collect();
        let plan = QueryPlan::build_typed(self.order, args, self.filter, &self.config, &kinds)?;
        Ok(PaginationEngine {
            executor: self.executor,
            extractor: self.extractor,
            plan,
            concurrent_probes: self.config.concurrent_probes,
            rows: OnceCell::new(),
            has_next_page: OnceCell::new(),
            has_previous_page: OnceCell::new(),
        })
    }
}

/// Keyset pagination over an [`OrderedQueryExecutor`].
///
/// Holds only the derived plan and write-once memos of the fetch and probe
/// results. There is no way to change the plan after construction.
pub struct PaginationEngine<'a, X, K = FieldLookup>
where
    X: OrderedQueryExecutor,
{
    executor: &'a X,
    extractor: K,
    plan: QueryPlan,
    concurrent_probes: bool,
    rows: OnceCell<Vec<X::Row>>,
    has_next_page: OnceCell<bool>,
    has_previous_page: OnceCell<bool>,
}

impl<X, K> std::fmt::Debug for PaginationEngine<'_, X, K>
where
    X: OrderedQueryExecutor,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaginationEngine")
            .field("plan", &self.plan)
            .field("fetched", &self.rows.initialized())
            .finish_non_exhaustive()
    }
}

impl<'a, X> PaginationEngine<'a, X>
where
    X: OrderedQueryExecutor,
{
    pub fn builder(executor: &'a X, order: SortSpec) -> EngineBuilder<'a, X, FieldLookup> {
        EngineBuilder {
            executor,
            order,
            filter: Predicate::Always,
            config: PaginationConfig::default(),
            extractor: FieldLookup,
        }
    }

    /// Engine with no base filter, default config and [`FieldLookup`] keys.
    ///
    /// # Errors
    /// See [`QueryPlan::build`].
    pub fn new(executor: &'a X, order: SortSpec, args: &ConnectionArgs) -> Result<Self, Error>
    where
        FieldLookup: KeyExtractor<X::Row>,
    {
        Self::builder(executor, order).build(args)
    }
}

impl<X, K> PaginationEngine<'_, X, K>
where
    X: OrderedQueryExecutor,
    K: KeyExtractor<X::Row>,
{
    #[must_use]
    pub fn plan(&self) -> &QueryPlan {
        &self.plan
    }

    /// Page rows in logical order. Fetches once; later calls reuse the result.
    ///
    /// # Errors
    /// Returns `Error::DataSource` if the fetch fails (nothing is cached then).
    pub async fn rows(&self) -> Result<&[X::Row], Error> {
        self.rows
            .get_or_try_init(|| self.fetch_rows())
            .await
            .map(Vec::as_slice)
    }

    #[tracing::instrument(
        skip_all,
        fields(order = %self.plan.fetch_order.to_signed_tokens(), limit = ?self.plan.limit)
    )]
    async fn fetch_rows(&self) -> Result<Vec<X::Row>, Error> {
        let mut rows = self
            .executor
            .fetch(&self.plan.predicate, &self.plan.fetch_order, self.plan.limit)
            .await
            .map_err(Error::data_source)?;
        if self.plan.is_backward() {
            rows.reverse();
        }
        debug!(rows = rows.len(), "fetched page");
        Ok(rows)
    }

    /// Cursor of `row` under the logical order.
    ///
    /// # Errors
    /// Propagates the extractor's error.
    pub fn cursor_for(&self, row: &X::Row) -> Result<String, Error> {
        self.extractor
            .extract_key(row, &self.plan.order)
            .map(|key| key.encode())
    }

    /// Edges borrowing the cached rows.
    ///
    /// # Errors
    /// Fetch or key extraction errors.
    pub async fn edges(&self) -> Result<Vec<Edge<&X::Row>>, Error> {
        self.rows()
            .await?
            .iter()
            .map(|node| {
                Ok(Edge {
                    cursor: self.cursor_for(node)?,
                    node,
                })
            })
            .collect()
    }

    /// # Errors
    /// Returns `Error::DataSource` if the probe fails.
    pub async fn has_next_page(&self) -> Result<bool, Error> {
        self.has_next_page
            .get_or_try_init(|| self.run_probe(self.plan.next_page_probe(), "next"))
            .await
            .copied()
    }

    /// # Errors
    /// Returns `Error::DataSource` if the probe fails.
    pub async fn has_previous_page(&self) -> Result<bool, Error> {
        self.has_previous_page
            .get_or_try_init(|| self.run_probe(self.plan.previous_page_probe(), "previous"))
            .await
            .copied()
    }

    #[tracing::instrument(skip(self, probe), fields(bound = tracing::field::Empty))]
    async fn run_probe(&self, probe: Option<Probe>, side: &'static str) -> Result<bool, Error> {
        let Some(probe) = probe else {
            return Ok(false);
        };
        tracing::Span::current().record("bound", probe.bound);
        let count = self
            .executor
            .count_up_to(&probe.predicate, probe.bound)
            .await
            .map_err(Error::data_source)?;
        let result = count > probe.threshold;
        debug!(count, result, "page-info probe");
        Ok(result)
    }

    /// Both flags plus the start/end cursors of the page (which needs the rows).
    ///
    /// # Errors
    /// Fetch, probe or key extraction errors.
    pub async fn page_info(&self) -> Result<PageInfo, Error> {
        let has_next_page = self.has_next_page().await?;
        let has_previous_page = self.has_previous_page().await?;
        let rows = self.rows().await?;
        Ok(PageInfo {
            has_next_page,
            has_previous_page,
            start_cursor: rows.first().map(|r| self.cursor_for(r)).transpose()?,
            end_cursor: rows.last().map(|r| self.cursor_for(r)).transpose()?,
        })
    }

    /// Run everything still pending and hand the page over by value.
    ///
    /// # Errors
    /// Fetch, probe or key extraction errors.
    pub async fn resolve(self) -> Result<Connection<X::Row>, Error> {
        if self.concurrent_probes {
            tokio::try_join!(self.rows(), self.has_next_page(), self.has_previous_page())?;
        }
        let page_info = self.page_info().await?;
        let cursors = self
            .rows()
            .await?
            .iter()
            .map(|r| self.cursor_for(r))
            .collect::<Result<Vec<_>, _>>()?;

        let rows = self.rows.into_inner().unwrap_or_default();
        let edges = rows
            .into_iter()
            .zip(cursors)
            .map(|(node, cursor)| Edge { node, cursor })
            .collect();

        Ok(Connection { edges, page_info })
    }
}
