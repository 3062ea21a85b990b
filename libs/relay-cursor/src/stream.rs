//! Walk a whole result set page by page.
//!
//! Each step builds a fresh engine with `first = page_size` and `after` set to
//! the previous page's end cursor, and stops once `hasNextPage` is false.

use futures::stream::{self, Stream, TryStreamExt};

use crate::args::ConnectionArgs;
use crate::config::PaginationConfig;
use crate::engine::PaginationEngine;
use crate::errors::Error;
use crate::executor::{FieldLookup, KeyExtractor, OrderedQueryExecutor};
use crate::order::SortSpec;
use crate::page::Connection;
use crate::predicate::Predicate;

enum Walk {
    Next(Option<String>),
    Done,
}

/// Stream of forward pages over everything matching `filter`.
///
/// The stream ends after the first error. A `page_size` of zero cannot make
/// progress and yields `Error::InvalidArgument` as the only item.
pub fn forward_pages<'a, X>(
    executor: &'a X,
    order: SortSpec,
    filter: Predicate,
    page_size: u64,
    config: PaginationConfig,
) -> impl Stream<Item = Result<Connection<X::Row>, Error>> + 'a
where
    X: OrderedQueryExecutor,
    FieldLookup: KeyExtractor<X::Row>,
{
    stream::try_unfold(Walk::Next(None), move |walk| {
        let order = order.clone();
        let filter = filter.clone();
        let config = config.clone();
        async move {
            let Walk::Next(after) = walk else {
                return Ok(None);
            };
            if page_size == 0 {
                return Err(Error::InvalidArgument(
                    "page_size must be greater than zero".to_owned(),
                ));
            }

            let mut args = ConnectionArgs::forward(page_size);
            if let Some(cursor) = after {
                args = args.with_after(cursor);
            }
            let page = PaginationEngine::builder(executor, order)
                .filter(filter)
                .config(config)
                .build(&args)?
                .resolve()
                .await?;

            let next = match (&page.page_info.end_cursor, page.page_info.has_next_page) {
                (Some(cursor), true) => Walk::Next(Some(cursor.clone())),
                _ => Walk::Done,
            };
            tracing::debug!(rows = page.len(), more = matches!(next, Walk::Next(_)), "streamed page");
            Ok::<_, Error>(Some((page, next)))
        }
    })
}

/// [`forward_pages`] flattened to individual rows.
pub fn forward_nodes<'a, X>(
    executor: &'a X,
    order: SortSpec,
    filter: Predicate,
    page_size: u64,
    config: PaginationConfig,
) -> impl Stream<Item = Result<X::Row, Error>> + 'a
where
    X: OrderedQueryExecutor,
    FieldLookup: KeyExtractor<X::Row>,
{
    forward_pages(executor, order, filter, page_size, config)
        .map_ok(|page| stream::iter(page.into_nodes().into_iter().map(Ok)))
        .try_flatten()
}
