//! `OrderedQueryExecutor` over a SeaORM entity.

use async_trait::async_trait;
use relay_cursor::{EngineBuilder, OrderedQueryExecutor, PaginationEngine, Predicate, SortSpec};
use sea_orm::{
    sea_query::{Alias, Expr, Query},
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QuerySelect,
    QueryTrait, Select,
};
use thiserror::Error;
use tracing::debug;

use crate::condition::{apply_order, predicate_to_condition, BuildError};
use crate::field_map::FieldMap;

#[derive(Debug, Error)]
pub enum DbAdapterError {
    #[error("cannot translate query: {0}")]
    Build(#[from] BuildError),

    #[error(transparent)]
    Db(#[from] DbErr),
}

/// Runs page fetches and bounded counts against one entity.
///
/// Every query starts from `scope` (defaults to `E::find()`), so callers can
/// pre-apply joins or tenant filters that are not expressible as a `Predicate`.
pub struct SeaOrmExecutor<'a, E, C>
where
    E: EntityTrait,
{
    conn: &'a C,
    fields: FieldMap<E>,
    scope: Select<E>,
}

impl<'a, E, C> SeaOrmExecutor<'a, E, C>
where
    E: EntityTrait,
    E::Column: ColumnTrait + Copy,
    C: ConnectionTrait + Send + Sync,
{
    #[must_use]
    pub fn new(conn: &'a C, fields: FieldMap<E>) -> Self {
        Self {
            conn,
            fields,
            scope: E::find(),
        }
    }

    #[must_use]
    pub fn scoped(mut self, scope: Select<E>) -> Self {
        self.scope = scope;
        self
    }

    #[must_use]
    pub fn fields(&self) -> &FieldMap<E> {
        &self.fields
    }

    /// Engine builder over this executor, extracting cursor keys through the
    /// field map.
    pub fn paginate(&self, order: SortSpec) -> EngineBuilder<'_, Self, FieldMap<E>>
    where
        E::Model: Sync,
    {
        PaginationEngine::builder(self, order).extractor(self.fields.clone())
    }

    fn filtered(&self, predicate: &Predicate) -> Result<Select<E>, BuildError> {
        let select = self.scope.clone();
        if predicate.is_always() {
            return Ok(select);
        }
        Ok(select.filter(predicate_to_condition(predicate, &self.fields)?))
    }
}

#[async_trait]
impl<E, C> OrderedQueryExecutor for SeaOrmExecutor<'_, E, C>
where
    E: EntityTrait,
    E::Column: ColumnTrait + Copy,
    E::Model: Sync,
    C: ConnectionTrait + Send + Sync,
{
    type Row = E::Model;
    type Error = DbAdapterError;

    #[tracing::instrument(
        skip_all,
        fields(table = E::default().table_name(), order = %order, limit = ?limit)
    )]
    async fn fetch(
        &self,
        predicate: &Predicate,
        order: &SortSpec,
        limit: Option<u64>,
    ) -> Result<Vec<E::Model>, DbAdapterError> {
        let mut select = apply_order(self.filtered(predicate)?, order, &self.fields)?;
        if let Some(limit) = limit {
            select = select.limit(limit);
        }

        let rows = select.all(self.conn).await?;
        debug!(rows = rows.len(), "fetched rows");
        Ok(rows)
    }

    #[tracing::instrument(skip_all, fields(table = E::default().table_name(), bound = bound))]
    async fn count_up_to(&self, predicate: &Predicate, bound: u64) -> Result<u64, DbAdapterError> {
        if bound == 0 {
            return Ok(0);
        }

        // SELECT COUNT(*) FROM (SELECT 1 FROM .. WHERE .. LIMIT bound) AS bounded
        let inner = self
            .filtered(predicate)?
            .select_only()
            .expr(Expr::cust("1"))
            .limit(bound)
            .into_query();
        let stmt = Query::select()
            .expr(Expr::cust("COUNT(*)"))
            .from_subquery(inner, Alias::new("bounded"))
            .to_owned();

        let backend = self.conn.get_database_backend();
        let count: i64 = match self.conn.query_one(backend.build(&stmt)).await? {
            Some(row) => row.try_get_by_index(0)?,
            None => 0,
        };
        debug!(count, "bounded count");
        Ok(u64::try_from(count).unwrap_or_default())
    }
}
