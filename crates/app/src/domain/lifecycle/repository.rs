//! Lifecycle Repository
//!
//! A chunk is the next `limit` carts in scope after the keyset cursor, locked for the rest of
//! the chunk transaction so that a concurrent item mutation cannot move a cart out of scope
//! between selection and mutation.

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{Postgres, Transaction, query, query_scalar};
use uuid::Uuid;

use crate::domain::{carts::models::CartUuid, lifecycle::scopes::LifecycleScope};

const LOCK_CHUNK_SQL: &str = include_str!("sql/lock_chunk.sql");
const MARK_ABANDONED_SQL: &str = include_str!("sql/mark_abandoned.sql");
const DELETE_CART_ITEMS_SQL: &str = include_str!("sql/delete_cart_items.sql");
const DELETE_CARTS_SQL: &str = include_str!("sql/delete_carts.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgLifecycleRepository;

impl PgLifecycleRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Lock the next chunk of carts in `scope` whose last interaction is before `cutoff`,
    /// in UUID order after `after`.
    pub(crate) async fn lock_chunk(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        scope: LifecycleScope,
        cutoff: Timestamp,
        after: Option<CartUuid>,
        limit: usize,
    ) -> Result<Vec<CartUuid>, sqlx::Error> {
        let uuids: Vec<Uuid> = query_scalar(LOCK_CHUNK_SQL)
            .bind(scope.abandoned)
            .bind(SqlxTimestamp::from(cutoff))
            .bind(after.map(CartUuid::into_uuid))
            .bind(i64::try_from(limit).unwrap_or(i64::MAX))
            .fetch_all(&mut **tx)
            .await?;

        Ok(uuids.into_iter().map(CartUuid::from_uuid).collect())
    }

    pub(crate) async fn mark_abandoned(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        carts: &[CartUuid],
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(MARK_ABANDONED_SQL)
            .bind(into_uuids(carts))
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    /// Delete `carts` together with their items, items first.
    pub(crate) async fn delete_carts(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        carts: &[CartUuid],
    ) -> Result<u64, sqlx::Error> {
        let uuids = into_uuids(carts);

        query(DELETE_CART_ITEMS_SQL)
            .bind(&uuids)
            .execute(&mut **tx)
            .await?;

        let rows_affected = query(DELETE_CARTS_SQL)
            .bind(&uuids)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

fn into_uuids(carts: &[CartUuid]) -> Vec<Uuid> {
    carts.iter().copied().map(CartUuid::into_uuid).collect()
}
