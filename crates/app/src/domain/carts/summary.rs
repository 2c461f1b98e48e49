//! Cart summary recalculation.

use jiff::Timestamp;
use rust_decimal::Decimal;
use sqlx::{Postgres, Transaction};
use tracing::debug;

use crate::domain::carts::{
    errors::CartsServiceError,
    models::CartUuid,
    repositories::{PgCartItemsRepository, PgCartsRepository},
};

/// Recomputes a cart's denormalized summary from its current items.
///
/// Always runs on the caller's transaction, so the new total commits (or rolls back)
/// together with the item mutation that triggered it.
#[derive(Debug, Clone, Default)]
pub(crate) struct SummaryRecalculator {
    carts: PgCartsRepository,
    items: PgCartItemsRepository,
}

impl SummaryRecalculator {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            carts: PgCartsRepository::new(),
            items: PgCartItemsRepository::new(),
        }
    }

    /// Sum the cart's items into its total, clear the abandonment flag and touch it.
    ///
    /// Returns `false` without error when the cart no longer exists.
    pub(crate) async fn recompute(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
        now: Timestamp,
    ) -> Result<bool, CartsServiceError> {
        let totals = self.items.get_cart_item_totals(tx, cart).await?;
        let total_price = sum_totals(totals)?;

        let rows_affected = self
            .carts
            .update_summary(tx, cart, total_price, now)
            .await?;

        if rows_affected == 0 {
            debug!(%cart, "cart vanished before its summary was recomputed");

            return Ok(false);
        }

        debug!(%cart, %total_price, "recomputed cart summary");

        Ok(true)
    }
}

/// Decimal-exact sum of line totals.
pub(crate) fn sum_totals(
    totals: impl IntoIterator<Item = Decimal>,
) -> Result<Decimal, CartsServiceError> {
    totals
        .into_iter()
        .try_fold(Decimal::ZERO, Decimal::checked_add)
        .filter(|total| *total >= Decimal::ZERO)
        .ok_or(CartsServiceError::Validation("total_price"))
}
