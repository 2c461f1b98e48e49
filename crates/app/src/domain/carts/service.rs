//! Carts service.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use sqlx::{Postgres, Transaction};
use tracing::debug;

use crate::{
    database::Db,
    domain::{
        carts::{
            errors::CartsServiceError,
            ledger::{QuantityChange, line_total},
            models::{Cart, CartItemUuid, CartUuid, NewCart, NewCartItem},
            repositories::{LineValues, PgCartItemsRepository, PgCartsRepository},
            summary::SummaryRecalculator,
        },
        products::{models::ProductUuid, repository::PgProductsRepository},
    },
};

#[derive(Debug, Clone)]
pub struct PgCartsService {
    db: Db,
    carts_repository: PgCartsRepository,
    items_repository: PgCartItemsRepository,
    products_repository: PgProductsRepository,
    summary: SummaryRecalculator,
}

impl PgCartsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            carts_repository: PgCartsRepository::new(),
            items_repository: PgCartItemsRepository::new(),
            products_repository: PgProductsRepository::new(),
            summary: SummaryRecalculator::new(),
        }
    }

    async fn load_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        uuid: CartUuid,
    ) -> Result<Cart, CartsServiceError> {
        let mut cart = self.carts_repository.get_cart(tx, uuid).await?;

        let items = self.items_repository.get_cart_items(tx, uuid).await?;

        cart.items.extend(items);

        Ok(cart)
    }

    /// Serialize on the cart row, failing with `NotFound` when the cart does not exist.
    async fn lock_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
    ) -> Result<(), CartsServiceError> {
        if self.carts_repository.lock_cart(tx, cart).await? {
            Ok(())
        } else {
            Err(CartsServiceError::NotFound)
        }
    }

    /// Create or update the cart's line for `product`, re-snapshotting the catalog price,
    /// then recompute the cart summary in the same transaction.
    async fn upsert_item(
        &self,
        cart: CartUuid,
        product: ProductUuid,
        item: CartItemUuid,
        change: QuantityChange,
    ) -> Result<Cart, CartsServiceError> {
        let now = Timestamp::now();

        let mut tx = self.db.begin().await?;

        self.lock_cart(&mut tx, cart).await?;

        let existing = self
            .items_repository
            .find_cart_item(&mut tx, cart, product)
            .await?;

        let quantity = change.apply(existing.as_ref().map(|item| item.quantity))?;

        let unit_price = self
            .products_repository
            .get_product_price(&mut tx, product)
            .await?;

        let line = LineValues {
            quantity,
            unit_price,
            total_price: line_total(unit_price, quantity)?,
        };

        let saved = match existing {
            Some(existing) => {
                self.items_repository
                    .update_cart_item(&mut tx, existing.uuid, line, now)
                    .await?
            }
            None => {
                self.items_repository
                    .create_cart_item(&mut tx, cart, item, product, line, now)
                    .await?
            }
        };

        self.summary.recompute(&mut tx, cart, now).await?;

        let updated = self.load_cart(&mut tx, cart).await?;

        tx.commit().await?;

        debug!(
            %cart,
            %product,
            item = %saved.uuid,
            quantity = saved.quantity,
            total_price = %updated.total_price,
            "saved cart item"
        );

        Ok(updated)
    }
}

#[async_trait]
impl CartsService for PgCartsService {
    async fn get_cart(&self, uuid: CartUuid) -> Result<Cart, CartsServiceError> {
        let mut tx = self.db.begin().await?;

        let cart = self.load_cart(&mut tx, uuid).await?;

        tx.commit().await?;

        Ok(cart)
    }

    async fn create_cart(&self, cart: NewCart) -> Result<Cart, CartsServiceError> {
        let mut tx = self.db.begin().await?;

        let created = self
            .carts_repository
            .create_cart(&mut tx, cart.uuid, Timestamp::now())
            .await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn add_item(&self, cart: CartUuid, item: NewCartItem) -> Result<Cart, CartsServiceError> {
        self.upsert_item(
            cart,
            item.product_uuid,
            item.uuid,
            QuantityChange::Increment(item.quantity),
        )
        .await
    }

    async fn set_item_quantity(
        &self,
        cart: CartUuid,
        product: ProductUuid,
        quantity: i64,
    ) -> Result<Cart, CartsServiceError> {
        self.upsert_item(
            cart,
            product,
            CartItemUuid::new(),
            QuantityChange::Set(quantity),
        )
        .await
    }

    async fn remove_item(
        &self,
        cart: CartUuid,
        product: ProductUuid,
    ) -> Result<Cart, CartsServiceError> {
        let now = Timestamp::now();

        let mut tx = self.db.begin().await?;

        self.lock_cart(&mut tx, cart).await?;

        let rows_affected = self
            .items_repository
            .delete_cart_item(&mut tx, cart, product)
            .await?;

        if rows_affected == 0 {
            return Err(CartsServiceError::NotFound);
        }

        self.summary.recompute(&mut tx, cart, now).await?;

        let updated = self.load_cart(&mut tx, cart).await?;

        tx.commit().await?;

        debug!(%cart, %product, total_price = %updated.total_price, "removed cart item");

        Ok(updated)
    }

    async fn recompute_summary(&self, cart: CartUuid) -> Result<Option<Cart>, CartsServiceError> {
        let mut tx = self.db.begin().await?;

        if !self.summary.recompute(&mut tx, cart, Timestamp::now()).await? {
            tx.commit().await?;

            return Ok(None);
        }

        let updated = self.load_cart(&mut tx, cart).await?;

        tx.commit().await?;

        Ok(Some(updated))
    }
}

#[automock]
#[async_trait]
pub trait CartsService: Send + Sync {
    /// Retrieve a single cart with its items.
    async fn get_cart(&self, uuid: CartUuid) -> Result<Cart, CartsServiceError>;

    /// Creates a new, empty cart with the given UUID.
    async fn create_cart(&self, cart: NewCart) -> Result<Cart, CartsServiceError>;

    /// Add `item.quantity` of a product to the cart, creating the line if needed.
    async fn add_item(&self, cart: CartUuid, item: NewCartItem) -> Result<Cart, CartsServiceError>;

    /// Set the quantity of a product in the cart, creating the line if needed.
    async fn set_item_quantity(
        &self,
        cart: CartUuid,
        product: ProductUuid,
        quantity: i64,
    ) -> Result<Cart, CartsServiceError>;

    /// Remove a product's line from the cart.
    async fn remove_item(
        &self,
        cart: CartUuid,
        product: ProductUuid,
    ) -> Result<Cart, CartsServiceError>;

    /// Recompute the cart's total from its items and refresh its lifecycle bookkeeping.
    ///
    /// Returns `None` when the cart no longer exists.
    async fn recompute_summary(&self, cart: CartUuid) -> Result<Option<Cart>, CartsServiceError>;
}
