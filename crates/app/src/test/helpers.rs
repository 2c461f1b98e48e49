//! Test Helpers

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use rust_decimal::Decimal;
use sqlx::query;

use crate::{
    domain::{
        carts::{
            CartsService, CartsServiceError,
            models::{Cart, CartUuid, NewCart},
        },
        products::{
            ProductsService, ProductsServiceError,
            models::{NewProduct, Product, ProductUpdate, ProductUuid},
        },
    },
    test::TestContext,
};

/// Current time truncated to the precision timestamps are stored with.
pub(crate) fn now() -> Timestamp {
    Timestamp::from_microsecond(Timestamp::now().as_microsecond())
        .expect("current time should be representable")
}

pub(crate) async fn create_cart(ctx: &TestContext) -> Result<Cart, CartsServiceError> {
    ctx.carts
        .create_cart(NewCart {
            uuid: CartUuid::new(),
        })
        .await
}

pub(crate) async fn create_product(
    ctx: &TestContext,
    price: Decimal,
) -> Result<Product, ProductsServiceError> {
    ctx.products
        .create_product(NewProduct {
            uuid: ProductUuid::new(),
            price,
        })
        .await
}

pub(crate) async fn set_product_price(
    ctx: &TestContext,
    product: ProductUuid,
    price: Decimal,
) -> Result<Product, ProductsServiceError> {
    ctx.products
        .update_product(product, ProductUpdate { price })
        .await
}

/// Overwrite a cart's lifecycle state directly, bypassing the summary recalculation.
pub(crate) async fn set_cart_state(
    ctx: &TestContext,
    cart: CartUuid,
    abandoned: bool,
    last_interaction_at: Timestamp,
) -> Result<(), sqlx::Error> {
    query("UPDATE carts SET abandoned = $2, last_interaction_at = $3 WHERE uuid = $1")
        .bind(cart.into_uuid())
        .bind(abandoned)
        .bind(SqlxTimestamp::from(last_interaction_at))
        .execute(ctx.db.pool())
        .await?;

    Ok(())
}

/// Insert an empty cart with the given lifecycle state.
pub(crate) async fn seed_cart(
    ctx: &TestContext,
    abandoned: bool,
    last_interaction_at: Timestamp,
) -> Result<CartUuid, sqlx::Error> {
    let uuid = CartUuid::new();

    query(
        "INSERT INTO carts (uuid, total_price, abandoned, last_interaction_at, created_at, updated_at) \
         VALUES ($1, 0, $2, $3, $3, $3)",
    )
    .bind(uuid.into_uuid())
    .bind(abandoned)
    .bind(SqlxTimestamp::from(last_interaction_at))
    .execute(ctx.db.pool())
    .await?;

    Ok(uuid)
}

/// Insert `count` empty carts sharing one lifecycle state, in a single transaction.
pub(crate) async fn seed_carts(
    ctx: &TestContext,
    count: usize,
    abandoned: bool,
    last_interaction_at: Timestamp,
) -> Result<Vec<CartUuid>, sqlx::Error> {
    let mut tx = ctx.db.pool().begin().await?;
    let mut uuids = Vec::with_capacity(count);

    for _ in 0..count {
        let uuid = CartUuid::new();

        query(
            "INSERT INTO carts (uuid, total_price, abandoned, last_interaction_at, created_at, updated_at) \
             VALUES ($1, 0, $2, $3, $3, $3)",
        )
        .bind(uuid.into_uuid())
        .bind(abandoned)
        .bind(SqlxTimestamp::from(last_interaction_at))
        .execute(&mut *tx)
        .await?;

        uuids.push(uuid);
    }

    tx.commit().await?;

    Ok(uuids)
}

/// Count carts, optionally filtered by their abandonment flag.
pub(crate) async fn count_carts(
    ctx: &TestContext,
    abandoned: Option<bool>,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM carts WHERE $1::BOOLEAN IS NULL OR abandoned = $1")
        .bind(abandoned)
        .fetch_one(ctx.db.pool())
        .await
}

pub(crate) async fn count_cart_items(ctx: &TestContext, cart: CartUuid) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM cart_items WHERE cart_uuid = $1")
        .bind(cart.into_uuid())
        .fetch_one(ctx.db.pool())
        .await
}

/// Make every cart delete fail once fewer than `remaining` carts are left.
pub(crate) async fn fail_cart_deletes_below(
    ctx: &TestContext,
    remaining: i64,
) -> Result<(), sqlx::Error> {
    // Function bodies cannot take bound parameters.
    let function = format!(
        "CREATE FUNCTION reject_cart_delete() RETURNS TRIGGER AS $$ \
         BEGIN \
             IF (SELECT COUNT(*) FROM carts) < {remaining} THEN \
                 RAISE EXCEPTION 'cart delete rejected'; \
             END IF; \
             RETURN OLD; \
         END $$ LANGUAGE plpgsql"
    );

    query(&function).execute(ctx.db.pool()).await?;

    query(
        "CREATE TRIGGER fail_cart_deletes BEFORE DELETE ON carts \
         FOR EACH ROW EXECUTE FUNCTION reject_cart_delete()",
    )
    .execute(ctx.db.pool())
    .await?;

    Ok(())
}
