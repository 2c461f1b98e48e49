//! Cart Models

use jiff::Timestamp;
use rust_decimal::Decimal;

use crate::{
    domain::{lifecycle::scopes, products::models::ProductUuid},
    uuids::TypedUuid,
};

/// Cart UUID
pub type CartUuid = TypedUuid<Cart>;

/// Cart Item UUID
pub type CartItemUuid = TypedUuid<CartItem>;

/// Cart Model
///
/// `total_price` is the sum of the items' `total_price` and is only ever written by the
/// summary recalculation that runs with every item mutation.
#[derive(Debug, Clone)]
pub struct Cart {
    pub uuid: CartUuid,
    pub total_price: Decimal,
    pub abandoned: bool,
    pub last_interaction_at: Timestamp,
    pub items: Vec<CartItem>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Cart {
    /// Whether the cart has been idle long enough to be marked abandoned at `reference`.
    pub fn is_abandonable(&self, reference: Timestamp) -> bool {
        scopes::is_abandonable(self.abandoned, self.last_interaction_at, reference)
    }

    /// Whether the cart has been abandoned long enough to be deleted at `reference`.
    pub fn is_deletable(&self, reference: Timestamp) -> bool {
        scopes::is_deletable(self.abandoned, self.last_interaction_at, reference)
    }
}

/// New Cart Model
#[derive(Debug, Clone, PartialEq)]
pub struct NewCart {
    pub uuid: CartUuid,
}

/// CartItem Model
#[derive(Debug, Clone)]
pub struct CartItem {
    pub uuid: CartItemUuid,
    pub cart_uuid: CartUuid,
    pub product_uuid: ProductUuid,
    pub quantity: u32,
    /// Catalog price captured when the item was last saved.
    pub unit_price: Decimal,
    pub total_price: Decimal,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// NewCartItem Model
///
/// `quantity` is added to the existing line for the product, or used as the initial
/// quantity when the cart has no line for it yet. The `uuid` only applies on creation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCartItem {
    pub uuid: CartItemUuid,
    pub product_uuid: ProductUuid,
    pub quantity: i64,
}
