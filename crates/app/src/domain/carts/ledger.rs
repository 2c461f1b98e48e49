//! Item ledger rules.
//!
//! Pure quantity and pricing rules applied to a cart line before it is written.

use rust_decimal::Decimal;

use crate::domain::carts::errors::CartsServiceError;

/// A requested change to a cart line's quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityChange {
    /// Add to the current quantity (negative values decrement).
    Increment(i64),

    /// Replace the current quantity.
    Set(i64),
}

impl QuantityChange {
    /// Resolve the line quantity after applying this change to `current`, which is `None`
    /// when the cart has no line for the product yet.
    ///
    /// # Errors
    ///
    /// Returns [`CartsServiceError::Validation`] when the resulting quantity is not positive.
    pub fn apply(self, current: Option<u32>) -> Result<u32, CartsServiceError> {
        let resolved = match self {
            Self::Increment(delta) => i64::from(current.unwrap_or(0)).checked_add(delta),
            Self::Set(quantity) => Some(quantity),
        };

        resolved
            .filter(|quantity| *quantity > 0)
            .and_then(|quantity| u32::try_from(quantity).ok())
            .ok_or(CartsServiceError::Validation("quantity"))
    }
}

/// Price a line as `quantity * unit_price`.
///
/// # Errors
///
/// Returns [`CartsServiceError::Validation`] when the total is negative or overflows.
pub fn line_total(unit_price: Decimal, quantity: u32) -> Result<Decimal, CartsServiceError> {
    unit_price
        .checked_mul(Decimal::from(quantity))
        .filter(|total| *total >= Decimal::ZERO)
        .ok_or(CartsServiceError::Validation("total_price"))
}
