//! Cart Domain Concerns

pub mod carts;
pub mod lifecycle;
pub mod products;
