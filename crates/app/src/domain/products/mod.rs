//! Products
//!
//! The read-mostly catalog that cart items snapshot their prices from.

pub mod errors;
pub mod models;
pub(crate) mod repository;
pub mod service;

pub use errors::ProductsServiceError;
pub use service::*;
