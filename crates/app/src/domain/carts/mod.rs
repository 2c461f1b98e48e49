//! Carts

pub mod errors;
pub mod ledger;
pub mod models;
mod repositories;
pub mod service;
mod summary;

pub use errors::CartsServiceError;
pub use service::*;
