//! Cart lifecycle
//!
//! Carts idle past [`scopes::ABANDON_AFTER`] are marked abandoned, and abandoned carts idle
//! past [`scopes::DELETE_AFTER`] are deleted. Both transitions run in bulk through the
//! [`batch::BatchProcessor`].

pub mod batch;
pub mod errors;
pub mod observer;
mod repository;
pub mod scopes;
pub mod service;

pub use errors::LifecycleError;
pub use service::*;
