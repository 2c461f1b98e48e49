//! Cart aggregate persistence and lifecycle engine.
//!
//! Item mutations recompute their cart's summary in the same transaction, and the
//! lifecycle jobs reclassify idle carts as abandoned and reap them once stale.

pub mod context;
pub mod database;
pub mod domain;

#[cfg(test)]
mod test;

mod uuids;
