//! Lifecycle scopes.
//!
//! A cart is *abandonable* once it has been idle for longer than [`ABANDON_AFTER`] and is
//! *deletable* once it has been abandoned and idle for longer than [`DELETE_AFTER`]. Both
//! windows are strict: a cart idle for exactly the window is not yet in scope.

use jiff::{SignedDuration, Timestamp};

use crate::domain::lifecycle::errors::LifecycleError;

/// Idle time after which an active cart is marked abandoned.
pub const ABANDON_AFTER: SignedDuration = SignedDuration::from_hours(3);

/// Idle time after which an abandoned cart is deleted.
pub const DELETE_AFTER: SignedDuration = SignedDuration::from_hours(7 * 24);

/// A selection of carts by abandonment flag and idle window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecycleScope {
    pub abandoned: bool,
    pub window: SignedDuration,
}

impl LifecycleScope {
    /// Active carts idle for longer than [`ABANDON_AFTER`].
    pub const ABANDONABLE: Self = Self {
        abandoned: false,
        window: ABANDON_AFTER,
    };

    /// Abandoned carts idle for longer than [`DELETE_AFTER`].
    pub const DELETABLE: Self = Self {
        abandoned: true,
        window: DELETE_AFTER,
    };

    /// Latest `last_interaction_at` still considered too recent at `reference`.
    ///
    /// Carts are in scope when their last interaction is strictly before the cutoff.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::InvalidReferenceTime`] when the cutoff falls outside the
    /// representable timestamp range.
    pub fn cutoff(&self, reference: Timestamp) -> Result<Timestamp, LifecycleError> {
        reference
            .checked_sub(self.window)
            .map_err(|source| LifecycleError::InvalidReferenceTime { reference, source })
    }

    /// Whether a cart with the given state falls into this scope at `reference`.
    #[must_use]
    pub fn includes(
        &self,
        abandoned: bool,
        last_interaction_at: Timestamp,
        reference: Timestamp,
    ) -> bool {
        abandoned == self.abandoned
            && self
                .cutoff(reference)
                .is_ok_and(|cutoff| last_interaction_at < cutoff)
    }
}

#[must_use]
pub fn is_abandonable(
    abandoned: bool,
    last_interaction_at: Timestamp,
    reference: Timestamp,
) -> bool {
    LifecycleScope::ABANDONABLE.includes(abandoned, last_interaction_at, reference)
}

#[must_use]
pub fn is_deletable(
    abandoned: bool,
    last_interaction_at: Timestamp,
    reference: Timestamp,
) -> bool {
    LifecycleScope::DELETABLE.includes(abandoned, last_interaction_at, reference)
}
