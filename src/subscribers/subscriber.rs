//! # Event subscriber trait.
//!
//! Provides [`Subscribe`] an extension point for observing dispatch passes.
//!
//! ## Rules
//! - Delivery is synchronous: `on_event` runs inline, on the dispatching thread.
//! - Events are delivered in emission order.
//! - Panics are caught and reported as `EventKind::SubscriberPanicked`; they
//!   never abort the pass.

use crate::events::Event;

/// Event subscriber for runtime observability.
///
/// ### Implementation requirements
/// - Keep `on_event` cheap; it runs inside `dispatch`.
/// - Handle errors internally; do not panic.
pub trait Subscribe: Send + Sync + 'static {
    /// Processes a single event.
    fn on_event(&self, event: &Event);

    /// Returns the subscriber name used in logs and panic events.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose - override it when possible.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
