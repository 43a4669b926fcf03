//! # Synchronous event fan-out to multiple subscribers.
//!
//! Provides [`SubscriberSet`], which delivers each event to every subscriber, in
//! registration order, on the caller's thread.
//!
//! ## Architecture
//! ```text
//! emit(event)
//!     │
//!     ├──► subscriber1.on_event()
//!     │         └──► panic → SubscriberPanicked ──► other subscribers
//!     ├──► subscriber2.on_event()
//!     └──► subscriberN.on_event()
//! ```
//!
//! ## Rules
//! - **Ordering**: every subscriber sees events in emission order
//! - **Isolation**: a panicking subscriber doesn't affect others or the pass
//! - **No loops**: a `SubscriberPanicked` event that panics is not re-reported
//!
//! **Warning**: `AssertUnwindSafe` is used, which can leave shared state inconsistent
//! if a subscriber uses `Mutex<T>` and panics while holding the lock.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use crate::events::Event;
use crate::subscribers::Subscribe;

/// Fan-out coordinator for multiple event subscribers.
#[derive(Default)]
pub struct SubscriberSet {
    subs: Vec<Arc<dyn Subscribe>>,
}

impl SubscriberSet {
    /// Creates a new set.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>) -> Self {
        Self { subs }
    }

    /// Delivers `event` to all subscribers.
    pub fn emit(&self, event: &Event) {
        for (i, sub) in self.subs.iter().enumerate() {
            if let Err(panic_err) = catch_unwind(AssertUnwindSafe(|| sub.on_event(event))) {
                let info = {
                    let any = &*panic_err;
                    if let Some(msg) = any.downcast_ref::<&'static str>() {
                        (*msg).to_string()
                    } else if let Some(msg) = any.downcast_ref::<String>() {
                        msg.clone()
                    } else {
                        "unknown panic".to_string()
                    }
                };
                tracing::warn!(subscriber = sub.name(), %info, "subscriber panicked");

                if !event.is_subscriber_panic() {
                    self.emit_except(i, &Event::subscriber_panicked(sub.name(), info));
                }
            }
        }
    }

    /// Delivers `event` to every subscriber but the one at `skip`.
    fn emit_except(&self, skip: usize, event: &Event) {
        for (i, sub) in self.subs.iter().enumerate() {
            if i == skip {
                continue;
            }
            let _ = catch_unwind(AssertUnwindSafe(|| sub.on_event(event)));
        }
    }

    /// True if there are no subscribers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subs.is_empty()
    }

    /// Number of subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subs.len()
    }
}
