//! # LogWriter: event logger backed by `tracing`
//!
//! A minimal subscriber that renders incoming [`Event`]s as `tracing` records.
//! Use it for debugging or demos; install any `tracing` subscriber to see the output.
//!
//! ## Example output
//! ```text
//! DEBUG [dispatch-started] action="cart/add"
//! TRACE [received] action="cart/add" store="Catalog"
//! DEBUG [wait] action="cart/add" store="Cart" depends_on=["Catalog"]
//! DEBUG [resumed] action="cart/add" store="Cart" round=1
//! DEBUG [round] action="cart/add" round=1 resolved=1
//! DEBUG [dispatch-finished] action="cart/add" rounds=1
//! WARN  [dispatch-failed] action="cart/add" reason="dispatch_deadlock: ..."
//! ```

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Subscribe for LogWriter {
    fn on_event(&self, e: &Event) {
        let action = e.action.as_deref().unwrap_or_default();
        let store = e.store.as_deref().unwrap_or_default();
        match e.kind {
            EventKind::DispatchStarted => {
                tracing::debug!(action, "[dispatch-started]");
            }
            EventKind::DispatchFinished => {
                tracing::debug!(action, rounds = e.round.unwrap_or(0), "[dispatch-finished]");
            }
            EventKind::DispatchFailed => {
                tracing::warn!(action, reason = e.reason.as_deref(), "[dispatch-failed]");
            }
            EventKind::StoreReceived => {
                tracing::trace!(action, store, "[received]");
            }
            EventKind::WaitRegistered => {
                tracing::debug!(action, store, depends_on = ?e.depends_on, "[wait]");
            }
            EventKind::StoreResumed => {
                tracing::debug!(action, store, round = e.round, "[resumed]");
            }
            EventKind::RoundCompleted => {
                tracing::debug!(action, round = e.round, resolved = e.resolved, "[round]");
            }
            EventKind::SubscriberPanicked => {
                tracing::warn!(
                    subscriber = store,
                    reason = e.reason.as_deref(),
                    "[subscriber-panicked]"
                );
            }
        }
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}
