//! # Runtime events emitted by the dispatcher.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Pass events**: a dispatch starting, finishing or failing
//! - **Store events**: a store received the action, declared a wait, resumed
//! - **Subscriber events**: a subscriber panicked while handling an event
//!
//! The [`Event`] struct carries additional metadata such as timestamps, the
//! action type, store name, dependencies and the resolution round.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//!
//! ## Example
//! ```rust
//! use storevisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::WaitRegistered)
//!     .with_action("cart/add")
//!     .with_store("Cart")
//!     .with_depends_on(vec!["Catalog".to_string()]);
//!
//! assert_eq!(ev.kind, EventKind::WaitRegistered);
//! assert_eq!(ev.store.as_deref(), Some("Cart"));
//! assert_eq!(ev.depends_on.as_deref(), Some(&["Catalog".to_string()][..]));
//! ```

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Pass events ===
    /// A dispatch pass started.
    ///
    /// Sets:
    /// - `action`: action type
    DispatchStarted,

    /// Every store finished processing the action.
    ///
    /// Sets:
    /// - `action`: action type
    /// - `round`: number of resolution rounds run
    DispatchFinished,

    /// The pass was aborted.
    ///
    /// Sets:
    /// - `action`: action type
    /// - `reason`: error label and message
    DispatchFailed,

    // === Store events ===
    /// A store's `receive` returned.
    ///
    /// Sets:
    /// - `action`: action type
    /// - `store`: store name
    StoreReceived,

    /// A store declared a wait.
    ///
    /// Sets:
    /// - `action`: action type
    /// - `store`: waiting store
    /// - `depends_on`: stores waited on
    WaitRegistered,

    /// A waiting store's continuation ran; the store is now finished.
    ///
    /// Sets:
    /// - `action`: action type
    /// - `store`: store name
    /// - `round`: resolution round (1-based)
    StoreResumed,

    /// A resolution round completed with progress.
    ///
    /// Sets:
    /// - `action`: action type
    /// - `round`: resolution round (1-based)
    /// - `resolved`: continuations run in this round
    RoundCompleted,

    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `store`: subscriber name
    /// - `reason`: panic info/message
    SubscriberPanicked,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Type of the action being dispatched.
    pub action: Option<Arc<str>>,
    /// Store (or subscriber) name, if applicable.
    pub store: Option<Arc<str>>,
    /// Stores waited on (`WaitRegistered` only).
    pub depends_on: Option<Arc<[String]>>,
    /// Resolution round (1-based).
    pub round: Option<u32>,
    /// Continuations run during a round.
    pub resolved: Option<u32>,
    /// Human-readable reason (errors, panic details).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            action: None,
            store: None,
            depends_on: None,
            round: None,
            resolved: None,
            reason: None,
        }
    }

    /// Attaches the action type.
    #[inline]
    pub fn with_action(mut self, action: impl Into<Arc<str>>) -> Self {
        self.action = Some(action.into());
        self
    }

    /// Attaches a store name.
    #[inline]
    pub fn with_store(mut self, store: impl Into<Arc<str>>) -> Self {
        self.store = Some(store.into());
        self
    }

    /// Attaches the stores waited on.
    #[inline]
    pub fn with_depends_on(mut self, depends_on: Vec<String>) -> Self {
        self.depends_on = Some(depends_on.into());
        self
    }

    /// Attaches a resolution round.
    #[inline]
    pub fn with_round(mut self, round: u32) -> Self {
        self.round = Some(round);
        self
    }

    /// Attaches the number of continuations run in a round.
    #[inline]
    pub fn with_resolved(mut self, resolved: u32) -> Self {
        self.resolved = Some(resolved);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_store(subscriber)
            .with_reason(info)
    }

    #[inline]
    pub fn is_subscriber_panic(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberPanicked)
    }
}
