//! # Event subscribers for the dispatcher.
//!
//! This module provides the [`Subscribe`] trait and the [`SubscriberSet`]
//! fan-out used by the dispatcher to report what happens during a pass.
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   Dispatcher ── emit(Event) ──► SubscriberSet ──► Subscribe::on_event(&Event)
//!                                                        │
//!                                                   ┌────┴────┬─────────┬───────┐
//!                                                   ▼         ▼         ▼       ▼
//!                                                 LogWriter  Metrics  Custom  ...
//! ```
//!
//! ## Implementing custom subscribers
//! ```rust
//! use storevisor::{Event, EventKind, Subscribe};
//!
//! struct Failures;
//!
//! impl Subscribe for Failures {
//!     fn on_event(&self, event: &Event) {
//!         if event.kind == EventKind::DispatchFailed {
//!             // increment failure counter
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "failures" }
//! }
//! ```

#[cfg(feature = "logging")]
mod log;
mod set;
mod subscriber;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscriber::Subscribe;
