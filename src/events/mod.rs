//! Runtime events: types emitted while a pass runs.
//!
//! This module groups the event **data model** delivered to subscribers.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//!
//! ## Quick reference
//! - **Publisher**: `Dispatcher` (pass, store, wait and round events) and
//!   `SubscriberSet` (subscriber panics).
//! - **Consumers**: user [`Subscribe`](crate::Subscribe) implementations, fed
//!   synchronously by [`SubscriberSet`](crate::SubscriberSet).

mod event;

pub use event::{Event, EventKind};
