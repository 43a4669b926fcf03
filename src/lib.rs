//! # storevisor
//!
//! **Storevisor** is a small, single-threaded action dispatcher for Rust.
//!
//! Named stores receive every dispatched action exactly once. While handling
//! an action a store may declare that part of its work has to wait until other
//! stores have finished with the same action; the dispatcher runs that
//! deferred work in dependency order and fails fast on circular or
//! unsatisfiable waits.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │    Store     │   │    Store     │   │    Store     │
//!     │  ("Cart")    │   │ ("Catalog")  │   │  ("Totals")  │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Dispatcher                                                       │
//! │  - Registry (named stores, registration order)                    │
//! │  - Pass (in-progress flag, WaitRegistry, CompletionTracker)       │
//! │  - SubscriberSet (fans out events to user subscribers)            │
//! └──────┬──────────────────────────────────────────────────┬─────────┘
//!        │ dispatch(&Action)                                │ Events:
//!        ▼                                                  │ - DispatchStarted
//!   sweep: receive(action, cx) for every store              │ - WaitRegistered
//!        │    └─ cx.wait_for(deps, continuation)            │ - StoreReceived
//!        ▼                                                  │ - StoreResumed
//!   rounds: run continuations whose deps finished           │ - RoundCompleted
//!        │    └─ no progress ─► Deadlock                    │ - DispatchFinished/Failed
//!        ▼                                                  ▼
//!   Ok(()) / Err(DispatchError)                    Subscribe::on_event()
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                        |
//! |-------------------|--------------------------------------------------------------|-------------------------------------------|
//! | **Dispatch**      | Deliver actions to named stores, resolve declared waits.     | [`Dispatcher`], [`DispatcherBuilder`]     |
//! | **Stores**        | Implement handlers; wait on other stores mid-dispatch.       | [`Store`], [`Context`], [`Progress`]      |
//! | **Routing**       | Table-driven store keyed by action type.                     | [`ActionStore`]                           |
//! | **Actions**       | Typed action with a JSON payload.                            | [`Action`]                                |
//! | **Subscriber API**| Hook into pass lifecycle events.                             | [`Subscribe`], [`Event`]                  |
//! | **Errors**        | Typed errors for misuse, dependency graphs and store faults. | [`DispatchError`], [`StoreError`]         |
//! | **Configuration** | Centralize dispatcher settings.                              | [`Config`]                                |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use serde_json::json;
//! use storevisor::{Action, ActionStore, Config, Dispatcher};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Build subscribers (optional)
//! #[cfg(feature = "logging")]
//! let subs: Vec<Arc<dyn storevisor::Subscribe>> = vec![Arc::new(storevisor::LogWriter::default())];
//! #[cfg(not(feature = "logging"))]
//! let subs: Vec<Arc<dyn storevisor::Subscribe>> = Vec::new();
//!
//! let prices = ActionStore::new(0u64).on("cart/add", |total, payload, _, _| {
//!     *total += payload["price"].as_u64().unwrap_or(0);
//!     Ok(())
//! });
//!
//! // Tax is computed from the running total, so it waits for "Prices".
//! let tax = ActionStore::new(0u64).on("cart/add", |_, _, _, cx| {
//!     cx.wait_for(["Prices"], |tax: &mut ActionStore<u64>, progress| {
//!         let total = progress
//!             .dispatcher()
//!             .with_store("Prices", |p: &ActionStore<u64>| *p.state())
//!             .unwrap_or(0);
//!         *tax.state_mut() = total / 10;
//!         Ok(())
//!     })?;
//!     Ok(())
//! });
//!
//! let dispatcher = Dispatcher::builder(Config::default())
//!     .with_store("Tax", tax)
//!     .with_store("Prices", prices)
//!     .with_subscribers(subs)
//!     .build()?;
//!
//! dispatcher.dispatch(&Action::new("cart/add", json!({ "price": 250 })))?;
//!
//! assert_eq!(dispatcher.with_store("Tax", |t: &ActionStore<u64>| *t.state()), Some(25));
//! # Ok(())
//! # }
//! ```

mod actions;
mod core;
mod error;
mod events;
mod stores;
mod subscribers;

// ---- Public re-exports ----

pub use actions::Action;
pub use crate::core::{Config, Dispatcher, DispatcherBuilder};
pub use error::{DispatchError, StoreError};
pub use events::{Event, EventKind};
pub use stores::{ActionStore, Context, Progress, Store};
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
