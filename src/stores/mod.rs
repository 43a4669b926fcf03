//! # Stores: the handlers an action is dispatched to.
//!
//! This module provides the store-facing side of the dispatcher:
//! - [`Store`] - trait implemented by every handler
//! - [`Context`] - capability handed to a store for the duration of `receive`
//! - [`Progress`] - read-only view handed to continuations
//! - [`ActionStore`] - store that routes actions to per-type handlers
//!
//! ## Coupling surface
//! ```text
//! Dispatcher ── receive(&Action, &mut Context) ──► Store
//!     ▲                                              │
//!     └──────── Context::wait_for(deps, cont) ◄──────┘
//!                    (only during receive)
//! ```

mod erased;
mod store;
mod table;

pub(crate) use erased::{erase, AnyStore, Continuation};
pub use store::{Context, Progress, Store};
pub use table::ActionStore;
