//! Runtime core: registry, pass state and wait resolution.
//!
//! The only public API from this module is [`Dispatcher`] (with its
//! [`DispatcherBuilder`] and [`Config`]), which delivers actions to stores.
//!
//! Internal modules:
//! - [`dispatcher`]: runs a pass (sweep, then resolution rounds) and publishes events;
//! - [`registry`]: named stores in registration order;
//! - [`pass`]: per-pass state and the guard that resets it;
//! - [`waits`]: outstanding waits of the current pass;
//! - [`completion`]: which stores finished the current action.

mod builder;
mod completion;
mod config;
mod dispatcher;
mod pass;
mod registry;
mod waits;

pub use builder::DispatcherBuilder;
pub use config::Config;
pub use dispatcher::Dispatcher;
