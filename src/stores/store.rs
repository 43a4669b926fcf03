//! # Store trait and the per-invocation capabilities.
//!
//! A [`Store`] receives every dispatched action exactly once per pass. While it
//! runs it holds a [`Context`], its only handle back to the dispatcher. Through
//! it the store can declare that part of its work must wait until other stores
//! have finished with the same action:
//!
//! ```text
//! receive(action, cx)
//!   └─► cx.wait_for(["Catalog"], |store, progress| { ... })
//!           │
//!           └─► continuation runs later in the same pass,
//!               after "Catalog" has finished
//! ```
//!
//! The continuation receives the store back mutably together with a
//! [`Progress`] view of the pass.
//!
//! ## Example
//! ```rust
//! use storevisor::{Action, Config, Context, Dispatcher, Store, StoreError};
//!
//! #[derive(Default)]
//! struct Catalog { items: u32 }
//!
//! impl Store for Catalog {
//!     fn receive(&mut self, _action: &Action, _cx: &mut Context<'_, Self>) -> Result<(), StoreError> {
//!         self.items += 1;
//!         Ok(())
//!     }
//! }
//!
//! #[derive(Default)]
//! struct Cart { seen_catalog: bool }
//!
//! impl Store for Cart {
//!     fn receive(&mut self, _action: &Action, cx: &mut Context<'_, Self>) -> Result<(), StoreError> {
//!         cx.wait_for(["Catalog"], |cart: &mut Cart, progress| {
//!             cart.seen_catalog = progress.is_finished("Catalog");
//!             Ok(())
//!         })?;
//!         Ok(())
//!     }
//! }
//!
//! let dispatcher = Dispatcher::builder(Config::default())
//!     .with_store("Cart", Cart::default())
//!     .with_store("Catalog", Catalog::default())
//!     .build()
//!     .unwrap();
//!
//! dispatcher.dispatch(&Action::signal("refresh")).unwrap();
//! assert_eq!(dispatcher.with_store("Cart", |c: &Cart| c.seen_catalog), Some(true));
//! ```

use std::any::type_name;
use std::marker::PhantomData;

use crate::actions::Action;
use crate::core::Dispatcher;
use crate::error::{DispatchError, StoreError};
use crate::stores::erase;

/// # A named handler of dispatched actions.
///
/// The name is the key the store was registered under. `receive` is invoked
/// once per pass, synchronously; it may call [`Context::wait_for`] before
/// returning. Returning an error aborts the pass.
pub trait Store: Sized + 'static {
    /// Handles one action.
    fn receive(&mut self, action: &Action, cx: &mut Context<'_, Self>) -> Result<(), StoreError>;
}

/// Capability handed to a store while its `receive` runs.
///
/// It borrows the dispatcher for the duration of the call only; stores never
/// hold a pointer back to the dispatcher.
pub struct Context<'a, S> {
    dispatcher: &'a Dispatcher,
    index: usize,
    _store: PhantomData<fn(S)>,
}

impl<'a, S: Store> Context<'a, S> {
    pub(crate) fn new(dispatcher: &'a Dispatcher, index: usize) -> Self {
        Self {
            dispatcher,
            index,
            _store: PhantomData,
        }
    }

    /// Registry name of the store being invoked.
    pub fn name(&self) -> &'a str {
        self.dispatcher.store_name(self.index)
    }

    /// The dispatcher running this pass.
    pub fn dispatcher(&self) -> &'a Dispatcher {
        self.dispatcher
    }

    /// True if `name` has already finished processing the current action.
    pub fn is_finished(&self, name: &str) -> bool {
        self.dispatcher.is_finished(name)
    }

    /// Defers `continuation` until every store in `dependencies` has finished
    /// processing the current action.
    ///
    /// A store may wait at most once per pass. Fails with
    /// [`DispatchError::SelfWait`], [`DispatchError::AlreadyWaiting`],
    /// [`DispatchError::UnknownStore`] or [`DispatchError::CircularDependency`];
    /// propagate the error with `?` to abort the pass.
    pub fn wait_for<I, N, F>(
        &mut self,
        dependencies: I,
        continuation: F,
    ) -> Result<(), DispatchError>
    where
        I: IntoIterator<Item = N>,
        N: AsRef<str>,
        F: FnOnce(&mut S, &Progress<'_>) -> Result<(), StoreError> + 'static,
    {
        let dependencies = dependencies
            .into_iter()
            .map(|name| name.as_ref().to_string())
            .collect();

        let continuation = erase(move |store, progress| match store.downcast_mut::<S>() {
            Some(store) => continuation(store, progress),
            None => Err(StoreError::fail(format!(
                "continuation expects store type {}",
                type_name::<S>()
            ))),
        });

        self.dispatcher
            .register_wait(self.index, dependencies, continuation)
    }
}

/// Read-only view of the running pass, handed to continuations.
pub struct Progress<'a> {
    dispatcher: &'a Dispatcher,
    action: &'a Action,
    index: usize,
}

impl<'a> Progress<'a> {
    pub(crate) fn new(dispatcher: &'a Dispatcher, action: &'a Action, index: usize) -> Self {
        Self {
            dispatcher,
            action,
            index,
        }
    }

    /// The action being dispatched.
    pub fn action(&self) -> &'a Action {
        self.action
    }

    /// Registry name of the store whose continuation is running.
    pub fn store(&self) -> &'a str {
        self.dispatcher.store_name(self.index)
    }

    /// True if `name` has already finished processing the current action.
    ///
    /// The resuming store itself is not finished until its continuation returns.
    pub fn is_finished(&self, name: &str) -> bool {
        self.dispatcher.is_finished(name)
    }

    /// The dispatcher running this pass.
    pub fn dispatcher(&self) -> &'a Dispatcher {
        self.dispatcher
    }
}
