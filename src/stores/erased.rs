//! Type erasure between the typed [`Store`] API and the registry.
//!
//! The registry holds `Box<dyn AnyStore>`; every `S: Store` gets the erased
//! impl for free. Continuations are erased the same way and downcast back to
//! the concrete store when they run.

use std::any::Any;

use crate::actions::Action;
use crate::core::Dispatcher;
use crate::error::StoreError;
use crate::stores::{Context, Progress, Store};

/// Deferred work registered by `wait_for`, run once its dependencies finish.
pub(crate) type Continuation =
    Box<dyn FnOnce(&mut dyn Any, &Progress<'_>) -> Result<(), StoreError>>;

/// Boxes a closure as a [`Continuation`], fixing its higher-ranked signature.
pub(crate) fn erase<F>(f: F) -> Continuation
where
    F: FnOnce(&mut dyn Any, &Progress<'_>) -> Result<(), StoreError> + 'static,
{
    Box::new(f)
}

/// Object-safe face of a [`Store`].
pub(crate) trait AnyStore: Any {
    fn receive_any(
        &mut self,
        action: &Action,
        dispatcher: &Dispatcher,
        index: usize,
    ) -> Result<(), StoreError>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<S: Store> AnyStore for S {
    fn receive_any(
        &mut self,
        action: &Action,
        dispatcher: &Dispatcher,
        index: usize,
    ) -> Result<(), StoreError> {
        let mut cx = Context::<S>::new(dispatcher, index);
        self.receive(action, &mut cx)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
