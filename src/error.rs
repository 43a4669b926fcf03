//! Error types used by the dispatcher and by stores.
//!
//! This module defines two error enums:
//!
//! - [`DispatchError`]: errors raised by the dispatcher itself (misuse, invalid
//!   store graphs, deadlocks) or wrapped store failures.
//! - [`StoreError`]: errors returned by store code from
//!   [`Store::receive`](crate::Store::receive) and from continuations.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging/metrics.
//! Every [`DispatchError`] aborts the current pass; none are recovered silently.

use thiserror::Error;

/// # Errors produced by the dispatcher.
///
/// All variants are fatal to the `dispatch` call that produced them. The
/// dispatcher resets its pass state before the error reaches the caller, so
/// the next `dispatch` always starts clean.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// The store registry could not be built (empty or duplicate name, too many stores).
    #[error("invalid store registry: {reason}")]
    InvalidSpec {
        /// What was wrong with the registry.
        reason: String,
    },

    /// The action has no usable `type` discriminator.
    #[error("can't dispatch an action without a type: {reason}")]
    InvalidAction {
        /// What was wrong with the action.
        reason: String,
    },

    /// `dispatch` was called while another pass was still active.
    #[error("can't dispatch recursively")]
    ReentrantDispatch,

    /// `wait_for` was called outside the waiting store's own invocation.
    #[error("store '{store}' can't wait unless it is receiving an action")]
    NotDispatching {
        /// The store that attempted to wait.
        store: String,
    },

    /// A store named itself as a dependency.
    #[error("store '{store}' can't wait on itself")]
    SelfWait {
        /// The offending store.
        store: String,
    },

    /// A store registered a second wait during the same pass.
    #[error("store '{store}' is already waiting during this dispatch")]
    AlreadyWaiting {
        /// The offending store.
        store: String,
    },

    /// A name does not refer to a registered store.
    #[error("can't wait on non-existent store: {name}")]
    UnknownStore {
        /// The first unresolvable name.
        name: String,
    },

    /// Two stores wait directly on each other.
    #[error("circular dependency: '{waiter}' waits on '{other}', which already waits on '{waiter}'")]
    CircularDependency {
        /// The store registering the wait.
        waiter: String,
        /// The dependency that already waits on `waiter`.
        other: String,
    },

    /// A resolution round made no progress while waits were still outstanding.
    #[error("deadlock: no progress resolving waits; still waiting: {waiting:?}")]
    Deadlock {
        /// Stores whose continuations could not run, in registry order.
        waiting: Vec<String>,
    },

    /// A store or one of its continuations failed.
    #[error("store '{store}' failed: {error}")]
    Store {
        /// The store whose code failed.
        store: String,
        /// The failure message.
        error: String,
    },
}

impl DispatchError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use storevisor::DispatchError;
    ///
    /// let err = DispatchError::Deadlock { waiting: vec!["a".into(), "b".into()] };
    /// assert_eq!(err.as_label(), "dispatch_deadlock");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            DispatchError::InvalidSpec { .. } => "dispatch_invalid_spec",
            DispatchError::InvalidAction { .. } => "dispatch_invalid_action",
            DispatchError::ReentrantDispatch => "dispatch_reentrant",
            DispatchError::NotDispatching { .. } => "dispatch_not_dispatching",
            DispatchError::SelfWait { .. } => "dispatch_self_wait",
            DispatchError::AlreadyWaiting { .. } => "dispatch_already_waiting",
            DispatchError::UnknownStore { .. } => "dispatch_unknown_store",
            DispatchError::CircularDependency { .. } => "dispatch_circular_dependency",
            DispatchError::Deadlock { .. } => "dispatch_deadlock",
            DispatchError::Store { .. } => "dispatch_store_failed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            DispatchError::InvalidSpec { reason } => format!("invalid registry: {reason}"),
            DispatchError::InvalidAction { reason } => format!("invalid action: {reason}"),
            DispatchError::ReentrantDispatch => "dispatch already in progress".to_string(),
            DispatchError::NotDispatching { store } => format!("not dispatching: store={store}"),
            DispatchError::SelfWait { store } => format!("self wait: store={store}"),
            DispatchError::AlreadyWaiting { store } => format!("already waiting: store={store}"),
            DispatchError::UnknownStore { name } => format!("unknown store: {name}"),
            DispatchError::CircularDependency { waiter, other } => {
                format!("circular dependency: {waiter} <-> {other}")
            }
            DispatchError::Deadlock { waiting } => format!("deadlock; waiting={waiting:?}"),
            DispatchError::Store { store, error } => format!("store={store} error: {error}"),
        }
    }
}

/// # Errors returned by store code.
///
/// Stores return [`StoreError::Fail`] for their own failures. Dispatcher errors
/// raised while the store calls back into the dispatcher (`wait_for`, a nested
/// `dispatch`) convert through `?` into [`StoreError::Dispatch`] and are
/// surfaced to the `dispatch` caller unchanged.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store failed while handling an action.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// A dispatcher call made by the store failed.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

impl StoreError {
    /// Shorthand for [`StoreError::Fail`].
    ///
    /// # Example
    /// ```
    /// use storevisor::StoreError;
    ///
    /// let err = StoreError::fail("boom");
    /// assert_eq!(err.as_label(), "store_failed");
    /// ```
    pub fn fail(error: impl Into<String>) -> Self {
        StoreError::Fail {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            StoreError::Fail { .. } => "store_failed",
            StoreError::Dispatch(e) => e.as_label(),
        }
    }

    /// Converts a store failure into the error reported by `dispatch`.
    ///
    /// Dispatcher errors keep their own kind; plain failures are attributed to `store`.
    pub(crate) fn into_dispatch(self, store: &str) -> DispatchError {
        match self {
            StoreError::Fail { error } => DispatchError::Store {
                store: store.to_string(),
                error,
            },
            StoreError::Dispatch(e) => e,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_failure_is_attributed_to_store() {
        let err = StoreError::fail("boom").into_dispatch("Cart");
        assert_eq!(
            err,
            DispatchError::Store {
                store: "Cart".into(),
                error: "boom".into()
            }
        );
        assert_eq!(err.as_label(), "dispatch_store_failed");
    }

    #[test]
    fn test_dispatch_error_passes_through_unchanged() {
        let inner = DispatchError::SelfWait {
            store: "Cart".into(),
        };
        let err: StoreError = inner.clone().into();
        assert_eq!(err.as_label(), "dispatch_self_wait");
        assert_eq!(err.into_dispatch("Other"), inner);
    }

    #[test]
    fn test_messages_name_the_stores() {
        let err = DispatchError::CircularDependency {
            waiter: "a".into(),
            other: "b".into(),
        };
        assert_eq!(err.as_message(), "circular dependency: a <-> b");
        assert!(err.to_string().contains("'a' waits on 'b'"));
    }
}
