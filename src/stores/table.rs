//! # Table-routed store (`ActionStore`)
//!
//! [`ActionStore`] keeps a map from action type to handler. On each action it
//! calls the handler registered for that type with `(payload, type)`; actions
//! with no handler are ignored.
//!
//! ## Routing
//! ```text
//! dispatch(Action{type: "cart/add", payload})
//!     └─► ActionStore::receive
//!            ├─ actions["cart/add"] found ─► handler(&mut state, &payload, "cart/add", cx)
//!            └─ not found                 ─► Ok(()) (ignored)
//! ```
//!
//! ## Example
//! ```rust
//! use serde_json::json;
//! use storevisor::{Action, ActionStore, Config, Dispatcher};
//!
//! let todos = ActionStore::new(Vec::<String>::new())
//!     .on("todo/add", |todos, payload, _kind, _cx| {
//!         todos.push(payload.as_str().unwrap_or_default().to_string());
//!         Ok(())
//!     });
//!
//! let dispatcher = Dispatcher::builder(Config::default())
//!     .with_store("Todos", todos)
//!     .build()
//!     .unwrap();
//!
//! dispatcher.dispatch(&Action::new("todo/add", json!("write docs"))).unwrap();
//! dispatcher.dispatch(&Action::new("todo/unknown", json!(null))).unwrap();
//!
//! let len = dispatcher.with_store("Todos", |s: &ActionStore<Vec<String>>| s.state().len());
//! assert_eq!(len, Some(1));
//! ```

use std::collections::HashMap;

use serde_json::Value;

use crate::actions::Action;
use crate::error::StoreError;
use crate::stores::{Context, Store};

/// Handler bound to one action type.
type Handler<T> = Box<
    dyn FnMut(&mut T, &Value, &str, &mut Context<'_, ActionStore<T>>) -> Result<(), StoreError>,
>;

/// Store that routes each action to the handler registered for its type.
pub struct ActionStore<T> {
    state: T,
    options: Value,
    actions: HashMap<String, Handler<T>>,
}

impl<T: 'static> ActionStore<T> {
    /// Creates a store with the given initial state and no handlers.
    pub fn new(state: T) -> Self {
        Self {
            state,
            options: Value::Null,
            actions: HashMap::new(),
        }
    }

    /// Attaches the options the store was constructed with.
    pub fn with_options(mut self, options: Value) -> Self {
        self.options = options;
        self
    }

    /// Registers `handler` for actions of type `kind` (builder form).
    pub fn on<F>(mut self, kind: impl Into<String>, handler: F) -> Self
    where
        F: FnMut(&mut T, &Value, &str, &mut Context<'_, Self>) -> Result<(), StoreError> + 'static,
    {
        self.add_action(kind, handler);
        self
    }

    /// Registers `handler` for actions of type `kind`.
    ///
    /// Replaces any handler previously registered for the same type.
    pub fn add_action<F>(&mut self, kind: impl Into<String>, handler: F)
    where
        F: FnMut(&mut T, &Value, &str, &mut Context<'_, Self>) -> Result<(), StoreError> + 'static,
    {
        self.actions.insert(kind.into(), Box::new(handler));
    }

    /// True if a handler is registered for `kind`.
    pub fn handles(&self, kind: &str) -> bool {
        self.actions.contains_key(kind)
    }

    /// Current state.
    pub fn state(&self) -> &T {
        &self.state
    }

    /// Mutable access to the state (e.g. from a continuation).
    pub fn state_mut(&mut self) -> &mut T {
        &mut self.state
    }

    /// Options the store was constructed with (`null` if none).
    pub fn options(&self) -> &Value {
        &self.options
    }

    /// Consumes the store and returns its state.
    pub fn into_state(self) -> T {
        self.state
    }
}

impl<T: 'static> Store for ActionStore<T> {
    fn receive(&mut self, action: &Action, cx: &mut Context<'_, Self>) -> Result<(), StoreError> {
        let Self { state, actions, .. } = self;
        match actions.get_mut(action.kind()) {
            Some(handler) => handler(state, action.payload(), action.kind(), cx),
            None => Ok(()),
        }
    }
}
