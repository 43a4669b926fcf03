use std::sync::Arc;

use crate::core::{registry::Registry, Config, Dispatcher};
use crate::error::DispatchError;
use crate::stores::{AnyStore, Store};
use crate::subscribers::{Subscribe, SubscriberSet};

/// Builder for constructing a [`Dispatcher`] from named stores.
pub struct DispatcherBuilder {
    cfg: Config,
    stores: Vec<(String, Box<dyn AnyStore>)>,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl DispatcherBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            stores: Vec::new(),
            subscribers: Vec::new(),
        }
    }

    /// Registers `store` under `name`.
    ///
    /// Registration order is invocation order. Names are validated in [`build`](Self::build).
    pub fn with_store<S: Store>(mut self, name: impl Into<String>, store: S) -> Self {
        self.stores.push((name.into(), Box::new(store)));
        self
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive runtime events (pass lifecycle, waits, failures)
    /// synchronously while the pass runs.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds the dispatcher.
    ///
    /// Fails with [`DispatchError::InvalidSpec`] if a name is empty or repeated,
    /// or if more stores were registered than [`Config::max_stores`] allows.
    pub fn build(self) -> Result<Dispatcher, DispatchError> {
        let registry = Registry::new(self.stores, self.cfg.store_limit())?;
        tracing::debug!(
            stores = registry.len(),
            subscribers = self.subscribers.len(),
            "dispatcher built"
        );
        Ok(Dispatcher::new_internal(
            self.cfg,
            registry,
            SubscriberSet::new(self.subscribers),
        ))
    }
}
