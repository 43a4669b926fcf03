//! # Store registry - name → store mapping fixed at construction.
//!
//! ## Architecture
//! ```text
//! DispatcherBuilder.with_store(name, store) ... build()
//!         │
//!         ▼
//! Registry
//!   ├─ slots: Vec<Slot>            (registry order = invocation order)
//!   │     └─ Slot { name, RefCell<Box<dyn AnyStore>> }
//!   └─ index: HashMap<name, usize>
//! ```
//!
//! ## Rules
//! - Names are unique and non-empty.
//! - The registry never changes after construction.
//! - Stores are addressed by index inside a pass; names only at the edges.

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::DispatchError;
use crate::stores::AnyStore;

/// One registered store.
pub(crate) struct Slot {
    name: Arc<str>,
    pub(crate) store: RefCell<Box<dyn AnyStore>>,
}

impl Slot {
    pub(crate) fn name(&self) -> &str {
        &self.name
    }
}

/// Ordered, immutable registry of stores.
pub(crate) struct Registry {
    slots: Vec<Slot>,
    index: HashMap<Arc<str>, usize>,
}

impl Registry {
    /// Builds the registry, rejecting empty names, duplicates and oversize registries.
    pub(crate) fn new(
        entries: Vec<(String, Box<dyn AnyStore>)>,
        limit: Option<usize>,
    ) -> Result<Self, DispatchError> {
        if let Some(max) = limit {
            if entries.len() > max {
                return Err(DispatchError::InvalidSpec {
                    reason: format!("{} stores exceed max_stores={max}", entries.len()),
                });
            }
        }

        let mut slots = Vec::with_capacity(entries.len());
        let mut index = HashMap::with_capacity(entries.len());

        for (name, store) in entries {
            if name.trim().is_empty() {
                return Err(DispatchError::InvalidSpec {
                    reason: "store name is empty".to_string(),
                });
            }

            let name: Arc<str> = Arc::from(name);
            if index.insert(Arc::clone(&name), slots.len()).is_some() {
                return Err(DispatchError::InvalidSpec {
                    reason: format!("duplicate store name: {name}"),
                });
            }

            slots.push(Slot {
                name,
                store: RefCell::new(store),
            });
        }

        Ok(Self { slots, index })
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub(crate) fn slot(&self, index: usize) -> &Slot {
        &self.slots[index]
    }

    pub(crate) fn get(&self, name: &str) -> Option<&Slot> {
        self.index_of(name).map(|i| self.slot(i))
    }

    pub(crate) fn name(&self, index: usize) -> &str {
        self.slots[index].name()
    }

    /// True if any store is borrowed outside the dispatcher (e.g. by `with_store`).
    pub(crate) fn any_borrowed(&self) -> bool {
        self.slots.iter().any(|slot| slot.store.try_borrow_mut().is_err())
    }

    /// Names in registry order.
    pub(crate) fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.slots.iter().map(Slot::name)
    }
}
