//! # Wait registry - outstanding waits of the current pass.
//!
//! Records, for every store that called `wait_for` during its invocation, the
//! stores it waits on and the continuation to run once they all finish.
//!
//! ## Architecture
//! ```text
//! wait_for(waiter, deps, cont) ──► WaitRegistry
//!                                    ├─ entries: BTreeMap<waiter, WaitEntry{depends_on, cont}>
//!                                    └─ waited:  Vec<bool>   (one wait per store per pass)
//!
//! resolution round ──► waiting() ──► ready? ──► take(waiter) ──► run continuation
//! ```
//!
//! ## Rules
//! - Entries are keyed by registry index, so iteration follows registry order.
//! - `waited` survives `take`: a store that already waited cannot wait again
//!   in the same pass, even after its continuation ran.

use std::collections::BTreeMap;

use crate::core::completion::CompletionTracker;
use crate::stores::Continuation;

/// One declared wait.
pub(crate) struct WaitEntry {
    /// Registry indices of the stores waited on, deduplicated, declaration order.
    pub(crate) depends_on: Vec<usize>,
    pub(crate) continuation: Continuation,
}

/// Pass-local table of outstanding waits.
#[derive(Default)]
pub(crate) struct WaitRegistry {
    entries: BTreeMap<usize, WaitEntry>,
    waited: Vec<bool>,
}

impl WaitRegistry {
    /// Drops all entries and sizes the table for `stores` entries.
    pub(crate) fn reset(&mut self, stores: usize) {
        self.entries.clear();
        self.waited.clear();
        self.waited.resize(stores, false);
    }

    /// Records a wait for `waiter`.
    pub(crate) fn insert(&mut self, waiter: usize, entry: WaitEntry) {
        if let Some(flag) = self.waited.get_mut(waiter) {
            *flag = true;
        }
        self.entries.insert(waiter, entry);
    }

    /// True if `waiter` registered a wait during this pass.
    pub(crate) fn has_waited(&self, waiter: usize) -> bool {
        self.waited.get(waiter).copied().unwrap_or(false)
    }

    /// True if `store` has an outstanding wait that includes `target`.
    pub(crate) fn waits_on(&self, store: usize, target: usize) -> bool {
        self.entries
            .get(&store)
            .is_some_and(|e| e.depends_on.contains(&target))
    }

    /// True if the entry for `waiter` exists and all its dependencies are finished.
    pub(crate) fn is_ready(&self, waiter: usize, completion: &CompletionTracker) -> bool {
        self.entries
            .get(&waiter)
            .is_some_and(|e| completion.all_finished(&e.depends_on))
    }

    /// Removes and returns the entry for `waiter`.
    pub(crate) fn take(&mut self, waiter: usize) -> Option<WaitEntry> {
        self.entries.remove(&waiter)
    }

    /// Outstanding waiters in registry order.
    pub(crate) fn waiting(&self) -> Vec<usize> {
        self.entries.keys().copied().collect()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
