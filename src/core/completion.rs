//! # Completion tracker - which stores finished the current action.
//!
//! ## Rules
//! - Reset at the start of every pass; nothing carries over between passes.
//! - A store is marked finished right after `receive` returns if it did not
//!   wait, otherwise right after its continuation returns.
//! - Marks are never cleared within a pass.

/// Per-pass finished flags, indexed like the registry.
#[derive(Debug, Default)]
pub(crate) struct CompletionTracker {
    finished: Vec<bool>,
}

impl CompletionTracker {
    /// Clears all marks and sizes the tracker for `stores` entries.
    pub(crate) fn reset(&mut self, stores: usize) {
        self.finished.clear();
        self.finished.resize(stores, false);
    }

    pub(crate) fn mark(&mut self, index: usize) {
        if let Some(flag) = self.finished.get_mut(index) {
            *flag = true;
        }
    }

    pub(crate) fn is_finished(&self, index: usize) -> bool {
        self.finished.get(index).copied().unwrap_or(false)
    }

    /// True if every store in `indices` is finished.
    pub(crate) fn all_finished(&self, indices: &[usize]) -> bool {
        indices.iter().all(|&i| self.is_finished(i))
    }

    pub(crate) fn count(&self) -> usize {
        self.finished.iter().filter(|&&f| f).count()
    }
}
