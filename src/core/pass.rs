//! # Pass state and its exit guard.
//!
//! A pass is one `dispatch` call. Its state lives in the dispatcher behind a
//! `RefCell` so stores can reach it (through their `Context`) while the pass
//! runs; it is only ever borrowed for short, non-reentrant bookkeeping.
//!
//! ## Lifecycle
//! ```text
//! dispatch()
//!   └─► PassGuard::begin()      in_progress = true, waits/completion reset
//!         ├─ sweep
//!         ├─ resolution rounds
//!         └─ drop(guard)        in_progress = false, waits/completion dropped
//!                               (runs on Ok, Err and unwinding alike)
//! ```

use std::cell::RefCell;
use std::sync::Arc;

use crate::core::completion::CompletionTracker;
use crate::core::waits::WaitRegistry;

/// State scoped to one dispatch pass.
#[derive(Default)]
pub(crate) struct Pass {
    pub(crate) in_progress: bool,
    /// Type of the action being dispatched.
    pub(crate) action: Option<Arc<str>>,
    /// Store whose `receive` is running (waits are only accepted from it).
    pub(crate) current: Option<usize>,
    pub(crate) waits: WaitRegistry,
    pub(crate) completion: CompletionTracker,
}

/// Resets the pass state when dropped.
pub(crate) struct PassGuard<'a> {
    pass: &'a RefCell<Pass>,
}

impl<'a> PassGuard<'a> {
    /// Marks a pass active for a registry of `stores` entries.
    pub(crate) fn begin(pass: &'a RefCell<Pass>, stores: usize, action: &str) -> Self {
        {
            let mut p = pass.borrow_mut();
            p.in_progress = true;
            p.action = Some(Arc::from(action));
            p.current = None;
            p.waits.reset(stores);
            p.completion.reset(stores);
        }
        Self { pass }
    }
}

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        // Pending continuations may own user values; drop them after the borrow ends.
        let stale = match self.pass.try_borrow_mut() {
            Ok(mut p) => std::mem::take(&mut *p),
            Err(_) => {
                tracing::error!("pass state still borrowed on exit; dispatcher left in progress");
                return;
            }
        };
        drop(stale);
    }
}
