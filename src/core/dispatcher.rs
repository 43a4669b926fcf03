//! # Dispatcher: delivers one action to every store, honoring declared waits.
//!
//! The [`Dispatcher`] owns the store registry, the pass state and the
//! [`SubscriberSet`]. Each [`dispatch`](Dispatcher::dispatch) call is one pass.
//!
//! ## Pass
//! ```text
//! dispatch(action)
//!   ├─ nested pass, or a store
//!   │  borrowed by with_store? ─► Err(ReentrantDispatch)   (no store invoked)
//!   ├─ blank type?             ─► Err(InvalidAction)
//!   ├─ PassGuard::begin        (reset on every exit path)
//!   │
//!   ├─ sweep (registry order)
//!   │    for store in registry:
//!   │       receive(action, cx) ── cx.wait_for(deps, cont) ─► WaitRegistry
//!   │       no wait registered?  ─► finished[store] = true
//!   │
//!   └─ resolution rounds
//!        while waits outstanding:
//!           for waiter in waiting (registry order):
//!              all deps finished? ─► take entry, run cont, finished[waiter] = true
//!           nothing ran?          ─► Err(Deadlock{ waiting })
//! ```
//!
//! ## Rules
//! - Every store is invoked exactly once per pass; every continuation runs at most once.
//! - A continuation runs after the sweep and after all stores it depends on finished.
//! - Waits are accepted only from the store whose `receive` is running.
//! - Direct two-party cycles fail at registration (`CircularDependency`);
//!   longer cycles fail with `Deadlock` once a round makes no progress.
//! - No borrow of the pass state is held while store or subscriber code runs.
//!
//! ## Example
//! ```rust
//! use storevisor::{Action, Config, Context, Dispatcher, DispatchError, Store, StoreError};
//!
//! struct Waiter(&'static str);
//!
//! impl Store for Waiter {
//!     fn receive(&mut self, _: &Action, cx: &mut Context<'_, Self>) -> Result<(), StoreError> {
//!         cx.wait_for([self.0], |_: &mut Waiter, _| Ok(()))?;
//!         Ok(())
//!     }
//! }
//!
//! let dispatcher = Dispatcher::builder(Config::default())
//!     .with_store("A", Waiter("B"))
//!     .with_store("B", Waiter("A"))
//!     .build()
//!     .unwrap();
//!
//! let err = dispatcher.dispatch(&Action::signal("ping")).unwrap_err();
//! assert!(matches!(err, DispatchError::CircularDependency { .. }));
//! assert!(!dispatcher.is_dispatching());
//! ```

use std::cell::RefCell;
use std::fmt;

use crate::actions::Action;
use crate::core::pass::{Pass, PassGuard};
use crate::core::registry::Registry;
use crate::core::waits::WaitEntry;
use crate::core::{Config, DispatcherBuilder};
use crate::error::{DispatchError, StoreError};
use crate::events::{Event, EventKind};
use crate::stores::{erase, Continuation, Progress, Store};
use crate::subscribers::SubscriberSet;

/// Single-threaded action dispatcher over a fixed set of named stores.
pub struct Dispatcher {
    cfg: Config,
    registry: Registry,
    pass: RefCell<Pass>,
    subs: SubscriberSet,
}

impl Dispatcher {
    /// Starts building a dispatcher with the given configuration.
    pub fn builder(cfg: Config) -> DispatcherBuilder {
        DispatcherBuilder::new(cfg)
    }

    pub(crate) fn new_internal(cfg: Config, registry: Registry, subs: SubscriberSet) -> Self {
        Self {
            cfg,
            registry,
            pass: RefCell::new(Pass::default()),
            subs,
        }
    }

    /// Delivers `action` to every store, then resolves declared waits.
    ///
    /// On success every store has processed the action exactly once. On any
    /// error the pass is aborted; in both cases the pass state is reset before
    /// returning, so the dispatcher stays usable.
    pub fn dispatch(&self, action: &Action) -> Result<(), DispatchError> {
        if self.is_dispatching() || self.registry.any_borrowed() {
            tracing::warn!(action = action.kind(), "rejected nested dispatch");
            return Err(DispatchError::ReentrantDispatch);
        }
        action.validate()?;

        let _span = tracing::debug_span!("dispatch", action = action.kind()).entered();
        let _guard = PassGuard::begin(&self.pass, self.registry.len(), action.kind());
        self.publish(Event::new(EventKind::DispatchStarted).with_action(action.kind()));

        match self.sweep(action).and_then(|()| self.resolve(action)) {
            Ok(rounds) => {
                let finished = self.pass.borrow().completion.count();
                tracing::debug!(rounds, finished, "dispatch finished");
                self.publish(
                    Event::new(EventKind::DispatchFinished)
                        .with_action(action.kind())
                        .with_round(rounds),
                );
                Ok(())
            }
            Err(err) => {
                tracing::debug!(error = %err, label = err.as_label(), "dispatch failed");
                self.publish(
                    Event::new(EventKind::DispatchFailed)
                        .with_action(action.kind())
                        .with_reason(format!("{}: {}", err.as_label(), err.as_message())),
                );
                Err(err)
            }
        }
    }

    /// Declares, on behalf of `waiter`, that `continuation` must run only after
    /// every store in `dependencies` finished the current action.
    ///
    /// This is the name-addressed form of [`Context::wait_for`](crate::Context::wait_for);
    /// the continuation does not get the store back. It is only accepted while
    /// `waiter` itself is receiving an action, and fails with
    /// [`DispatchError::NotDispatching`] otherwise.
    pub fn wait_for<I, N, F>(
        &self,
        waiter: &str,
        dependencies: I,
        continuation: F,
    ) -> Result<(), DispatchError>
    where
        I: IntoIterator<Item = N>,
        N: AsRef<str>,
        F: FnOnce(&Progress<'_>) -> Result<(), StoreError> + 'static,
    {
        if !self.is_dispatching() {
            return Err(DispatchError::NotDispatching {
                store: waiter.to_string(),
            });
        }
        let index = self
            .registry
            .index_of(waiter)
            .ok_or_else(|| DispatchError::UnknownStore {
                name: waiter.to_string(),
            })?;
        let dependencies = dependencies
            .into_iter()
            .map(|name| name.as_ref().to_string())
            .collect();

        self.register_wait(
            index,
            dependencies,
            erase(move |_, progress| continuation(progress)),
        )
    }

    /// True while a pass is running.
    pub fn is_dispatching(&self) -> bool {
        self.pass.borrow().in_progress
    }

    /// True if `name` has finished processing the action of the running pass.
    ///
    /// Always `false` outside a pass.
    pub fn is_finished(&self, name: &str) -> bool {
        self.registry.index_of(name).is_some_and(|index| {
            let pass = self.pass.borrow();
            pass.in_progress && pass.completion.is_finished(index)
        })
    }

    /// Runs `f` against the store registered under `name`.
    ///
    /// Returns `None` if there is no such store, it is not an `S`, or it is
    /// currently being invoked.
    pub fn with_store<S: Store, R>(&self, name: &str, f: impl FnOnce(&S) -> R) -> Option<R> {
        let slot = self.registry.get(name)?;
        let store = slot.store.try_borrow().ok()?;
        (**store).as_any().downcast_ref::<S>().map(f)
    }

    /// Runs `f` against the store registered under `name`, mutably.
    ///
    /// Only available between passes; returns `None` while dispatching.
    pub fn with_store_mut<S: Store, R>(
        &self,
        name: &str,
        f: impl FnOnce(&mut S) -> R,
    ) -> Option<R> {
        if self.is_dispatching() {
            return None;
        }
        let slot = self.registry.get(name)?;
        let mut store = slot.store.try_borrow_mut().ok()?;
        (**store).as_any_mut().downcast_mut::<S>().map(f)
    }

    /// Store names in registry (invocation) order.
    pub fn store_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.registry.names()
    }

    /// Number of registered stores.
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// True if no stores are registered.
    pub fn is_empty(&self) -> bool {
        self.registry.len() == 0
    }

    /// The configuration this dispatcher was built with.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    pub(crate) fn store_name(&self, index: usize) -> &str {
        self.registry.name(index)
    }

    /// Validates and records a wait for the store at `waiter`.
    pub(crate) fn register_wait(
        &self,
        waiter: usize,
        dependencies: Vec<String>,
        continuation: Continuation,
    ) -> Result<(), DispatchError> {
        let waiter_name = self.registry.name(waiter);

        let (depends_on, action) = {
            let pass = &mut *self.pass.borrow_mut();
            if !pass.in_progress || pass.current != Some(waiter) {
                return Err(DispatchError::NotDispatching {
                    store: waiter_name.to_string(),
                });
            }
            if dependencies.iter().any(|name| name == waiter_name) {
                return Err(DispatchError::SelfWait {
                    store: waiter_name.to_string(),
                });
            }
            if pass.waits.has_waited(waiter) {
                return Err(DispatchError::AlreadyWaiting {
                    store: waiter_name.to_string(),
                });
            }

            let mut depends_on = Vec::with_capacity(dependencies.len());
            for name in &dependencies {
                let index = self
                    .registry
                    .index_of(name)
                    .ok_or_else(|| DispatchError::UnknownStore { name: name.clone() })?;
                if !depends_on.contains(&index) {
                    depends_on.push(index);
                }
            }

            if let Some(&other) = depends_on
                .iter()
                .find(|&&dep| pass.waits.waits_on(dep, waiter))
            {
                let other = self.registry.name(other);
                tracing::warn!(waiter = waiter_name, other, "rejected circular wait");
                return Err(DispatchError::CircularDependency {
                    waiter: waiter_name.to_string(),
                    other: other.to_string(),
                });
            }

            pass.waits.insert(
                waiter,
                WaitEntry {
                    depends_on: depends_on.clone(),
                    continuation,
                },
            );
            (depends_on, pass.action.clone())
        };

        let names: Vec<String> = depends_on
            .iter()
            .map(|&i| self.registry.name(i).to_string())
            .collect();
        tracing::debug!(store = waiter_name, depends_on = ?names, "store waiting");

        let mut event = Event::new(EventKind::WaitRegistered)
            .with_store(waiter_name)
            .with_depends_on(names);
        if let Some(action) = action {
            event = event.with_action(action);
        }
        self.publish(event);
        Ok(())
    }

    /// Invokes every store once, in registry order.
    fn sweep(&self, action: &Action) -> Result<(), DispatchError> {
        for index in 0..self.registry.len() {
            let slot = self.registry.slot(index);
            let mut store = slot
                .store
                .try_borrow_mut()
                .map_err(|_| DispatchError::ReentrantDispatch)?;

            self.pass.borrow_mut().current = Some(index);
            let result = store.receive_any(action, self, index);
            drop(store);
            self.pass.borrow_mut().current = None;

            result.map_err(|e| e.into_dispatch(slot.name()))?;

            let waited = {
                let pass = &mut *self.pass.borrow_mut();
                let waited = pass.waits.has_waited(index);
                if !waited {
                    pass.completion.mark(index);
                }
                waited
            };
            tracing::trace!(store = slot.name(), waited, "store received action");
            self.publish(
                Event::new(EventKind::StoreReceived)
                    .with_action(action.kind())
                    .with_store(slot.name()),
            );
        }
        Ok(())
    }

    /// Runs continuations round by round until no waits remain.
    ///
    /// Returns the number of rounds run. A round that runs nothing while waits
    /// are outstanding is a deadlock.
    fn resolve(&self, action: &Action) -> Result<u32, DispatchError> {
        let mut round = 0u32;
        loop {
            if self.pass.borrow().waits.is_empty() {
                return Ok(round);
            }
            let waiting = self.pass.borrow().waits.waiting();
            round += 1;

            let mut resolved = 0u32;
            for index in waiting {
                let entry = {
                    let pass = &mut *self.pass.borrow_mut();
                    if !pass.waits.is_ready(index, &pass.completion) {
                        continue;
                    }
                    pass.waits.take(index)
                };
                let Some(entry) = entry else { continue };

                self.resume(action, index, entry.continuation)?;
                resolved += 1;
                self.publish(
                    Event::new(EventKind::StoreResumed)
                        .with_action(action.kind())
                        .with_store(self.registry.name(index))
                        .with_round(round),
                );
            }

            if resolved == 0 {
                let waiting: Vec<String> = self
                    .pass
                    .borrow()
                    .waits
                    .waiting()
                    .into_iter()
                    .map(|i| self.registry.name(i).to_string())
                    .collect();
                tracing::warn!(round, ?waiting, "deadlock: no wait could be resolved");
                return Err(DispatchError::Deadlock { waiting });
            }

            tracing::debug!(round, resolved, "resolution round completed");
            if self.cfg.round_events {
                self.publish(
                    Event::new(EventKind::RoundCompleted)
                        .with_action(action.kind())
                        .with_round(round)
                        .with_resolved(resolved),
                );
            }
        }
    }

    /// Runs one continuation against its store and marks the store finished.
    fn resume(
        &self,
        action: &Action,
        index: usize,
        continuation: Continuation,
    ) -> Result<(), DispatchError> {
        let slot = self.registry.slot(index);
        let mut store = slot
            .store
            .try_borrow_mut()
            .map_err(|_| DispatchError::ReentrantDispatch)?;

        let progress = Progress::new(self, action, index);
        let result = continuation((**store).as_any_mut(), &progress);
        drop(store);
        result.map_err(|e| e.into_dispatch(slot.name()))?;

        self.pass.borrow_mut().completion.mark(index);
        tracing::trace!(store = slot.name(), "store resumed");
        Ok(())
    }

    fn publish(&self, event: Event) {
        if !self.subs.is_empty() {
            self.subs.emit(&event);
        }
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("stores", &self.store_names().collect::<Vec<_>>())
            .field("dispatching", &self.is_dispatching())
            .field("cfg", &self.cfg)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use std::sync::{Arc, Mutex};

    use tracing_test::traced_test;

    use super::*;
    use crate::stores::Context;
    use crate::subscribers::Subscribe;

    type Log = Rc<RefCell<Vec<String>>>;

    /// Logs every invocation; waits on `deps` when non-empty.
    struct Tracer {
        log: Log,
        deps: Vec<&'static str>,
    }

    impl Tracer {
        fn new(log: &Log, deps: &[&'static str]) -> Self {
            Self {
                log: log.clone(),
                deps: deps.to_vec(),
            }
        }
    }

    impl Store for Tracer {
        fn receive(
            &mut self,
            action: &Action,
            cx: &mut Context<'_, Self>,
        ) -> Result<(), StoreError> {
            let name = cx.name();
            self.log.borrow_mut().push(format!("{name}:{}", action.kind()));
            if !self.deps.is_empty() {
                cx.wait_for(self.deps.clone(), |tracer: &mut Tracer, progress| {
                    tracer
                        .log
                        .borrow_mut()
                        .push(format!("{}:resumed", progress.store()));
                    Ok(())
                })?;
            }
            Ok(())
        }
    }

    fn tracers(log: &Log, stores: &[(&'static str, Vec<&'static str>)]) -> Dispatcher {
        stores
            .iter()
            .fold(Dispatcher::builder(Config::default()), |b, (name, deps)| {
                b.with_store(*name, Tracer::new(log, deps))
            })
            .build()
            .unwrap()
    }

    fn entries(log: &Log) -> Vec<String> {
        log.borrow().clone()
    }

    #[derive(Default)]
    struct Recorder {
        kinds: Mutex<Vec<EventKind>>,
    }

    impl Subscribe for Recorder {
        fn on_event(&self, event: &Event) {
            self.kinds.lock().unwrap().push(event.kind);
        }
    }

    #[test]
    fn test_invokes_every_store_in_registry_order() {
        let log = Log::default();
        let d = tracers(&log, &[("C", vec![]), ("A", vec![]), ("B", vec![])]);

        d.dispatch(&Action::signal("first")).unwrap();
        d.dispatch(&Action::signal("second")).unwrap();

        assert_eq!(
            entries(&log),
            vec!["C:first", "A:first", "B:first", "C:second", "A:second", "B:second"]
        );
        assert_eq!(d.store_names().collect::<Vec<_>>(), vec!["C", "A", "B"]);
        assert!(!d.is_dispatching());
    }

    #[test]
    fn test_every_store_sees_the_same_action() {
        struct Addr(Rc<RefCell<Vec<usize>>>);
        impl Store for Addr {
            fn receive(
                &mut self,
                action: &Action,
                _: &mut Context<'_, Self>,
            ) -> Result<(), StoreError> {
                self.0.borrow_mut().push(action as *const Action as usize);
                Ok(())
            }
        }

        let seen = Rc::new(RefCell::new(Vec::new()));
        let d = Dispatcher::builder(Config::default())
            .with_store("A", Addr(seen.clone()))
            .with_store("B", Addr(seen.clone()))
            .build()
            .unwrap();
        let action = Action::signal("ping");

        d.dispatch(&action).unwrap();

        let addr = &action as *const Action as usize;
        assert_eq!(*seen.borrow(), vec![addr, addr]);
    }

    #[test]
    fn test_waiting_store_resumes_after_its_dependency() {
        let log = Log::default();
        let d = tracers(&log, &[("H1", vec!["H2"]), ("H2", vec![])]);

        d.dispatch(&Action::signal("a")).unwrap();

        assert_eq!(entries(&log), vec!["H1:a", "H2:a", "H1:resumed"]);
    }

    #[test]
    fn test_continuation_sees_completion_state() {
        #[derive(Default)]
        struct Checker {
            saw: Option<(bool, bool)>,
        }
        impl Store for Checker {
            fn receive(
                &mut self,
                _: &Action,
                cx: &mut Context<'_, Self>,
            ) -> Result<(), StoreError> {
                assert!(!cx.is_finished("H2"));
                cx.wait_for(["H2"], |checker: &mut Checker, progress| {
                    checker.saw = Some((progress.is_finished("H2"), progress.is_finished("H1")));
                    Ok(())
                })?;
                Ok(())
            }
        }

        let d = Dispatcher::builder(Config::default())
            .with_store("H1", Checker::default())
            .with_store("H2", Tracer::new(&Log::default(), &[]))
            .build()
            .unwrap();

        d.dispatch(&Action::signal("a")).unwrap();

        assert_eq!(d.with_store("H1", |c: &Checker| c.saw), Some(Some((true, false))));
        assert!(!d.is_finished("H2"));
    }

    #[test]
    fn test_chained_waits_resolve_over_rounds() {
        let log = Log::default();
        let d = tracers(&log, &[("A", vec!["B"]), ("B", vec!["C"]), ("C", vec![])]);

        d.dispatch(&Action::signal("a")).unwrap();

        assert_eq!(
            entries(&log),
            vec!["A:a", "B:a", "C:a", "B:resumed", "A:resumed"]
        );
    }

    #[test]
    fn test_store_failure_aborts_and_resets() {
        struct Flaky {
            armed: bool,
        }
        impl Store for Flaky {
            fn receive(&mut self, _: &Action, _: &mut Context<'_, Self>) -> Result<(), StoreError> {
                if self.armed {
                    return Err(StoreError::fail("boom"));
                }
                Ok(())
            }
        }

        let d = Dispatcher::builder(Config::default())
            .with_store("Flaky", Flaky { armed: true })
            .build()
            .unwrap();

        let err = d.dispatch(&Action::signal("a")).unwrap_err();
        assert_eq!(
            err,
            DispatchError::Store {
                store: "Flaky".into(),
                error: "boom".into()
            }
        );
        assert!(!d.is_dispatching());

        d.with_store_mut("Flaky", |f: &mut Flaky| f.armed = false).unwrap();
        d.dispatch(&Action::signal("a")).unwrap();
    }

    #[test]
    fn test_panicking_store_leaves_dispatcher_usable() {
        struct Bomb {
            armed: bool,
        }
        impl Store for Bomb {
            fn receive(&mut self, _: &Action, _: &mut Context<'_, Self>) -> Result<(), StoreError> {
                if self.armed {
                    panic!("store blew up");
                }
                Ok(())
            }
        }

        let d = Dispatcher::builder(Config::default())
            .with_store("Bomb", Bomb { armed: true })
            .build()
            .unwrap();

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            d.dispatch(&Action::signal("a"))
        }));
        assert!(result.is_err());
        assert!(!d.is_dispatching());

        d.with_store_mut("Bomb", |b: &mut Bomb| b.armed = false).unwrap();
        d.dispatch(&Action::signal("a")).unwrap();
    }

    #[test]
    fn test_nested_dispatch_is_rejected() {
        #[derive(Default)]
        struct Nested {
            seen: Option<DispatchError>,
        }
        impl Store for Nested {
            fn receive(
                &mut self,
                _: &Action,
                cx: &mut Context<'_, Self>,
            ) -> Result<(), StoreError> {
                self.seen = cx.dispatcher().dispatch(&Action::signal("inner")).err();
                Ok(())
            }
        }

        let d = Dispatcher::builder(Config::default())
            .with_store("Nested", Nested::default())
            .build()
            .unwrap();

        d.dispatch(&Action::signal("outer")).unwrap();

        assert_eq!(
            d.with_store("Nested", |n: &Nested| n.seen.clone()),
            Some(Some(DispatchError::ReentrantDispatch))
        );
    }

    #[test]
    fn test_dispatch_while_a_store_is_borrowed_reaches_no_store() {
        let log = Log::default();
        let d = tracers(&log, &[("A", vec![]), ("B", vec![])]);

        let result = d.with_store("B", |_: &Tracer| d.dispatch(&Action::signal("x")));

        assert_eq!(result, Some(Err(DispatchError::ReentrantDispatch)));
        assert!(entries(&log).is_empty());
        assert!(!d.is_dispatching());

        let result = d.with_store_mut("A", |_: &mut Tracer| d.dispatch(&Action::signal("x")));
        assert_eq!(result, Some(Err(DispatchError::ReentrantDispatch)));
        assert!(entries(&log).is_empty());

        d.dispatch(&Action::signal("x")).unwrap();
        assert_eq!(entries(&log), vec!["A:x", "B:x"]);
    }

    #[test]
    fn test_wait_outside_pass_is_rejected() {
        let log = Log::default();
        let d = tracers(&log, &[("A", vec![]), ("B", vec![])]);

        let err = d.wait_for("A", ["B"], |_| Ok(())).unwrap_err();
        assert_eq!(err, DispatchError::NotDispatching { store: "A".into() });
    }

    #[test]
    fn test_wait_by_name_from_receiving_store() {
        struct ByName {
            target: &'static str,
            saw: Rc<Cell<bool>>,
        }
        impl Store for ByName {
            fn receive(
                &mut self,
                _: &Action,
                cx: &mut Context<'_, Self>,
            ) -> Result<(), StoreError> {
                let saw = self.saw.clone();
                cx.dispatcher().wait_for(self.target, ["B"], move |progress| {
                    saw.set(progress.is_finished("B"));
                    Ok(())
                })?;
                Ok(())
            }
        }

        let saw = Rc::new(Cell::new(false));
        let d = Dispatcher::builder(Config::default())
            .with_store(
                "A",
                ByName {
                    target: "A",
                    saw: saw.clone(),
                },
            )
            .with_store("B", Tracer::new(&Log::default(), &[]))
            .build()
            .unwrap();
        d.dispatch(&Action::signal("a")).unwrap();
        assert!(saw.get());

        let d = Dispatcher::builder(Config::default())
            .with_store("A", ByName { target: "B", saw })
            .with_store("B", Tracer::new(&Log::default(), &[]))
            .build()
            .unwrap();
        let err = d.dispatch(&Action::signal("a")).unwrap_err();
        assert_eq!(err, DispatchError::NotDispatching { store: "B".into() });
    }

    #[test]
    fn test_continuation_cannot_wait_again() {
        struct Greedy;
        impl Store for Greedy {
            fn receive(
                &mut self,
                _: &Action,
                cx: &mut Context<'_, Self>,
            ) -> Result<(), StoreError> {
                cx.wait_for(["B"], |_: &mut Greedy, progress| {
                    progress
                        .dispatcher()
                        .wait_for(progress.store(), ["B"], |_| Ok(()))?;
                    Ok(())
                })?;
                Ok(())
            }
        }

        let d = Dispatcher::builder(Config::default())
            .with_store("A", Greedy)
            .with_store("B", Tracer::new(&Log::default(), &[]))
            .build()
            .unwrap();

        let err = d.dispatch(&Action::signal("a")).unwrap_err();
        assert_eq!(err, DispatchError::NotDispatching { store: "A".into() });
    }

    #[test]
    fn test_continuation_failure_names_the_store() {
        struct Sour;
        impl Store for Sour {
            fn receive(
                &mut self,
                _: &Action,
                cx: &mut Context<'_, Self>,
            ) -> Result<(), StoreError> {
                cx.wait_for(["B"], |_: &mut Sour, _| Err(StoreError::fail("late")))?;
                Ok(())
            }
        }

        let d = Dispatcher::builder(Config::default())
            .with_store("A", Sour)
            .with_store("B", Tracer::new(&Log::default(), &[]))
            .build()
            .unwrap();

        let err = d.dispatch(&Action::signal("a")).unwrap_err();
        assert_eq!(
            err,
            DispatchError::Store {
                store: "A".into(),
                error: "late".into()
            }
        );
    }

    #[test]
    fn test_self_wait_is_rejected() {
        let log = Log::default();
        let d = tracers(&log, &[("A", vec!["A"])]);

        let err = d.dispatch(&Action::signal("a")).unwrap_err();
        assert_eq!(err, DispatchError::SelfWait { store: "A".into() });
        assert_eq!(err.as_label(), "dispatch_self_wait");
    }

    #[test]
    fn test_second_wait_is_rejected() {
        struct Twice;
        impl Store for Twice {
            fn receive(
                &mut self,
                _: &Action,
                cx: &mut Context<'_, Self>,
            ) -> Result<(), StoreError> {
                cx.wait_for(["B"], |_: &mut Twice, _| Ok(()))?;
                cx.wait_for(["B"], |_: &mut Twice, _| Ok(()))?;
                Ok(())
            }
        }

        let d = Dispatcher::builder(Config::default())
            .with_store("A", Twice)
            .with_store("B", Tracer::new(&Log::default(), &[]))
            .build()
            .unwrap();

        let err = d.dispatch(&Action::signal("a")).unwrap_err();
        assert_eq!(err, DispatchError::AlreadyWaiting { store: "A".into() });
    }

    #[test]
    fn test_unknown_dependency_is_named() {
        let log = Log::default();
        let d = tracers(&log, &[("A", vec!["B", "Ghost"]), ("B", vec![])]);

        let err = d.dispatch(&Action::signal("a")).unwrap_err();
        assert_eq!(
            err,
            DispatchError::UnknownStore {
                name: "Ghost".into()
            }
        );
        assert!(err.to_string().contains("Ghost"));
    }

    #[test]
    fn test_mutual_wait_is_circular() {
        let log = Log::default();
        let d = tracers(&log, &[("A", vec!["B"]), ("B", vec!["A"])]);

        let err = d.dispatch(&Action::signal("a")).unwrap_err();
        assert_eq!(
            err,
            DispatchError::CircularDependency {
                waiter: "B".into(),
                other: "A".into()
            }
        );
        assert!(!d.is_dispatching());
    }

    #[test]
    fn test_three_store_cycle_deadlocks() {
        let log = Log::default();
        let d = tracers(
            &log,
            &[("A", vec!["B"]), ("B", vec!["C"]), ("C", vec!["A"])],
        );

        let err = d.dispatch(&Action::signal("a")).unwrap_err();
        assert_eq!(
            err,
            DispatchError::Deadlock {
                waiting: vec!["A".into(), "B".into(), "C".into()]
            }
        );
        assert!(!entries(&log).iter().any(|e| e.ends_with(":resumed")));

        // The dispatcher is reusable after the failed pass.
        assert!(!d.is_dispatching());
    }

    #[test]
    fn test_blank_action_reaches_no_store() {
        let log = Log::default();
        let d = tracers(&log, &[("A", vec![])]);

        let err = d.dispatch(&Action::signal("  ")).unwrap_err();
        assert_eq!(err.as_label(), "dispatch_invalid_action");
        assert!(entries(&log).is_empty());
    }

    #[test]
    fn test_duplicate_store_names_fail_build() {
        let log = Log::default();
        let err = Dispatcher::builder(Config::default())
            .with_store("A", Tracer::new(&log, &[]))
            .with_store("A", Tracer::new(&log, &[]))
            .build()
            .unwrap_err();
        assert_eq!(err.as_label(), "dispatch_invalid_spec");
    }

    #[test]
    fn test_store_lookup_during_and_between_passes() {
        struct Peek {
            own: Option<bool>,
        }
        impl Store for Peek {
            fn receive(
                &mut self,
                _: &Action,
                cx: &mut Context<'_, Self>,
            ) -> Result<(), StoreError> {
                self.own = Some(cx.dispatcher().with_store("A", |_: &Peek| ()).is_some());
                Ok(())
            }
        }

        let d = Dispatcher::builder(Config::default())
            .with_store("A", Peek { own: None })
            .build()
            .unwrap();
        d.dispatch(&Action::signal("a")).unwrap();

        assert_eq!(d.with_store("A", |p: &Peek| p.own), Some(Some(false)));
        assert_eq!(d.with_store("A", |_: &Tracer| ()), None);
        assert_eq!(d.with_store("Missing", |_: &Peek| ()), None);
        assert_eq!(d.len(), 1);
        assert!(!d.is_empty());
    }

    #[test]
    fn test_events_follow_pass_order() {
        let rec = Arc::new(Recorder::default());
        let d = Dispatcher::builder(Config::default())
            .with_store("H1", Tracer::new(&Log::default(), &["H2"]))
            .with_store("H2", Tracer::new(&Log::default(), &[]))
            .with_subscribers(vec![rec.clone() as Arc<dyn Subscribe>])
            .build()
            .unwrap();

        d.dispatch(&Action::signal("a")).unwrap();

        assert_eq!(
            *rec.kinds.lock().unwrap(),
            vec![
                EventKind::DispatchStarted,
                EventKind::WaitRegistered,
                EventKind::StoreReceived,
                EventKind::StoreReceived,
                EventKind::StoreResumed,
                EventKind::RoundCompleted,
                EventKind::DispatchFinished,
            ]
        );
    }

    #[test]
    fn test_round_events_can_be_disabled() {
        let rec = Arc::new(Recorder::default());
        let cfg = Config {
            round_events: false,
            ..Config::default()
        };
        let d = Dispatcher::builder(cfg)
            .with_store("H1", Tracer::new(&Log::default(), &["H2"]))
            .with_store("H2", Tracer::new(&Log::default(), &[]))
            .with_subscribers(vec![rec.clone() as Arc<dyn Subscribe>])
            .build()
            .unwrap();

        d.dispatch(&Action::signal("a")).unwrap();

        let kinds = rec.kinds.lock().unwrap();
        assert!(!kinds.contains(&EventKind::RoundCompleted));
        assert_eq!(kinds.last(), Some(&EventKind::DispatchFinished));
    }

    #[test]
    fn test_failed_pass_reports_failure_event() {
        let rec = Arc::new(Recorder::default());
        let d = Dispatcher::builder(Config::default())
            .with_store("A", Tracer::new(&Log::default(), &["A"]))
            .with_subscribers(vec![rec.clone() as Arc<dyn Subscribe>])
            .build()
            .unwrap();

        assert!(d.dispatch(&Action::signal("a")).is_err());

        assert_eq!(
            *rec.kinds.lock().unwrap(),
            vec![EventKind::DispatchStarted, EventKind::DispatchFailed]
        );
    }

    #[traced_test]
    #[test]
    fn test_deadlock_is_logged() {
        let log = Log::default();
        let d = tracers(
            &log,
            &[("A", vec!["B"]), ("B", vec!["C"]), ("C", vec!["A"])],
        );

        assert!(d.dispatch(&Action::signal("a")).is_err());
        assert!(logs_contain("deadlock"));
    }
}
