// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Root state store and transaction coordinator.
//!
//! ## Overview
//!
//! [`StateStore`] owns the root of the state tree. Every navigator write ends
//! here: a nested navigator rewrites its parent's route, which rewrites its
//! parent's, up to [`StateStore::set_state`].
//!
//! ## Transactions
//!
//! [`StateStore::perform_transaction`] opens a re-entrant scope. Inside it,
//! writes are staged and reads see the staged value, so a multi-navigator
//! cascade observes its own writes. When the outermost scope closes the staged
//! value is committed once and observers are notified once. Nested scopes
//! collapse into the outermost. Outside any scope, a write commits
//! immediately.
//!
//! Observers are only notified when the committed root differs by identity
//! from the previous one.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;

use understory_nav_state::NavState;

use crate::events::ListenerId;

/// Commit observer: `(previous root, committed root)`.
pub type StoreListener = Rc<dyn Fn(Option<&Rc<NavState>>, Option<&Rc<NavState>>)>;

/// Root state holder with re-entrant, batching transactions.
#[derive(Default)]
pub struct StateStore {
    current: RefCell<Option<Rc<NavState>>>,
    // Outer `Some` means a write is staged; the inner value may be a clear.
    staged: RefCell<Option<Option<Rc<NavState>>>>,
    depth: Cell<usize>,
    epoch: Cell<u64>,
    listeners: RefCell<Vec<(ListenerId, StoreListener)>>,
    next_listener: Cell<u64>,
}

impl fmt::Debug for StateStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateStore")
            .field("has_state", &self.current.borrow().is_some())
            .field("depth", &self.depth.get())
            .field("epoch", &self.epoch.get())
            .field("listeners", &self.listeners.borrow().len())
            .finish_non_exhaustive()
    }
}

struct Scope<'a> {
    store: &'a StateStore,
    finished: bool,
}

impl Drop for Scope<'_> {
    fn drop(&mut self) {
        let depth = self.store.depth.get() - 1;
        self.store.depth.set(depth);
        if depth == 0 && !self.finished {
            // Unwinding out of the outermost scope: nothing staged survives.
            self.store.staged.borrow_mut().take();
        }
    }
}

impl StateStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `state`.
    pub fn with_state(state: NavState) -> Self {
        let store = Self::new();
        store.current.replace(Some(Rc::new(state)));
        store
    }

    /// The root state, including writes staged by an open transaction.
    pub fn get_state(&self) -> Option<Rc<NavState>> {
        if let Some(staged) = &*self.staged.borrow() {
            return staged.clone();
        }
        self.current.borrow().clone()
    }

    /// The last committed root state, ignoring staged writes.
    pub fn committed(&self) -> Option<Rc<NavState>> {
        self.current.borrow().clone()
    }

    /// Replace the root state.
    pub fn set_state(&self, state: Rc<NavState>) {
        self.write(Some(state));
    }

    /// Remove the root state.
    pub fn clear(&self) {
        self.write(None);
    }

    /// True while a transaction is open.
    pub fn in_transaction(&self) -> bool {
        self.depth.get() > 0
    }

    /// Number of commits that changed the root so far.
    pub fn epoch(&self) -> u64 {
        self.epoch.get()
    }

    /// Run `work` inside a transaction and commit its writes as one batch.
    pub fn perform_transaction<R>(&self, work: impl FnOnce() -> R) -> R {
        self.depth.set(self.depth.get() + 1);
        let mut scope = Scope {
            store: self,
            finished: false,
        };
        let out = work();
        scope.finished = true;
        drop(scope);
        if self.depth.get() == 0 {
            let staged = self.staged.borrow_mut().take();
            if let Some(next) = staged {
                self.commit(next);
            }
        }
        out
    }

    /// Observe commits. Observers run in subscription order.
    pub fn subscribe(
        &self,
        listener: impl Fn(Option<&Rc<NavState>>, Option<&Rc<NavState>>) + 'static,
    ) -> ListenerId {
        let raw = self.next_listener.get();
        self.next_listener.set(raw + 1);
        let id = ListenerId::new(raw);
        self.listeners.borrow_mut().push((id, Rc::new(listener)));
        id
    }

    /// Stop observing. Returns false if `id` was not subscribed.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(l, _)| *l != id);
        listeners.len() != before
    }

    fn write(&self, state: Option<Rc<NavState>>) {
        if self.in_transaction() {
            self.staged.replace(Some(state));
        } else {
            self.commit(state);
        }
    }

    fn commit(&self, next: Option<Rc<NavState>>) {
        let prev = self.current.replace(next.clone());
        let unchanged = match (&prev, &next) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        if unchanged {
            return;
        }
        self.epoch.set(self.epoch.get() + 1);
        tracing::trace!(epoch = self.epoch.get(), "committed navigation state");
        let listeners: Vec<StoreListener> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, l)| l.clone())
            .collect();
        for listener in listeners {
            listener(prev.as_ref(), next.as_ref());
        }
    }
}
