// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Navigators: mounted containers that each own one slice of the state tree.
//!
//! ## Overview
//!
//! A [`Navigator`] binds a [`Router`] to a position in the state tree. The root
//! navigator's slice is the [`StateStore`] root; a nested navigator's slice is
//! the nested state of one route of its parent. Reads walk down from the store,
//! writes walk up: a nested navigator asks its parent to replace the route's
//! nested state, and so on until the store is written.
//!
//! Mounting and unmounting are explicit:
//!
//! ```
//! use std::rc::Rc;
//! use understory_nav_state::{
//!     Action, NavState, Route, Router, RouterConfig, StateKey, base_state_for_action,
//! };
//! use understory_navigator::{NavigatorBuilder, StateStore};
//!
//! struct Flat;
//!
//! impl Router for Flat {
//!     fn initial_state(&self, config: &RouterConfig) -> NavState {
//!         let routes = config.route_names.iter().map(|n| Route::new(n.as_str())).collect();
//!         NavState::new(StateKey::generate("flat"), config.route_names.clone(), routes, 0)
//!             .unwrap()
//!     }
//!     fn state_for_action(&self, s: &NavState, a: &Action, c: &RouterConfig) -> Option<NavState> {
//!         base_state_for_action(s, a, c)
//!     }
//!     fn can_go_back(&self, _: &NavState) -> bool {
//!         false
//!     }
//! }
//!
//! let store = Rc::new(StateStore::new());
//! let root = NavigatorBuilder::new(Flat)
//!     .config(RouterConfig::new(["Feed", "Settings"]))
//!     .mount_root(store.clone())
//!     .unwrap();
//! let settings = root.state().routes[1].key.clone();
//! let inner = NavigatorBuilder::new(Flat)
//!     .config(RouterConfig::new(["General", "Privacy"]))
//!     .mount_nested(&root, &settings)
//!     .unwrap();
//!
//! // The nested state lives inside the parent's route.
//! assert!(Rc::ptr_eq(root.state().nested(&settings).unwrap(), &inner.state()));
//!
//! inner.unmount();
//! assert!(root.state().nested(&settings).is_none());
//! ```

use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;

use understory_nav_state::{
    Action, NavState, RouteKey, Router, RouterConfig, StateError, StateKey,
};

use crate::dispatch::{Container, VisitedSet, route_action};
use crate::events::{Emitter, ListenerId};
use crate::facade::{Facade, FacadeBuilder, GetState, HelperOptions, OnAction, SetState};
use crate::lifecycle;
use crate::transaction::StateStore;

/// Errors reported when mounting a navigator.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum NavigatorError {
    /// The initial (or adopted) state violates its invariants.
    #[error("invalid navigation state")]
    InvalidState(#[from] StateError),
    /// The parent has no route with this key, or is no longer mounted.
    #[error("parent navigator has no route `{0}`")]
    UnknownParentRoute(RouteKey),
    /// A navigator is already mounted under this route.
    #[error("a navigator is already mounted under route `{0}`")]
    RouteOccupied(RouteKey),
    /// Another mounted navigator in the tree already uses this state key.
    #[error("state key `{0}` is already used by a mounted navigator")]
    DuplicateKey(StateKey),
}

enum Slot {
    Root { listener: Cell<Option<ListenerId>> },
    Nested {
        parent: Rc<NavigatorInner>,
        route: RouteKey,
    },
}

pub(crate) struct NavigatorInner {
    router: RefCell<Rc<dyn Router>>,
    config: RouterConfig,
    store: Rc<StateStore>,
    slot: Slot,
    initial: Rc<NavState>,
    children: RefCell<Vec<Weak<NavigatorInner>>>,
    emitter: Emitter,
    mounted: Cell<bool>,
}

impl fmt::Debug for NavigatorInner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigatorInner")
            .field("router", &self.router.borrow().kind())
            .field("key", &self.initial.key)
            .field("route", &self.route())
            .field("mounted", &self.mounted.get())
            .finish_non_exhaustive()
    }
}

impl NavigatorInner {
    pub(crate) fn store(&self) -> &Rc<StateStore> {
        &self.store
    }

    pub(crate) fn emitter(&self) -> &Emitter {
        &self.emitter
    }

    /// Route of the parent this navigator is mounted under.
    pub(crate) fn route(&self) -> Option<&RouteKey> {
        match &self.slot {
            Slot::Root { .. } => None,
            Slot::Nested { route, .. } => Some(route),
        }
    }

    /// Mounted children, in mount order.
    pub(crate) fn children(&self) -> Vec<Rc<Self>> {
        self.children
            .borrow()
            .iter()
            .filter_map(Weak::upgrade)
            .filter(|c| c.mounted.get())
            .collect()
    }

    /// The mounted child under `route`, if any.
    pub(crate) fn child_at(&self, route: &RouteKey) -> Option<Rc<Self>> {
        self.children()
            .into_iter()
            .find(|c| c.route() == Some(route))
    }

    fn root(self: &Rc<Self>) -> Rc<Self> {
        let mut nav = self.clone();
        while let Slot::Nested { parent, .. } = &nav.slot {
            let parent = parent.clone();
            nav = parent;
        }
        nav
    }

    /// Whether this navigator or a mounted descendant has state key `key`.
    fn key_in_use(&self, key: &StateKey) -> bool {
        self.mounted.get()
            && (self.get_state().key == *key || self.children().iter().any(|c| c.key_in_use(key)))
    }

    /// The navigator's slice of the (possibly staged) state tree.
    fn current(&self) -> Option<Rc<NavState>> {
        match &self.slot {
            Slot::Root { .. } => self.store.get_state(),
            Slot::Nested { parent, route } => parent.current()?.nested(route).cloned(),
        }
    }

    /// The current slice, or the mount-time state if the slice is missing.
    fn get_state(&self) -> Rc<NavState> {
        self.current().unwrap_or_else(|| self.initial.clone())
    }

    fn write(&self, state: Rc<NavState>) {
        self.write_slot(Some(state));
    }

    /// Replace the slice. A no-op once the navigator is unmounted; `unmount`
    /// clears the slice before marking it.
    fn write_slot(&self, state: Option<Rc<NavState>>) {
        if !self.mounted.get() {
            tracing::debug!(
                navigator = %self.initial.key,
                "dropped write from an unmounted navigator"
            );
            return;
        }
        match &self.slot {
            Slot::Root { .. } => match state {
                Some(state) => self.store.set_state(state),
                None => self.store.clear(),
            },
            Slot::Nested { parent, route } => {
                match parent.get_state().with_route_state(route, state) {
                    Some(next) => parent.write(Rc::new(next)),
                    None => tracing::debug!(
                        route = %route,
                        "dropped write to a route that no longer exists"
                    ),
                }
            }
        }
    }

    fn on_action(&self, action: &Action, visited: &mut VisitedSet) -> bool {
        self.store
            .perform_transaction(|| route_action(self, action, visited))
    }

    fn mark_unmounted(&self) {
        self.mounted.set(false);
        for child in self.children.borrow().iter().filter_map(Weak::upgrade) {
            child.mark_unmounted();
        }
    }
}

impl Container for NavigatorInner {
    fn container_key(&self) -> Option<StateKey> {
        self.mounted.get().then(|| self.get_state().key.clone())
    }

    fn handle_locally(&self, action: &Action) -> bool {
        let router = self.router.borrow().clone();
        let state = self.get_state();
        match router.state_for_action(&state, action, &self.config) {
            Some(next) => {
                self.write(Rc::new(next));
                true
            }
            None => false,
        }
    }

    fn parent_container(&self) -> Option<Rc<Self>> {
        match &self.slot {
            Slot::Root { .. } => None,
            Slot::Nested { parent, .. } => Some(parent.clone()),
        }
    }

    fn child_containers(&self) -> Vec<Rc<Self>> {
        self.children()
    }
}

struct Facades {
    options: RefCell<HelperOptions>,
    builder: RefCell<FacadeBuilder>,
    // (route, navigator facade it was derived from, screen facade)
    screens: RefCell<Vec<(RouteKey, Facade, Facade)>>,
    parent: Option<(Navigator, RouteKey)>,
}

/// A mounted container.
///
/// Handles are cheap to clone and share one navigator. Dropping every handle
/// without calling [`Navigator::unmount`] detaches the navigator from dispatch
/// but leaves its state in the tree.
#[derive(Clone)]
pub struct Navigator {
    inner: Rc<NavigatorInner>,
    facades: Rc<Facades>,
}

impl fmt::Debug for Navigator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Navigator")
            .field("key", &self.key())
            .field("router", &self.inner.router.borrow().kind())
            .field("route", &self.inner.route())
            .field("mounted", &self.is_mounted())
            .finish_non_exhaustive()
    }
}

impl Navigator {
    fn new(inner: Rc<NavigatorInner>, parent: Option<(Self, RouteKey)>) -> Self {
        let on_action: OnAction = {
            let inner = inner.clone();
            Rc::new(move |action, visited| inner.on_action(action, visited))
        };
        let get_state: GetState = {
            let inner = inner.clone();
            Rc::new(move || inner.get_state())
        };
        let set_state: SetState = {
            let inner = inner.clone();
            Rc::new(move |state| inner.write(Rc::new(state)))
        };
        let options = HelperOptions {
            on_action,
            get_state,
            set_state,
            emitter: inner.emitter.clone(),
            router: inner.router.borrow().clone(),
        };
        let parent_facade = parent.as_ref().map(|(nav, route)| nav.screen(route));
        let builder = FacadeBuilder::new(parent_facade, inner.store.clone());
        Self {
            facades: Rc::new(Facades {
                options: RefCell::new(options),
                builder: RefCell::new(builder),
                screens: RefCell::new(Vec::new()),
                parent,
            }),
            inner,
        }
    }

    /// The navigator's current state.
    ///
    /// Inside a transaction this includes staged writes.
    pub fn state(&self) -> Rc<NavState> {
        self.inner.get_state()
    }

    /// Key of the navigator's current state.
    pub fn key(&self) -> StateKey {
        self.state().key.clone()
    }

    /// True until [`Navigator::unmount`] is called on it or an ancestor.
    pub fn is_mounted(&self) -> bool {
        self.inner.mounted.get()
    }

    /// The shared state store.
    pub fn store(&self) -> &Rc<StateStore> {
        &self.inner.store
    }

    /// The navigator's event channel.
    pub fn emitter(&self) -> &Emitter {
        &self.inner.emitter
    }

    /// Route this navigator with a shared visited set. See [`route_action`].
    pub fn on_action(&self, action: &Action, visited: &mut VisitedSet) -> bool {
        self.inner.on_action(action, visited)
    }

    /// The navigator's facade, rebuilt only when a dependency changed.
    pub fn helpers(&self) -> Facade {
        let mut builder = self.facades.builder.borrow_mut();
        if let Some((parent, route)) = &self.facades.parent {
            builder.set_parent(Some(parent.screen(route)));
        }
        builder.build(&self.facades.options.borrow())
    }

    /// The facade for one route shown by this navigator.
    pub fn screen(&self, route: &RouteKey) -> Facade {
        let base = self.helpers();
        let mut screens = self.facades.screens.borrow_mut();
        if let Some((_, _, facade)) = screens
            .iter()
            .find(|(r, b, _)| r == route && b.ptr_eq(&base))
        {
            return facade.clone();
        }
        let state = self.state();
        screens.retain(|(r, _, _)| r != route && state.route(r).is_some());
        let get_state = self.facades.options.borrow().get_state.clone();
        let facade = base.for_route(route.clone(), get_state);
        screens.push((route.clone(), base, facade.clone()));
        facade
    }

    /// Swap the router. The next [`Navigator::helpers`] call rebuilds the facade.
    pub fn set_router(&self, router: Rc<dyn Router>) {
        *self.inner.router.borrow_mut() = router.clone();
        self.facades.options.borrow_mut().router = router;
    }

    /// Remove the navigator's state from the tree and detach it (and its
    /// descendants) from dispatch. Calling it twice is a no-op.
    pub fn unmount(&self) {
        if !self.inner.mounted.get() {
            return;
        }
        let store = self.inner.store.clone();
        store.perform_transaction(|| self.inner.write_slot(None));
        self.inner.mark_unmounted();
        match &self.inner.slot {
            Slot::Root { listener } => {
                if let Some(id) = listener.take() {
                    store.unsubscribe(id);
                }
            }
            Slot::Nested { parent, .. } => {
                let me = Rc::as_ptr(&self.inner);
                parent
                    .children
                    .borrow_mut()
                    .retain(|c| c.strong_count() > 0 && c.as_ptr() != me);
            }
        }
        tracing::debug!(route = ?self.inner.route(), "unmounted navigator");
    }
}

/// Configures and mounts a [`Navigator`].
pub struct NavigatorBuilder {
    router: Rc<dyn Router>,
    config: RouterConfig,
}

impl fmt::Debug for NavigatorBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigatorBuilder")
            .field("router", &self.router.kind())
            .field("config", &self.config)
            .finish()
    }
}

impl NavigatorBuilder {
    /// Start building a navigator driven by `router`.
    pub fn new(router: impl Router + 'static) -> Self {
        Self::shared(Rc::new(router))
    }

    /// Start building a navigator with a router shared with other navigators.
    pub fn shared(router: Rc<dyn Router>) -> Self {
        Self {
            router,
            config: RouterConfig::default(),
        }
    }

    /// Set the router configuration.
    pub fn set_config(&mut self, config: RouterConfig) {
        self.config = config;
    }

    /// Builder-style [`NavigatorBuilder::set_config`].
    #[must_use]
    pub fn config(mut self, config: RouterConfig) -> Self {
        self.set_config(config);
        self
    }

    /// Adopt `existing` unless it is missing or stale; otherwise build the
    /// router's initial state. Returns the state and whether it must be written.
    fn initial_state(&self, existing: Option<Rc<NavState>>) -> Result<(Rc<NavState>, bool), NavigatorError> {
        match existing.filter(|s| !s.stale) {
            Some(state) => {
                state.validate()?;
                Ok((state, false))
            }
            None => {
                let state = self.router.initial_state(&self.config);
                state.validate()?;
                Ok((Rc::new(state), true))
            }
        }
    }

    fn into_inner(self, store: Rc<StateStore>, slot: Slot, initial: Rc<NavState>) -> Rc<NavigatorInner> {
        Rc::new(NavigatorInner {
            router: RefCell::new(self.router),
            config: self.config,
            store,
            slot,
            initial,
            children: RefCell::new(Vec::new()),
            emitter: Emitter::new(),
            mounted: Cell::new(true),
        })
    }

    /// Mount the root navigator on `store`.
    ///
    /// A non-stale state already in the store is adopted; otherwise the
    /// router's initial state is committed.
    pub fn mount_root(self, store: Rc<StateStore>) -> Result<Navigator, NavigatorError> {
        let (initial, write) = self.initial_state(store.get_state())?;
        let kind = self.router.kind();
        let slot = Slot::Root {
            listener: Cell::new(None),
        };
        let inner = self.into_inner(store.clone(), slot, initial.clone());
        let id = lifecycle::observe(&inner);
        if let Slot::Root { listener } = &inner.slot {
            listener.set(Some(id));
        }
        if write {
            store.perform_transaction(|| inner.write(initial.clone()));
        }
        tracing::debug!(navigator = %initial.key, router = kind, "mounted root navigator");
        Ok(Navigator::new(inner, None))
    }

    /// Mount a navigator inside `route` of `parent`.
    ///
    /// A non-stale nested state already stored in the route is adopted;
    /// otherwise the router's initial state is written into the route.
    /// Fails with [`NavigatorError::DuplicateKey`] if a mounted navigator
    /// anywhere in the tree already has the same state key.
    pub fn mount_nested(self, parent: &Navigator, route: &RouteKey) -> Result<Navigator, NavigatorError> {
        if !parent.is_mounted() {
            return Err(NavigatorError::UnknownParentRoute(route.clone()));
        }
        let parent_state = parent.state();
        let Some(host) = parent_state.route(route) else {
            return Err(NavigatorError::UnknownParentRoute(route.clone()));
        };
        if parent.inner.child_at(route).is_some() {
            return Err(NavigatorError::RouteOccupied(route.clone()));
        }
        let (initial, write) = self.initial_state(host.state.clone())?;
        if parent.inner.root().key_in_use(&initial.key) {
            return Err(NavigatorError::DuplicateKey(initial.key.clone()));
        }
        let kind = self.router.kind();
        let store = parent.inner.store.clone();
        let slot = Slot::Nested {
            parent: parent.inner.clone(),
            route: route.clone(),
        };
        let inner = self.into_inner(store.clone(), slot, initial.clone());
        parent
            .inner
            .children
            .borrow_mut()
            .push(Rc::downgrade(&inner));
        if write {
            store.perform_transaction(|| inner.write(initial.clone()));
        }
        tracing::debug!(
            navigator = %initial.key,
            router = kind,
            route = %route,
            "mounted nested navigator"
        );
        Ok(Navigator::new(inner, Some((parent.clone(), route.clone()))))
    }
}
