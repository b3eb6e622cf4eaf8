// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for navigation state: keys, routes, states, and change flags.

use alloc::collections::{BTreeMap, BTreeSet};
use alloc::format;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use core::sync::atomic::{AtomicUsize, Ordering};

/// Route parameters, an ordered string map.
pub type Params = BTreeMap<String, String>;

static NEXT_KEY: AtomicUsize = AtomicUsize::new(1);

fn next_suffix() -> usize {
    NEXT_KEY.fetch_add(1, Ordering::Relaxed)
}

/// Identifier of a navigation state, and of the navigator that owns it.
///
/// ## Semantics
///
/// - Keys are cheap to clone (shared string storage).
/// - [`StateKey::generate`] mints a process-unique key of the form `"{prefix}-{n}"`.
/// - The dispatcher's visited set is keyed by `StateKey`, so two mounted
///   navigators must never share one.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateKey(Rc<str>);

impl StateKey {
    /// Wrap an existing identifier.
    pub fn new(key: impl Into<Rc<str>>) -> Self {
        Self(key.into())
    }

    /// Mint a fresh key with the given prefix.
    pub fn generate(prefix: &str) -> Self {
        Self::new(format!("{prefix}-{}", next_suffix()))
    }

    /// The key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StateKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

/// Identifier of a route, unique across the whole state tree.
///
/// Stable for the lifetime of the route: a route keeps its key across
/// transitions until a router removes it.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RouteKey(Rc<str>);

impl RouteKey {
    /// Wrap an existing identifier.
    pub fn new(key: impl Into<Rc<str>>) -> Self {
        Self(key.into())
    }

    /// Mint a fresh key for a route with the given name.
    pub fn generate(name: &str) -> Self {
        Self::new(format!("{name}-{}", next_suffix()))
    }

    /// The key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RouteKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

/// A single route in a navigator's state.
#[derive(Clone, Debug, PartialEq)]
pub struct Route {
    /// Unique, stable key.
    pub key: RouteKey,
    /// Route name; one of the owning state's [`NavState::route_names`].
    pub name: String,
    /// Optional parameters.
    pub params: Option<Params>,
    /// State of a navigator nested inside this route, if one is mounted.
    pub state: Option<Rc<NavState>>,
}

impl Route {
    /// Create a route with a freshly generated key.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            key: RouteKey::generate(&name),
            name,
            params: None,
            state: None,
        }
    }

    /// Create a route with an explicit key.
    pub fn with_key(key: RouteKey, name: impl Into<String>) -> Self {
        Self {
            key,
            name: name.into(),
            params: None,
            state: None,
        }
    }

    /// Attach parameters.
    #[must_use]
    pub fn with_params(mut self, params: Option<Params>) -> Self {
        self.params = params;
        self
    }

    /// Attach nested state.
    #[must_use]
    pub fn with_state(mut self, state: Option<Rc<NavState>>) -> Self {
        self.state = state;
        self
    }
}

/// Errors reported when a navigation state violates its invariants.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    /// The active index does not point at a route.
    #[error("index {index} is out of bounds for {len} routes")]
    IndexOutOfBounds {
        /// Offending index.
        index: usize,
        /// Number of routes.
        len: usize,
    },
    /// Two routes share a key.
    #[error("route key `{0}` appears more than once")]
    DuplicateRouteKey(RouteKey),
    /// A route's name is not among the state's route names.
    #[error("route name `{0}` is not one of the navigator's route names")]
    UnknownRouteName(String),
    /// The state declares no route names at all.
    #[error("navigator declares no route names")]
    EmptyRouteNames,
}

/// Navigation state owned by one navigator.
///
/// ## Invariants
///
/// - `index < routes.len()` whenever `routes` is non-empty.
/// - Route keys are pairwise distinct.
/// - Every route name is one of `route_names`.
///
/// [`NavState::new`] and [`NavState::validate`] check these. States are
/// treated as immutable values: every `with_*` method returns a new state and
/// leaves `self` untouched, and nested states are shared through [`Rc`] so an
/// unchanged subtree keeps its identity across updates.
#[derive(Clone, Debug, PartialEq)]
pub struct NavState {
    /// Key of this state and of the navigator that owns it.
    pub key: StateKey,
    /// Index of the focused route.
    pub index: usize,
    /// Names this navigator can show, in declaration order.
    pub route_names: Vec<String>,
    /// Routes currently in the state.
    pub routes: Vec<Route>,
    /// Whether the state was produced outside its router and may need rehydration.
    pub stale: bool,
}

impl NavState {
    /// Build and validate a state.
    pub fn new(
        key: StateKey,
        route_names: Vec<String>,
        routes: Vec<Route>,
        index: usize,
    ) -> Result<Self, StateError> {
        let state = Self {
            key,
            index,
            route_names,
            routes,
            stale: false,
        };
        state.validate()?;
        Ok(state)
    }

    /// Check the state's invariants.
    pub fn validate(&self) -> Result<(), StateError> {
        if self.route_names.is_empty() {
            return Err(StateError::EmptyRouteNames);
        }
        if !self.routes.is_empty() && self.index >= self.routes.len() {
            return Err(StateError::IndexOutOfBounds {
                index: self.index,
                len: self.routes.len(),
            });
        }
        let mut seen = BTreeSet::new();
        for route in &self.routes {
            if !seen.insert(&route.key) {
                return Err(StateError::DuplicateRouteKey(route.key.clone()));
            }
            if !self.has_route_name(&route.name) {
                return Err(StateError::UnknownRouteName(route.name.clone()));
            }
        }
        Ok(())
    }

    /// True if `name` is one of this navigator's route names.
    pub fn has_route_name(&self, name: &str) -> bool {
        self.route_names.iter().any(|n| n == name)
    }

    /// The focused route, if any.
    pub fn focused_route(&self) -> Option<&Route> {
        self.routes.get(self.index)
    }

    /// Look up a route by key.
    pub fn route(&self, key: &RouteKey) -> Option<&Route> {
        self.routes.iter().find(|r| &r.key == key)
    }

    /// Position of the route with the given key.
    pub fn route_index(&self, key: &RouteKey) -> Option<usize> {
        self.routes.iter().position(|r| &r.key == key)
    }

    /// Position of the first route with the given name.
    pub fn position_of_name(&self, name: &str) -> Option<usize> {
        self.routes.iter().position(|r| r.name == name)
    }

    /// Nested state stored under the given route.
    pub fn nested(&self, key: &RouteKey) -> Option<&Rc<Self>> {
        self.route(key).and_then(|r| r.state.as_ref())
    }

    /// A copy of this state focused on `index`.
    #[must_use]
    pub fn with_index(&self, index: usize) -> Self {
        Self {
            index,
            ..self.clone()
        }
    }

    /// A copy of this state with a new route list and index.
    #[must_use]
    pub fn with_routes(&self, routes: Vec<Route>, index: usize) -> Self {
        Self {
            key: self.key.clone(),
            index,
            route_names: self.route_names.clone(),
            routes,
            stale: false,
        }
    }

    /// A copy of this state with the nested state under `key` replaced.
    ///
    /// Returns `None` if no route has that key.
    pub fn with_route_state(&self, key: &RouteKey, state: Option<Rc<Self>>) -> Option<Self> {
        let i = self.route_index(key)?;
        let mut next = self.clone();
        next.routes[i].state = state;
        Some(next)
    }

    /// A copy of this state with `params` merged into the route under `key`.
    ///
    /// Returns `None` if no route has that key.
    pub fn with_route_params(&self, key: &RouteKey, params: &Params) -> Option<Self> {
        let i = self.route_index(key)?;
        let mut next = self.clone();
        let merged = next.routes[i].params.get_or_insert_with(Params::new);
        for (k, v) in params {
            merged.insert(k.clone(), v.clone());
        }
        Some(next)
    }

    /// Root→leaf keys of focused routes, descending through nested states.
    pub fn focused_path(&self) -> Vec<RouteKey> {
        let mut out = Vec::new();
        let mut cur = self;
        while let Some(route) = cur.focused_route() {
            out.push(route.key.clone());
            match &route.state {
                Some(nested) => cur = nested,
                None => break,
            }
        }
        out
    }
}

bitflags::bitflags! {
    /// Coarse summary of what changed between two versions of one navigator's state.
    ///
    /// Computed by [`ChangeFlags::between`]; an empty set means the two states
    /// are equivalent for lifecycle purposes.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ChangeFlags: u8 {
        /// The focused index moved.
        const INDEX    = 0b0000_0001;
        /// Routes were added, removed, renamed, or reordered.
        const ROUTES   = 0b0000_0010;
        /// Parameters of a surviving route changed.
        const PARAMS   = 0b0000_0100;
        /// The nested state of a surviving route changed identity.
        const NESTED   = 0b0000_1000;
        /// The state was replaced by one with a different key.
        const REPLACED = 0b0001_0000;
    }
}

impl ChangeFlags {
    /// Compare two versions of a navigator's state.
    pub fn between(prev: &NavState, next: &NavState) -> Self {
        let mut flags = Self::empty();
        if prev.key != next.key {
            flags |= Self::REPLACED;
        }
        if prev.index != next.index {
            flags |= Self::INDEX;
        }
        let same_shape = prev.routes.len() == next.routes.len()
            && prev
                .routes
                .iter()
                .zip(&next.routes)
                .all(|(a, b)| a.key == b.key && a.name == b.name);
        if !same_shape {
            flags |= Self::ROUTES;
        }
        for route in &next.routes {
            let Some(old) = prev.route(&route.key) else {
                continue;
            };
            if old.params != route.params {
                flags |= Self::PARAMS;
            }
            let nested_same = match (&old.state, &route.state) {
                (Some(a), Some(b)) => Rc::ptr_eq(a, b),
                (None, None) => true,
                _ => false,
            };
            if !nested_same {
                flags |= Self::NESTED;
            }
        }
        flags
    }
}
