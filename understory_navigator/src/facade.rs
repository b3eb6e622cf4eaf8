// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Helper facades: the navigation API handed to screens.
//!
//! ## Overview
//!
//! A [`Facade`] blends three things:
//!
//! - the operations inherited from the parent screen's facade;
//! - this navigator's own operations: the router's action creators merged
//!   with the baseline set (`goBack`, `navigate`, `replace`, `reset`,
//!   `setParams`);
//! - `dispatch`, `emit`, `is_focused`, and `can_go_back`.
//!
//! ## Merge order
//!
//! The operation table is built in three layers, later layers winning ties:
//! inherited operations, then router operations, then baseline operations.
//! A router creator that shares a name with a baseline operation is silently
//! shadowed. Inherited operations keep dispatching through the parent's
//! dispatch, so an ancestor-only operation still reaches the ancestor.
//!
//! ## Caching
//!
//! [`FacadeBuilder::build`] returns the previous facade unchanged while its
//! dependency tuple (router, state getter, parent facade, emitter, transaction
//! coordinator, state setter, action handler) is identical by pointer.

use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use understory_nav_state::{
    Action, ActionCreator, ActionCreators, NavState, Params, Payload, RouteKey, Router,
};

use crate::dispatch::VisitedSet;
use crate::events::{Emitter, Event};
use crate::transaction::StateStore;

/// Entry point into the dispatcher: `(action, visited) -> handled`.
pub type OnAction = Rc<dyn Fn(&Action, &mut VisitedSet) -> bool>;
/// Reads the navigator's current state.
pub type GetState = Rc<dyn Fn() -> Rc<NavState>>;
/// Replaces the navigator's state.
pub type SetState = Rc<dyn Fn(NavState)>;

type DispatchFn = Rc<dyn Fn(Command)>;

/// Something a screen can dispatch.
pub enum Command {
    /// Route an action through the navigator tree.
    Action(Action),
    /// Replace the navigator's state directly, bypassing routers.
    Update(Box<dyn FnOnce(&NavState) -> NavState>),
}

impl Command {
    /// Wrap a state updater.
    pub fn update(updater: impl FnOnce(&NavState) -> NavState + 'static) -> Self {
        Self::Update(Box::new(updater))
    }
}

impl From<Action> for Command {
    fn from(action: Action) -> Self {
        Self::Action(action)
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Action(action) => f.debug_tuple("Action").field(action).finish(),
            Self::Update(_) => f.debug_tuple("Update").finish_non_exhaustive(),
        }
    }
}

/// Errors reported by [`Facade::invoke`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FacadeError {
    /// No operation with that name is available on this facade.
    #[error("no navigation operation named `{0}`")]
    UnknownOperation(String),
}

/// Inputs a navigator provides to build its facade.
#[derive(Clone)]
pub struct HelperOptions {
    /// Dispatcher entry point for this navigator.
    pub on_action: OnAction,
    /// Reads this navigator's state.
    pub get_state: GetState,
    /// Replaces this navigator's state.
    pub set_state: SetState,
    /// This navigator's event channel.
    pub emitter: Emitter,
    /// Router bound to this navigator.
    pub router: Rc<dyn Router>,
}

impl fmt::Debug for HelperOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HelperOptions")
            .field("router", &self.router.kind())
            .field("emitter", &self.emitter)
            .finish_non_exhaustive()
    }
}

/// A named operation: builds an action and dispatches it.
#[derive(Clone)]
pub struct Operation {
    creator: ActionCreator,
    dispatch: DispatchFn,
    local: bool,
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("local", &self.local)
            .finish_non_exhaustive()
    }
}

impl Operation {
    /// Build the action for `args` without dispatching it.
    pub fn action(&self, args: Payload) -> Action {
        (self.creator)(args)
    }

    /// Build the action for `args` and dispatch it.
    pub fn call(&self, args: Payload) {
        (self.dispatch)(Command::Action(self.action(args)));
    }

    /// True if the operation comes from an ancestor navigator.
    pub fn is_inherited(&self) -> bool {
        !self.local
    }
}

struct FacadeInner {
    operations: Vec<(Cow<'static, str>, Operation)>,
    dispatch: DispatchFn,
    emitter: Emitter,
    is_focused: Rc<dyn Fn() -> bool>,
    can_go_back: Rc<dyn Fn() -> bool>,
    parent: Option<Facade>,
}

/// Navigation API for one screen or navigator.
///
/// Cheap to clone; clones are the same facade (see [`Facade::ptr_eq`]).
#[derive(Clone)]
pub struct Facade {
    inner: Rc<FacadeInner>,
}

impl fmt::Debug for Facade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Facade")
            .field("operations", &self.operation_names().collect::<Vec<_>>())
            .field("has_parent", &self.inner.parent.is_some())
            .finish_non_exhaustive()
    }
}

fn insert_operation(table: &mut Vec<(Cow<'static, str>, Operation)>, name: &str, op: Operation) {
    match table.iter_mut().find(|(n, _)| n == name) {
        Some(entry) => entry.1 = op,
        None => table.push((Cow::Owned(String::from(name)), op)),
    }
}

impl Facade {
    /// Dispatch an action or a state updater.
    pub fn dispatch(&self, command: impl Into<Command>) {
        (self.inner.dispatch)(command.into());
    }

    /// Publish an event on the navigator's channel.
    pub fn emit(&self, event: &Event) -> bool {
        self.inner.emitter.emit(event)
    }

    /// True if this screen (or navigator) is focused.
    pub fn is_focused(&self) -> bool {
        (self.inner.is_focused)()
    }

    /// True if this navigator or an ancestor can go back.
    pub fn can_go_back(&self) -> bool {
        (self.inner.can_go_back)()
    }

    /// The parent screen's facade, if any.
    pub fn parent(&self) -> Option<&Self> {
        self.inner.parent.as_ref()
    }

    /// Look up an operation by name.
    pub fn operation(&self, name: &str) -> Option<&Operation> {
        self.inner
            .operations
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, op)| op)
    }

    /// Names of every available operation, inherited ones first.
    pub fn operation_names(&self) -> impl Iterator<Item = &str> {
        self.inner.operations.iter().map(|(n, _)| &**n)
    }

    /// Call an operation by name.
    pub fn invoke(&self, name: &str, args: Payload) -> Result<(), FacadeError> {
        let op = self
            .operation(name)
            .ok_or_else(|| FacadeError::UnknownOperation(String::from(name)))?;
        op.call(args);
        Ok(())
    }

    /// True if both handles are the same facade.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// `goBack`.
    pub fn go_back(&self) {
        self.call_baseline("goBack", Payload::None);
    }

    /// `navigate` to a route by name.
    pub fn navigate(&self, name: &str) {
        self.call_baseline("navigate", Payload::route(name));
    }

    /// `navigate` to a route by name, with parameters.
    pub fn navigate_with(&self, name: &str, params: Params) {
        self.call_baseline("navigate", Payload::route_with(name, params));
    }

    /// `replace` the current route.
    pub fn replace(&self, name: &str) {
        self.call_baseline("replace", Payload::route(name));
    }

    /// `reset` to a new state.
    pub fn reset(&self, state: NavState) {
        self.call_baseline("reset", Payload::State(Rc::new(state)));
    }

    /// `setParams` on the current route.
    pub fn set_params(&self, params: Params) {
        self.call_baseline("setParams", Payload::Params(params));
    }

    fn call_baseline(&self, name: &str, args: Payload) {
        // Baseline names are present on every built facade.
        if let Some(op) = self.operation(name) {
            op.call(args);
        }
    }

    /// Derive the facade for one route shown by this navigator.
    ///
    /// - Actions dispatched through it carry `source = route` unless they
    ///   already name a source.
    /// - `is_focused` is true only while `route` is the focused route of a
    ///   focused navigator.
    /// - Local operations are rebound to the route's dispatch; inherited ones
    ///   are unchanged.
    pub fn for_route(&self, route: RouteKey, get_state: GetState) -> Self {
        let navigator_dispatch = self.inner.dispatch.clone();
        let source = route.clone();
        let dispatch: DispatchFn = Rc::new(move |command| match command {
            Command::Action(mut action) => {
                if action.source.is_none() {
                    action.source = Some(source.clone());
                }
                navigator_dispatch(Command::Action(action));
            }
            update @ Command::Update(_) => navigator_dispatch(update),
        });

        let operations = self
            .inner
            .operations
            .iter()
            .map(|(name, op)| {
                let op = if op.local {
                    Operation {
                        dispatch: dispatch.clone(),
                        ..op.clone()
                    }
                } else {
                    op.clone()
                };
                (name.clone(), op)
            })
            .collect();

        let navigator_focused = self.inner.is_focused.clone();
        let is_focused = Rc::new(move || {
            let state = get_state();
            state.focused_route().is_some_and(|r| r.key == route) && navigator_focused()
        });

        Self {
            inner: Rc::new(FacadeInner {
                operations,
                dispatch,
                emitter: self.inner.emitter.clone(),
                is_focused,
                can_go_back: self.inner.can_go_back.clone(),
                parent: self.inner.parent.clone(),
            }),
        }
    }
}

struct Deps {
    router: Rc<dyn Router>,
    get_state: GetState,
    parent: Option<Facade>,
    emitter: Emitter,
    transaction: Rc<StateStore>,
    set_state: SetState,
    on_action: OnAction,
}

impl Deps {
    fn same_as(&self, other: &Self) -> bool {
        let parent_same = match (&self.parent, &other.parent) {
            (Some(a), Some(b)) => a.ptr_eq(b),
            (None, None) => true,
            _ => false,
        };
        Rc::ptr_eq(&self.router, &other.router)
            && Rc::ptr_eq(&self.get_state, &other.get_state)
            && parent_same
            && self.emitter.ptr_eq(&other.emitter)
            && Rc::ptr_eq(&self.transaction, &other.transaction)
            && Rc::ptr_eq(&self.set_state, &other.set_state)
            && Rc::ptr_eq(&self.on_action, &other.on_action)
    }
}

/// Builds and caches a navigator's facade.
///
/// The parent facade and the transaction coordinator are injected here rather
/// than discovered, so a navigator's position in the tree is explicit.
pub struct FacadeBuilder {
    parent: Option<Facade>,
    transaction: Rc<StateStore>,
    cache: Option<(Deps, Facade)>,
}

impl fmt::Debug for FacadeBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FacadeBuilder")
            .field("has_parent", &self.parent.is_some())
            .field("cached", &self.cache.is_some())
            .finish_non_exhaustive()
    }
}

impl FacadeBuilder {
    /// Create a builder for a navigator under `parent` (or a root navigator).
    pub fn new(parent: Option<Facade>, transaction: Rc<StateStore>) -> Self {
        Self {
            parent,
            transaction,
            cache: None,
        }
    }

    /// Change the parent facade. The next build rebuilds if it differs.
    pub fn set_parent(&mut self, parent: Option<Facade>) {
        self.parent = parent;
    }

    /// Change the transaction coordinator. The next build rebuilds if it differs.
    pub fn set_transaction(&mut self, transaction: Rc<StateStore>) {
        self.transaction = transaction;
    }

    /// Return the facade for `options`, rebuilding only if a dependency changed.
    pub fn build(&mut self, options: &HelperOptions) -> Facade {
        let deps = Deps {
            router: options.router.clone(),
            get_state: options.get_state.clone(),
            parent: self.parent.clone(),
            emitter: options.emitter.clone(),
            transaction: self.transaction.clone(),
            set_state: options.set_state.clone(),
            on_action: options.on_action.clone(),
        };
        if let Some((cached, facade)) = &self.cache
            && cached.same_as(&deps)
        {
            return facade.clone();
        }
        tracing::trace!(router = options.router.kind(), "building navigation helpers");
        let facade = compose(options, self.parent.as_ref(), &self.transaction);
        self.cache = Some((deps, facade.clone()));
        facade
    }
}

fn compose(options: &HelperOptions, parent: Option<&Facade>, transaction: &Rc<StateStore>) -> Facade {
    let dispatch: DispatchFn = {
        let transaction = transaction.clone();
        let get_state = options.get_state.clone();
        let set_state = options.set_state.clone();
        let on_action = options.on_action.clone();
        Rc::new(move |command| {
            transaction.perform_transaction(|| match command {
                Command::Update(updater) => {
                    let current = get_state();
                    set_state(updater(current.as_ref()));
                }
                Command::Action(action) => {
                    let mut visited = VisitedSet::new();
                    if !on_action(&action, &mut visited) {
                        tracing::debug!(
                            action = %action.kind,
                            visited = visited.len(),
                            "action was not handled by any navigator"
                        );
                    }
                }
            });
        })
    };

    let mut creators = options.router.action_creators();
    creators.extend_from(&ActionCreators::baseline());

    let mut operations: Vec<(Cow<'static, str>, Operation)> = parent
        .map(|p| {
            p.inner
                .operations
                .iter()
                .map(|(name, op)| {
                    let inherited = Operation {
                        local: false,
                        ..op.clone()
                    };
                    (name.clone(), inherited)
                })
                .collect()
        })
        .unwrap_or_default();
    for (name, creator) in creators.iter() {
        let op = Operation {
            creator: creator.clone(),
            dispatch: dispatch.clone(),
            local: true,
        };
        insert_operation(&mut operations, name, op);
    }

    let is_focused: Rc<dyn Fn() -> bool> = match parent {
        Some(p) => p.inner.is_focused.clone(),
        None => Rc::new(|| true),
    };

    let can_go_back: Rc<dyn Fn() -> bool> = {
        let router = options.router.clone();
        let get_state = options.get_state.clone();
        let parent = parent.cloned();
        Rc::new(move || {
            router.can_go_back(&get_state()) || parent.as_ref().is_some_and(Facade::can_go_back)
        })
    };

    Facade {
        inner: Rc::new(FacadeInner {
            operations,
            dispatch,
            emitter: options.emitter.clone(),
            is_focused,
            can_go_back,
            parent: parent.cloned(),
        }),
    }
}
