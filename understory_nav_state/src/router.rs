// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The router contract bound to each navigator.
//!
//! ## Overview
//!
//! A [`Router`] is the container-kind specific part of a navigator: it builds
//! the initial state, maps `(state, action)` to a new state, answers whether
//! the navigator can go back, and lists the operations the kind adds on top of
//! the baseline set.
//!
//! ## Contract
//!
//! - [`Router::state_for_action`] is pure: deterministic on its inputs, no
//!   side effects, and returns `None` when the action does not apply.
//! - It never mutates its input; a changed state is a new value.
//! - [`Router::can_go_back`] is a pure predicate over the state.
//!
//! Violating the contract is not detected by the dispatcher.
//!
//! ## Baseline transitions
//!
//! [`base_state_for_action`] implements `SET_PARAMS`, `RESET`, and `REPLACE`
//! the same way for every kind; routers usually fall back to it after trying
//! their own actions.

use alloc::borrow::Cow;
use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::action::{Action, Payload, base};
use crate::types::{NavState, Params, Route, RouteKey};

/// Builds an [`Action`] from operation arguments.
pub type ActionCreator = Rc<dyn Fn(Payload) -> Action>;

/// Ordered table of named action creators.
///
/// Inserting a name that is already present replaces its creator in place,
/// so later insertions win ties while the original order is kept.
#[derive(Clone, Default)]
pub struct ActionCreators {
    entries: Vec<(Cow<'static, str>, ActionCreator)>,
}

impl fmt::Debug for ActionCreators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|(name, _)| name))
            .finish()
    }
}

impl ActionCreators {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// The baseline creators shared by every navigator.
    pub fn baseline() -> Self {
        Self::new()
            .with("goBack", base::go_back)
            .with("navigate", base::navigate)
            .with("replace", base::replace)
            .with("reset", base::reset)
            .with("setParams", base::set_params)
    }

    /// Builder-style [`ActionCreators::insert`].
    #[must_use]
    pub fn with(
        mut self,
        name: impl Into<Cow<'static, str>>,
        creator: impl Fn(Payload) -> Action + 'static,
    ) -> Self {
        self.insert(name, Rc::new(creator));
        self
    }

    /// Insert or replace a creator.
    pub fn insert(&mut self, name: impl Into<Cow<'static, str>>, creator: ActionCreator) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = creator,
            None => self.entries.push((name, creator)),
        }
    }

    /// Insert every entry of `other`; entries of `other` win ties.
    pub fn extend_from(&mut self, other: &Self) {
        for (name, creator) in &other.entries {
            self.insert(name.clone(), creator.clone());
        }
    }

    /// Look up a creator.
    pub fn get(&self, name: &str) -> Option<&ActionCreator> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, creator)| creator)
    }

    /// Iterate names and creators in table order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ActionCreator)> {
        self.entries.iter().map(|(n, c)| (&**n, c))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Static configuration of a navigator, passed to every router call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RouterConfig {
    /// Route names the navigator can show, in declaration order.
    pub route_names: Vec<String>,
    /// Route focused initially; defaults to the first route name.
    pub initial_route_name: Option<String>,
    /// Initial parameters per route name.
    pub initial_params: BTreeMap<String, Params>,
}

impl RouterConfig {
    /// Create a configuration for the given route names.
    pub fn new<I, S>(route_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            route_names: route_names.into_iter().map(Into::into).collect(),
            initial_route_name: None,
            initial_params: BTreeMap::new(),
        }
    }

    /// Set the initially focused route.
    pub fn set_initial_route_name(&mut self, name: Option<String>) {
        self.initial_route_name = name;
    }

    /// Builder-style [`RouterConfig::set_initial_route_name`].
    #[must_use]
    pub fn with_initial_route(mut self, name: impl Into<String>) -> Self {
        self.set_initial_route_name(Some(name.into()));
        self
    }

    /// Set initial parameters for a route name.
    #[must_use]
    pub fn with_initial_params(mut self, name: impl Into<String>, params: Params) -> Self {
        self.initial_params.insert(name.into(), params);
        self
    }

    /// The initial route name: the configured one, else the first route name.
    pub fn initial_route(&self) -> Option<&str> {
        self.initial_route_name
            .as_deref()
            .or_else(|| self.route_names.first().map(String::as_str))
    }

    /// Initial parameters for a route name.
    pub fn params_for(&self, name: &str) -> Option<Params> {
        self.initial_params.get(name).cloned()
    }

    /// True if `name` is a configured route name.
    pub fn contains(&self, name: &str) -> bool {
        self.route_names.iter().any(|n| n == name)
    }
}

/// Container-kind specific navigation logic.
///
/// Routers are stateless; one instance is bound to each navigator and may be
/// shared between navigators of the same kind.
pub trait Router {
    /// Short name of the container kind, used in traces.
    fn kind(&self) -> &'static str {
        "custom"
    }

    /// Build the state of a freshly mounted navigator.
    fn initial_state(&self, config: &RouterConfig) -> NavState;

    /// Compute the state after `action`, or `None` if the action does not apply.
    fn state_for_action(
        &self,
        state: &NavState,
        action: &Action,
        config: &RouterConfig,
    ) -> Option<NavState>;

    /// True if this navigator can handle a back action in `state`.
    fn can_go_back(&self, state: &NavState) -> bool;

    /// Kind-specific operations. Baseline names listed here are shadowed.
    fn action_creators(&self) -> ActionCreators {
        ActionCreators::new()
    }
}

/// Kind-independent transitions: `SET_PARAMS`, `RESET`, and `REPLACE`.
///
/// - `SET_PARAMS` merges [`Payload::Params`] into the `source` route, or the
///   focused route when the action has no source.
/// - `RESET` adopts a [`Payload::State`] whose route names are all allowed.
///   The result keeps this navigator's key and route names.
/// - `REPLACE` swaps the `source` (or focused) route for a new route named by
///   [`Payload::Route`], keeping the focused index.
///
/// Returns `None` for every other action, and when the payload does not fit.
pub fn base_state_for_action(
    state: &NavState,
    action: &Action,
    config: &RouterConfig,
) -> Option<NavState> {
    match &*action.kind {
        base::SET_PARAMS => {
            let Payload::Params(params) = &action.payload else {
                return None;
            };
            let key = source_or_focused(state, action)?;
            state.with_route_params(&key, params)
        }
        base::RESET => {
            let Payload::State(next) = &action.payload else {
                return None;
            };
            if next.routes.iter().any(|r| !state.has_route_name(&r.name)) {
                return None;
            }
            let mut out = NavState::clone(next);
            out.key = state.key.clone();
            out.route_names = state.route_names.clone();
            out.stale = false;
            out.validate().ok()?;
            Some(out)
        }
        base::REPLACE => {
            let Payload::Route { name, key, params } = &action.payload else {
                return None;
            };
            if !state.has_route_name(name) {
                return None;
            }
            let at = match &action.source {
                Some(source) => state.route_index(source)?,
                None => state.index,
            };
            let mut routes = state.routes.clone();
            let slot = routes.get_mut(at)?;
            *slot = Route::with_key(
                key.clone().unwrap_or_else(|| RouteKey::generate(name)),
                name.clone(),
            )
            .with_params(params.clone().or_else(|| config.params_for(name)));
            Some(state.with_routes(routes, state.index))
        }
        _ => None,
    }
}

fn source_or_focused(state: &NavState, action: &Action) -> Option<RouteKey> {
    match &action.source {
        Some(source) => Some(source.clone()),
        None => state.focused_route().map(|r| r.key.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StateKey;
    use alloc::string::ToString;
    use alloc::vec;

    fn config() -> RouterConfig {
        RouterConfig::new(["Home", "Profile", "Settings"])
    }

    fn state() -> NavState {
        NavState::new(
            StateKey::new("stack"),
            config().route_names,
            vec![
                Route::with_key(RouteKey::new("home"), "Home"),
                Route::with_key(RouteKey::new("profile"), "Profile"),
            ],
            1,
        )
        .unwrap()
    }

    #[test]
    fn baseline_table_order_and_names() {
        let table = ActionCreators::baseline();
        let names: Vec<&str> = table.iter().map(|(n, _)| n).collect();
        assert_eq!(names, base::NAMES.to_vec());
    }

    #[test]
    fn later_insert_wins_and_keeps_position() {
        let mut table = ActionCreators::new()
            .with("goBack", |_| Action::new("CUSTOM_BACK"))
            .with("jumpTo", |p| Action::new("JUMP_TO").with_payload(p));
        table.extend_from(&ActionCreators::baseline());
        assert_eq!(table.iter().next().map(|(n, _)| n), Some("goBack"));
        let back = table.get("goBack").unwrap();
        assert_eq!(back(Payload::None), Action::new(base::GO_BACK));
        assert!(table.get("jumpTo").is_some());
        assert_eq!(table.len(), 6);
    }

    #[test]
    fn initial_route_defaults_to_first_name() {
        assert_eq!(config().initial_route(), Some("Home"));
        assert_eq!(
            config().with_initial_route("Settings").initial_route(),
            Some("Settings")
        );
        assert_eq!(RouterConfig::default().initial_route(), None);
    }

    #[test]
    fn set_params_targets_source_then_focused() {
        let mut p = Params::new();
        p.insert("id".to_string(), "42".to_string());
        let focused =
            base_state_for_action(&state(), &base::set_params(Payload::Params(p.clone())), &config())
                .unwrap();
        assert_eq!(focused.routes[1].params.as_ref(), Some(&p));

        let sourced = base_state_for_action(
            &state(),
            &base::set_params(Payload::Params(p.clone())).with_source(RouteKey::new("home")),
            &config(),
        )
        .unwrap();
        assert_eq!(sourced.routes[0].params.as_ref(), Some(&p));
        assert!(sourced.routes[1].params.is_none());
    }

    #[test]
    fn reset_keeps_navigator_key_and_rejects_unknown_names() {
        let mut other = state().with_index(0);
        other.key = StateKey::new("elsewhere");
        let next = base_state_for_action(
            &state(),
            &base::reset(Payload::State(Rc::new(other))),
            &config(),
        )
        .unwrap();
        assert_eq!(next.key, StateKey::new("stack"));
        assert_eq!(next.index, 0);

        let mut bad = state();
        bad.routes.push(Route::new("Nowhere"));
        assert!(
            base_state_for_action(&state(), &base::reset(Payload::State(Rc::new(bad))), &config())
                .is_none()
        );
    }

    #[test]
    fn replace_swaps_focused_route() {
        let next =
            base_state_for_action(&state(), &base::replace(Payload::route("Settings")), &config())
                .unwrap();
        assert_eq!(next.routes.len(), 2);
        assert_eq!(next.routes[1].name, "Settings");
        assert_eq!(next.index, 1);
        assert!(
            base_state_for_action(&state(), &base::replace(Payload::route("Nope")), &config())
                .is_none()
        );
    }

    #[test]
    fn unknown_actions_are_not_handled() {
        assert!(base_state_for_action(&state(), &Action::new("JUMP_TO"), &config()).is_none());
        assert!(base_state_for_action(&state(), &base::go_back(Payload::None), &config()).is_none());
    }
}
