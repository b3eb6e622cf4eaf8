// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Actions and the baseline action creators every navigator exposes.
//!
//! ## Overview
//!
//! An [`Action`] is an immutable request for a navigation change. It carries a
//! string `kind`, a [`Payload`], an optional `target` navigator, and an
//! optional `source` route. Routers decide what an action means; the
//! dispatcher only uses `target` to skip navigators the action is not
//! addressed to.
//!
//! The [`base`] module holds the creators shared by every navigator kind:
//! `goBack`, `navigate`, `replace`, `reset`, and `setParams`.

use alloc::borrow::Cow;
use alloc::rc::Rc;
use alloc::string::String;

use crate::types::{NavState, Params, RouteKey, StateKey};

/// Data carried by an [`Action`].
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Payload {
    /// No data.
    #[default]
    None,
    /// A route addressed by name, with an optional explicit key.
    Route {
        /// Route name.
        name: String,
        /// Key to use (or to match) for the route.
        key: Option<RouteKey>,
        /// Parameters for the route.
        params: Option<Params>,
    },
    /// A route addressed by key only.
    Key {
        /// Key of an existing route.
        key: RouteKey,
        /// Parameters to merge.
        params: Option<Params>,
    },
    /// Bare parameters.
    Params(Params),
    /// A complete replacement state.
    State(Rc<NavState>),
    /// A count, for example how many routes to pop.
    Count(usize),
}

impl Payload {
    /// A route payload by name, without parameters.
    pub fn route(name: impl Into<String>) -> Self {
        Self::Route {
            name: name.into(),
            key: None,
            params: None,
        }
    }

    /// A route payload by name, with parameters.
    pub fn route_with(name: impl Into<String>, params: Params) -> Self {
        Self::Route {
            name: name.into(),
            key: None,
            params: Some(params),
        }
    }

    /// Parameters carried by the payload, if any.
    pub fn params(&self) -> Option<&Params> {
        match self {
            Self::Route { params, .. } | Self::Key { params, .. } => params.as_ref(),
            Self::Params(p) => Some(p),
            Self::None | Self::State(_) | Self::Count(_) => None,
        }
    }
}

/// An immutable navigation request.
#[derive(Clone, Debug, PartialEq)]
pub struct Action {
    /// Action kind, e.g. `"NAVIGATE"`.
    pub kind: Cow<'static, str>,
    /// Kind-specific data.
    pub payload: Payload,
    /// Only the navigator with this key may handle the action.
    pub target: Option<StateKey>,
    /// Route the action originates from.
    pub source: Option<RouteKey>,
}

impl Action {
    /// An action of the given kind with no payload.
    pub fn new(kind: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind: kind.into(),
            payload: Payload::None,
            target: None,
            source: None,
        }
    }

    /// Set the payload.
    #[must_use]
    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = payload;
        self
    }

    /// Address the action to one navigator.
    #[must_use]
    pub fn with_target(mut self, target: StateKey) -> Self {
        self.target = Some(target);
        self
    }

    /// Record the originating route.
    #[must_use]
    pub fn with_source(mut self, source: RouteKey) -> Self {
        self.source = Some(source);
        self
    }

    /// True if the action is of the given kind.
    pub fn is(&self, kind: &str) -> bool {
        self.kind == kind
    }

    /// True if a navigator with `key` may handle this action.
    pub fn may_target(&self, key: &StateKey) -> bool {
        self.target.as_ref().is_none_or(|t| t == key)
    }
}

/// Baseline action kinds and creators shared by every navigator.
pub mod base {
    use super::{Action, Payload};

    /// Go back in the focused navigator.
    pub const GO_BACK: &str = "GO_BACK";
    /// Navigate to a route by name or key.
    pub const NAVIGATE: &str = "NAVIGATE";
    /// Replace the source (or focused) route.
    pub const REPLACE: &str = "REPLACE";
    /// Replace the whole state.
    pub const RESET: &str = "RESET";
    /// Merge parameters into the source (or focused) route.
    pub const SET_PARAMS: &str = "SET_PARAMS";

    /// Operation names of the baseline set, in insertion order.
    pub const NAMES: [&str; 5] = ["goBack", "navigate", "replace", "reset", "setParams"];

    /// `goBack`: the payload is ignored.
    pub fn go_back(_: Payload) -> Action {
        Action::new(GO_BACK)
    }

    /// `navigate`: expects [`Payload::Route`] or [`Payload::Key`].
    pub fn navigate(payload: Payload) -> Action {
        Action::new(NAVIGATE).with_payload(payload)
    }

    /// `replace`: expects [`Payload::Route`].
    pub fn replace(payload: Payload) -> Action {
        Action::new(REPLACE).with_payload(payload)
    }

    /// `reset`: expects [`Payload::State`].
    pub fn reset(payload: Payload) -> Action {
        Action::new(RESET).with_payload(payload)
    }

    /// `setParams`: expects [`Payload::Params`].
    pub fn set_params(payload: Payload) -> Action {
        Action::new(SET_PARAMS).with_payload(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn navigate_carries_route_payload() {
        let action = base::navigate(Payload::route("Profile"));
        assert!(action.is(base::NAVIGATE));
        assert_eq!(
            action.payload,
            Payload::Route {
                name: "Profile".to_string(),
                key: None,
                params: None,
            }
        );
    }

    #[test]
    fn go_back_ignores_payload() {
        assert_eq!(base::go_back(Payload::Count(3)), Action::new(base::GO_BACK));
    }

    #[test]
    fn target_filter() {
        let a = Action::new("X");
        assert!(a.may_target(&StateKey::new("any")));
        let a = a.with_target(StateKey::new("tabs"));
        assert!(a.may_target(&StateKey::new("tabs")));
        assert!(!a.may_target(&StateKey::new("stack")));
    }

    #[test]
    fn payload_params_lookup() {
        let mut p = Params::new();
        p.insert("id".to_string(), "7".to_string());
        assert_eq!(Payload::route_with("A", p.clone()).params(), Some(&p));
        assert_eq!(Payload::Params(p.clone()).params(), Some(&p));
        assert_eq!(Payload::Count(1).params(), None);
    }
}
