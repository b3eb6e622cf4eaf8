// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_nav_state --heading-base-level=0

//! Understory Nav State: immutable navigation state trees and the router contract.
//!
//! This crate holds the data side of nested navigation: the state each navigator owns,
//! the actions that request changes, and the [`Router`] trait that container kinds
//! (stack, tab, drawer, …) implement.
//! It does not dispatch anything; see `understory_navigator` for the dispatcher,
//! transactions, events, and helper facades built on top of these types.
//!
//! ## State tree
//!
//! - [`NavState`]: one navigator's routes, focused index, and allowed route names.
//! - [`Route`]: a keyed, named route with optional params and optional nested state.
//! - Nested states are shared through `Rc`, so an update rebuilds only the spine from
//!   the changed navigator up to the root; siblings keep their identity.
//! - [`ChangeFlags`] summarizes what changed between two versions of a state.
//!
//! ## Router contract
//!
//! - [`Router::initial_state`] builds a state on mount.
//! - [`Router::state_for_action`] returns `Some(new_state)` or `None` for "not handled here".
//! - [`Router::can_go_back`] is a pure predicate.
//! - [`Router::action_creators`] lists kind-specific operations; the baseline set
//!   ([`ActionCreators::baseline`]) always shadows names it shares with them.
//!
//! ## Minimal usage
//!
//! ```
//! use understory_nav_state::{
//!     Action, NavState, Route, Router, RouterConfig, StateKey, base_state_for_action,
//! };
//!
//! /// Shows exactly one route and never goes back.
//! struct Single;
//!
//! impl Router for Single {
//!     fn initial_state(&self, config: &RouterConfig) -> NavState {
//!         let name = config.initial_route().unwrap_or("Home");
//!         NavState::new(
//!             StateKey::generate("single"),
//!             config.route_names.clone(),
//!             vec![Route::new(name)],
//!             0,
//!         )
//!         .unwrap()
//!     }
//!
//!     fn state_for_action(
//!         &self,
//!         state: &NavState,
//!         action: &Action,
//!         config: &RouterConfig,
//!     ) -> Option<NavState> {
//!         base_state_for_action(state, action, config)
//!     }
//!
//!     fn can_go_back(&self, _state: &NavState) -> bool {
//!         false
//!     }
//! }
//!
//! let config = RouterConfig::new(["Home", "Settings"]);
//! let state = Single.initial_state(&config);
//! assert_eq!(state.focused_route().unwrap().name, "Home");
//! assert!(state.validate().is_ok());
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod action;
pub mod router;
pub mod types;

pub use action::{Action, Payload, base};
pub use router::{ActionCreator, ActionCreators, Router, RouterConfig, base_state_for_action};
pub use types::{ChangeFlags, NavState, Params, Route, RouteKey, StateError, StateKey};
