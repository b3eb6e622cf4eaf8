// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Toy routers for unit tests.

use alloc::string::String;
use alloc::vec::Vec;

use understory_nav_state::{
    Action, ActionCreators, NavState, Payload, Route, Router, RouterConfig, StateKey, base,
    base_state_for_action,
};

fn route_for(name: &str, config: &RouterConfig) -> Route {
    Route::new(name).with_params(config.params_for(name))
}

fn named(action: &Action) -> Option<&String> {
    match &action.payload {
        Payload::Route { name, .. } => Some(name),
        _ => None,
    }
}

/// Pushes on `NAVIGATE`, pops on `GO_BACK`.
pub(crate) struct Stack;

impl Router for Stack {
    fn kind(&self) -> &'static str {
        "stack"
    }

    fn initial_state(&self, config: &RouterConfig) -> NavState {
        let first = config.initial_route().unwrap_or_default();
        NavState::new(
            StateKey::generate("stack"),
            config.route_names.clone(),
            Vec::from([route_for(first, config)]),
            0,
        )
        .unwrap()
    }

    fn state_for_action(&self, state: &NavState, action: &Action, config: &RouterConfig) -> Option<NavState> {
        match &*action.kind {
            base::NAVIGATE => {
                let name = named(action)?;
                if !state.has_route_name(name) {
                    return None;
                }
                let mut routes = state.routes.clone();
                routes.push(route_for(name, config).with_params(action.payload.params().cloned()));
                let index = routes.len() - 1;
                Some(state.with_routes(routes, index))
            }
            base::GO_BACK if state.routes.len() > 1 => {
                let mut routes = state.routes.clone();
                routes.pop();
                let index = routes.len() - 1;
                Some(state.with_routes(routes, index))
            }
            _ => base_state_for_action(state, action, config),
        }
    }

    fn can_go_back(&self, state: &NavState) -> bool {
        state.routes.len() > 1
    }
}

/// One route per name; `NAVIGATE`/`JUMP_TO` switch the index.
pub(crate) struct Tabs;

impl Router for Tabs {
    fn kind(&self) -> &'static str {
        "tabs"
    }

    fn initial_state(&self, config: &RouterConfig) -> NavState {
        let routes: Vec<Route> = config
            .route_names
            .iter()
            .map(|n| route_for(n, config))
            .collect();
        let index = config
            .initial_route()
            .and_then(|n| routes.iter().position(|r| r.name == n))
            .unwrap_or(0);
        NavState::new(
            StateKey::generate("tabs"),
            config.route_names.clone(),
            routes,
            index,
        )
        .unwrap()
    }

    fn state_for_action(&self, state: &NavState, action: &Action, config: &RouterConfig) -> Option<NavState> {
        match &*action.kind {
            base::NAVIGATE | "JUMP_TO" => {
                let index = state.position_of_name(named(action)?)?;
                Some(state.with_index(index))
            }
            base::GO_BACK if state.index != 0 => Some(state.with_index(0)),
            _ => base_state_for_action(state, action, config),
        }
    }

    fn can_go_back(&self, state: &NavState) -> bool {
        state.index != 0
    }

    fn action_creators(&self) -> ActionCreators {
        ActionCreators::new().with("jumpTo", |p| Action::new("JUMP_TO").with_payload(p))
    }
}

/// Declines everything.
pub(crate) struct Inert;

impl Router for Inert {
    fn initial_state(&self, config: &RouterConfig) -> NavState {
        Tabs.initial_state(config)
    }

    fn state_for_action(&self, _: &NavState, _: &Action, _: &RouterConfig) -> Option<NavState> {
        None
    }

    fn can_go_back(&self, _: &NavState) -> bool {
        false
    }
}
