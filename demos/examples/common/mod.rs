// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Toy routers shared by the demos.

#![allow(dead_code, reason = "each demo uses a subset")]

use understory_nav_state::{
    Action, ActionCreators, NavState, Payload, Route, Router, RouterConfig, StateKey, base,
    base_state_for_action,
};

/// Install a `RUST_LOG`-driven subscriber so dispatch traces are visible.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .with_target(false)
        .init();
}

fn route_named(action: &Action) -> Option<&str> {
    match &action.payload {
        Payload::Route { name, .. } => Some(name.as_str()),
        _ => None,
    }
}

/// Push on `NAVIGATE`, pop on `GO_BACK` or `POP`.
pub struct StackRouter;

impl Router for StackRouter {
    fn kind(&self) -> &'static str {
        "stack"
    }

    fn initial_state(&self, config: &RouterConfig) -> NavState {
        let first = config.initial_route().unwrap_or("Home");
        NavState::new(
            StateKey::generate("stack"),
            config.route_names.clone(),
            vec![Route::new(first).with_params(config.params_for(first))],
            0,
        )
        .expect("initial stack state is valid")
    }

    fn state_for_action(&self, state: &NavState, action: &Action, config: &RouterConfig) -> Option<NavState> {
        match &*action.kind {
            base::NAVIGATE => {
                let name = route_named(action)?;
                if !state.has_route_name(name) {
                    return None;
                }
                let mut routes = state.routes.clone();
                let params = action.payload.params().cloned().or_else(|| config.params_for(name));
                routes.push(Route::new(name).with_params(params));
                let index = routes.len() - 1;
                Some(state.with_routes(routes, index))
            }
            base::GO_BACK | "POP" => {
                let count = match action.payload {
                    Payload::Count(n) => n,
                    _ => 1,
                };
                if count == 0 || state.routes.len() <= count {
                    return None;
                }
                let mut routes = state.routes.clone();
                routes.truncate(routes.len() - count);
                let index = routes.len() - 1;
                Some(state.with_routes(routes, index))
            }
            _ => base_state_for_action(state, action, config),
        }
    }

    fn can_go_back(&self, state: &NavState) -> bool {
        state.routes.len() > 1
    }

    fn action_creators(&self) -> ActionCreators {
        ActionCreators::new().with("pop", |p| Action::new("POP").with_payload(p))
    }
}

/// One route per name; `NAVIGATE` and `JUMP_TO` switch tabs, `GO_BACK` returns to the first tab.
pub struct TabRouter;

impl Router for TabRouter {
    fn kind(&self) -> &'static str {
        "tabs"
    }

    fn initial_state(&self, config: &RouterConfig) -> NavState {
        let routes: Vec<Route> = config
            .route_names
            .iter()
            .map(|n| Route::new(n.as_str()).with_params(config.params_for(n)))
            .collect();
        let index = config
            .initial_route()
            .and_then(|n| routes.iter().position(|r| r.name == n))
            .unwrap_or(0);
        NavState::new(StateKey::generate("tabs"), config.route_names.clone(), routes, index)
            .expect("initial tab state is valid")
    }

    fn state_for_action(&self, state: &NavState, action: &Action, config: &RouterConfig) -> Option<NavState> {
        match &*action.kind {
            base::NAVIGATE | "JUMP_TO" => {
                let index = state.position_of_name(route_named(action)?)?;
                (index != state.index).then(|| state.with_index(index))
            }
            base::GO_BACK if state.index != 0 => Some(state.with_index(0)),
            _ => base_state_for_action(state, action, config),
        }
    }

    fn can_go_back(&self, state: &NavState) -> bool {
        state.index != 0
    }

    fn action_creators(&self) -> ActionCreators {
        ActionCreators::new()
            .with("jumpTo", |p| Action::new("JUMP_TO").with_payload(p))
            // Shadowed by the baseline `goBack`.
            .with("goBack", |_| Action::new("TAB_BACK"))
    }
}

/// Print a state tree, one route per line, marking the focused path.
pub fn print_tree(state: &NavState) {
    fn walk(state: &NavState, depth: usize) {
        for (i, route) in state.routes.iter().enumerate() {
            let mark = if i == state.index { '*' } else { ' ' };
            let params = route
                .params
                .as_ref()
                .map(|p| format!(" {p:?}"))
                .unwrap_or_default();
            println!("{:indent$}{mark} {} [{}]{params}", "", route.name, route.key, indent = depth * 2);
            if let Some(nested) = &route.state {
                walk(nested, depth + 1);
            }
        }
    }
    println!("{} ({} routes)", state.key, state.routes.len());
    walk(state, 1);
}
