// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property tests for dispatch over a chain of nested navigators.

use std::cell::Cell;
use std::rc::Rc;

use proptest::prelude::*;
use understory_nav_state::{Action, NavState, Params, Route, Router, RouterConfig, StateKey};
use understory_navigator::{Navigator, NavigatorBuilder, StateStore, VisitedSet};

/// Handles `BUMP` (if `accepts`) by tagging its only route with its level.
struct Level {
    level: usize,
    accepts: bool,
}

impl Router for Level {
    fn initial_state(&self, config: &RouterConfig) -> NavState {
        NavState::new(
            StateKey::generate("level"),
            config.route_names.clone(),
            vec![Route::new("Slot")],
            0,
        )
        .unwrap()
    }

    fn state_for_action(&self, state: &NavState, action: &Action, _: &RouterConfig) -> Option<NavState> {
        if !self.accepts || !action.is("BUMP") {
            return None;
        }
        let mut params = Params::new();
        params.insert("bumped".to_string(), self.level.to_string());
        state.with_route_params(&state.routes[0].key, &params)
    }

    fn can_go_back(&self, _: &NavState) -> bool {
        false
    }
}

/// Mount one navigator per entry, each nested in the previous one's only route.
fn chain(accepts: &[bool]) -> (Rc<StateStore>, Vec<Navigator>) {
    let store = Rc::new(StateStore::new());
    let mut navs: Vec<Navigator> = Vec::new();
    for (level, &accepts) in accepts.iter().enumerate() {
        let builder =
            NavigatorBuilder::new(Level { level, accepts }).config(RouterConfig::new(["Slot"]));
        let nav = match navs.last() {
            None => builder.mount_root(store.clone()).unwrap(),
            Some(parent) => {
                let slot = parent.state().routes[0].key.clone();
                builder.mount_nested(parent, &slot).unwrap()
            }
        };
        navs.push(nav);
    }
    (store, navs)
}

/// Ancestors first (nearest first), then descendants (nearest first).
fn expected_handler(accepts: &[bool], start: usize) -> Option<usize> {
    (0..=start)
        .rev()
        .chain(start + 1..accepts.len())
        .find(|&i| accepts[i])
}

fn bumped(nav: &Navigator) -> bool {
    nav.state().routes[0]
        .params
        .as_ref()
        .is_some_and(|p| p.contains_key("bumped"))
}

proptest! {
    #[test]
    fn dispatch_terminates_and_handles_at_most_once(
        (accepts, start) in prop::collection::vec(any::<bool>(), 1..8)
            .prop_flat_map(|a| {
                let len = a.len();
                (Just(a), 0..len)
            })
    ) {
        let (store, navs) = chain(&accepts);
        let commits = Rc::new(Cell::new(0_u32));
        let c = commits.clone();
        store.subscribe(move |_, _| c.set(c.get() + 1));

        let mut visited = VisitedSet::new();
        let handled = navs[start].on_action(&Action::new("BUMP"), &mut visited);
        let expected = expected_handler(&accepts, start);

        prop_assert_eq!(handled, expected.is_some());
        prop_assert!(visited.len() <= navs.len());
        prop_assert_eq!(commits.get(), u32::from(handled));

        let tagged: Vec<usize> = (0..navs.len()).filter(|&i| bumped(&navs[i])).collect();
        prop_assert_eq!(tagged, expected.into_iter().collect::<Vec<_>>());
        if !handled {
            prop_assert_eq!(visited.len(), navs.len());
        }
    }

    #[test]
    fn unknown_actions_leave_root_untouched(depth in 1_usize..8) {
        let (store, navs) = chain(&vec![true; depth]);
        let before = store.get_state().unwrap();
        for nav in &navs {
            nav.helpers().dispatch(Action::new("NOT_A_BUMP"));
        }
        prop_assert!(Rc::ptr_eq(&before, &store.get_state().unwrap()));
    }
}
