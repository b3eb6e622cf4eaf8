// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lifecycle notifications published after each commit.
//!
//! The root navigator observes its store. For every commit it:
//!
//! 1. emits [`kind::STATE`] on each mounted navigator whose slice changed
//!    identity, parents before children. A slice that appeared or vanished
//!    reports [`ChangeFlags::REPLACED`];
//! 2. compares the focused path with the one of the previous commit. Routes
//!    below the shared prefix get [`kind::BLUR`], deepest first, and routes
//!    of the new path below it get [`kind::FOCUS`], shallowest first. Each
//!    event targets its route and goes out on the emitter of the navigator
//!    showing that route.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;

use understory_nav_state::{ChangeFlags, NavState, RouteKey};

use crate::events::{Event, EventData, ListenerId, kind};
use crate::navigator::NavigatorInner;

/// Subscribe `root` to its store's commits.
pub(crate) fn observe(root: &Rc<NavigatorInner>) -> ListenerId {
    let focused = RefCell::new(
        root.store()
            .committed()
            .map(|s| s.focused_path())
            .unwrap_or_default(),
    );
    let weak = Rc::downgrade(root);
    root.store().subscribe(move |prev, next| {
        let Some(root) = weak.upgrade() else {
            return;
        };
        notify_state(&root, prev, next);

        let path = next.map(|s| s.focused_path()).unwrap_or_default();
        // Swap before emitting; listeners may dispatch and commit again.
        let old: Vec<RouteKey> = focused.replace(path.clone());
        let shared = shared_prefix(&old, &path);
        for depth in (shared..old.len()).rev() {
            deliver(&root, kind::BLUR, &old, depth);
        }
        for depth in shared..path.len() {
            deliver(&root, kind::FOCUS, &path, depth);
        }
    })
}

/// Number of leading routes the two paths have in common.
fn shared_prefix(a: &[RouteKey], b: &[RouteKey]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

/// Emit `event_kind` for `path[depth]` on the navigator that shows it.
fn deliver(root: &Rc<NavigatorInner>, event_kind: &'static str, path: &[RouteKey], depth: usize) {
    let route = &path[depth];
    match owner(root, &path[..depth]) {
        Some(nav) => {
            nav.emitter()
                .emit(&Event::new(event_kind).with_target(route.clone()));
        }
        None => tracing::trace!(route = %route, "no navigator owns route"),
    }
}

fn notify_state(nav: &NavigatorInner, prev: Option<&Rc<NavState>>, next: Option<&Rc<NavState>>) {
    let changes = match (prev, next) {
        (None, None) => return,
        (Some(p), Some(n)) if Rc::ptr_eq(p, n) => return,
        (Some(p), Some(n)) => ChangeFlags::between(p, n),
        _ => ChangeFlags::REPLACED,
    };
    nav.emitter()
        .emit(&Event::new(kind::STATE).with_data(EventData::Changes(changes)));
    for child in nav.children() {
        let Some(route) = child.route() else {
            continue;
        };
        notify_state(
            &child,
            prev.and_then(|p| p.nested(route)),
            next.and_then(|n| n.nested(route)),
        );
    }
}

/// Navigator reached from `root` by descending through `ancestors`.
fn owner(root: &Rc<NavigatorInner>, ancestors: &[RouteKey]) -> Option<Rc<NavigatorInner>> {
    let mut nav = root.clone();
    for route in ancestors {
        nav = nav.child_at(route)?;
    }
    Some(nav)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(names: &[&str]) -> Vec<RouteKey> {
        names.iter().map(|n| RouteKey::new(*n)).collect()
    }

    #[test]
    fn shared_prefix_stops_at_first_difference() {
        let feed = keys(&["home", "feed", "post"]);
        assert_eq!(shared_prefix(&feed, &keys(&["home", "profile"])), 1);
        assert_eq!(shared_prefix(&feed, &feed), 3);
        assert_eq!(shared_prefix(&feed, &keys(&["details"])), 0);
        assert_eq!(shared_prefix(&feed, &[]), 0);
        assert_eq!(shared_prefix(&keys(&["home"]), &feed), 1);
    }
}
