// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Action routing across the navigator tree.
//!
//! ## Overview
//!
//! [`route_action`] decides which single container handles an action. It
//! knows nothing about container kinds: a [`Container`] only has to say what
//! its key is, whether its router takes the action, and who its parent and
//! children are.
//!
//! ## Order
//!
//! 1. A container already in the [`VisitedSet`] declines immediately.
//! 2. The container marks itself visited and, if the action is not addressed
//!    to another container, offers the action to its own router.
//! 3. Declined actions bubble to the parent with the same visited set.
//! 4. If no ancestor takes it, children are offered the action, most recently
//!    mounted first.
//!
//! Because every container is visited at most once per pass, a dispatch
//! terminates on any tree and at most one container commits a new state.

use alloc::collections::BTreeSet;
use alloc::rc::Rc;
use alloc::vec::Vec;

use understory_nav_state::{Action, StateKey};

/// Containers already offered the current action.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VisitedSet(BTreeSet<StateKey>);

impl VisitedSet {
    /// Create an empty set for a new dispatch pass.
    pub fn new() -> Self {
        Self::default()
    }

    /// True if `key` was visited in this pass.
    pub fn contains(&self, key: &StateKey) -> bool {
        self.0.contains(key)
    }

    /// Mark `key` visited. Returns false if it already was.
    pub fn insert(&mut self, key: StateKey) -> bool {
        self.0.insert(key)
    }

    /// Number of visited containers.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if nothing was visited.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Visited keys in key order.
    pub fn iter(&self) -> impl Iterator<Item = &StateKey> {
        self.0.iter()
    }
}

/// A node the dispatcher can route through.
pub trait Container: Sized {
    /// Key of the container's current state, or `None` if it is not mounted.
    fn container_key(&self) -> Option<StateKey>;

    /// Offer `action` to this container's router and commit the result.
    ///
    /// Returns true if the router produced a new state.
    fn handle_locally(&self, action: &Action) -> bool;

    /// The enclosing container, if any.
    fn parent_container(&self) -> Option<Rc<Self>>;

    /// Mounted child containers, in mount order.
    fn child_containers(&self) -> Vec<Rc<Self>>;
}

/// Route `action` starting at `container`. Returns true if some container handled it.
pub fn route_action<C: Container>(container: &C, action: &Action, visited: &mut VisitedSet) -> bool {
    let Some(key) = container.container_key() else {
        return false;
    };
    if !visited.insert(key.clone()) {
        return false;
    }

    if action.may_target(&key) && container.handle_locally(action) {
        tracing::trace!(navigator = %key, action = %action.kind, "action handled");
        return true;
    }

    if let Some(parent) = container.parent_container()
        && route_action(&*parent, action, visited)
    {
        return true;
    }

    for child in container.child_containers().iter().rev() {
        if route_action(&**child, action, visited) {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::String;
    use alloc::vec;
    use core::cell::{Cell, RefCell};

    /// Minimal container: handles actions whose kind is in `accepts`.
    struct Node {
        key: StateKey,
        accepts: Vec<&'static str>,
        parent: Option<Rc<Node>>,
        children: RefCell<Vec<Rc<Node>>>,
        offered: Cell<u32>,
        handled: Cell<u32>,
    }

    impl Node {
        fn new(key: &str, accepts: &[&'static str], parent: Option<&Rc<Self>>) -> Rc<Self> {
            let node = Rc::new(Self {
                key: StateKey::new(key),
                accepts: accepts.to_vec(),
                parent: parent.cloned(),
                children: RefCell::new(Vec::new()),
                offered: Cell::new(0),
                handled: Cell::new(0),
            });
            if let Some(p) = parent {
                p.children.borrow_mut().push(node.clone());
            }
            node
        }
    }

    impl Container for Node {
        fn container_key(&self) -> Option<StateKey> {
            Some(self.key.clone())
        }

        fn handle_locally(&self, action: &Action) -> bool {
            self.offered.set(self.offered.get() + 1);
            let ok = self.accepts.iter().any(|k| action.is(k));
            if ok {
                self.handled.set(self.handled.get() + 1);
            }
            ok
        }

        fn parent_container(&self) -> Option<Rc<Self>> {
            self.parent.clone()
        }

        fn child_containers(&self) -> Vec<Rc<Self>> {
            self.children.borrow().clone()
        }
    }

    #[test]
    fn local_router_wins_before_bubbling() {
        let root = Node::new("root", &["GO_BACK"], None);
        let leaf = Node::new("leaf", &["GO_BACK"], Some(&root));
        let mut visited = VisitedSet::new();
        assert!(route_action(&*leaf, &Action::new("GO_BACK"), &mut visited));
        assert_eq!(leaf.handled.get(), 1);
        assert_eq!(root.offered.get(), 0);
    }

    #[test]
    fn declined_action_bubbles_to_parent() {
        let root = Node::new("root", &["NAVIGATE"], None);
        let mid = Node::new("mid", &[], Some(&root));
        let leaf = Node::new("leaf", &[], Some(&mid));
        let mut visited = VisitedSet::new();
        assert!(route_action(&*leaf, &Action::new("NAVIGATE"), &mut visited));
        assert_eq!(root.handled.get(), 1);
        assert_eq!(mid.handled.get() + leaf.handled.get(), 0);
        assert_eq!(visited.len(), 3);
    }

    #[test]
    fn unhandled_visits_each_container_once() {
        let root = Node::new("root", &[], None);
        let a = Node::new("a", &[], Some(&root));
        let b = Node::new("b", &[], Some(&root));
        let leaf = Node::new("leaf", &[], Some(&a));
        let mut visited = VisitedSet::new();
        assert!(!route_action(&*leaf, &Action::new("UNKNOWN"), &mut visited));
        for n in [&root, &a, &b, &leaf] {
            assert_eq!(n.offered.get(), 1, "{} offered more than once", n.key);
        }
        assert_eq!(visited.len(), 4);
    }

    #[test]
    fn children_are_offered_after_ancestors_newest_first() {
        let root = Node::new("root", &[], None);
        let first = Node::new("first", &["JUMP_TO"], Some(&root));
        let second = Node::new("second", &["JUMP_TO"], Some(&root));
        let mut visited = VisitedSet::new();
        assert!(route_action(&*root, &Action::new("JUMP_TO"), &mut visited));
        assert_eq!(second.handled.get(), 1);
        assert_eq!(first.offered.get(), 0);
    }

    #[test]
    fn target_skips_other_containers() {
        let root = Node::new("root", &["NAVIGATE"], None);
        let leaf = Node::new("leaf", &["NAVIGATE"], Some(&root));
        let action = Action::new("NAVIGATE").with_target(StateKey::new("root"));
        let mut visited = VisitedSet::new();
        assert!(route_action(&*leaf, &action, &mut visited));
        assert_eq!(leaf.offered.get(), 0);
        assert_eq!(root.handled.get(), 1);
    }

    #[test]
    fn visited_container_declines_immediately() {
        let root = Node::new("root", &["NAVIGATE"], None);
        let mut visited = VisitedSet::new();
        visited.insert(StateKey::new("root"));
        assert!(!route_action(&*root, &Action::new("NAVIGATE"), &mut visited));
        assert_eq!(root.offered.get(), 0);
        let keys: Vec<String> = visited.iter().map(|k| k.as_str().into()).collect();
        assert_eq!(keys, vec![String::from("root")]);
    }
}
