// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Focus, blur, and state events published after each commit.
//!
//! Blur events arrive inner→outer, then focus events outer→inner, each on the
//! emitter of the navigator that owns the route.
//!
//! Run:
//! - `cargo run -p understory_demos --example focus_events`

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::{StackRouter, TabRouter, init_tracing};
use understory_nav_state::RouterConfig;
use understory_navigator::events::kind;
use understory_navigator::{EventData, Navigator, NavigatorBuilder, StateStore};

fn watch(name: &'static str, nav: &Navigator, log: &Rc<RefCell<Vec<String>>>) {
    for k in [kind::FOCUS, kind::BLUR, kind::STATE] {
        let log = log.clone();
        nav.emitter().subscribe(k, None, move |e| {
            let line = match (&e.target, &e.data) {
                (Some(route), _) => format!("{name}: {} {route}", e.kind),
                (None, EventData::Changes(flags)) => format!("{name}: {} {flags:?}", e.kind),
                (None, _) => format!("{name}: {}", e.kind),
            };
            log.borrow_mut().push(line);
            false
        });
    }
}

fn flush(title: &str, log: &Rc<RefCell<Vec<String>>>) {
    println!("== {title} ==");
    for line in log.borrow_mut().drain(..) {
        println!("  {line}");
    }
}

fn main() {
    init_tracing();

    let store = Rc::new(StateStore::new());
    let stack = NavigatorBuilder::new(StackRouter)
        .config(RouterConfig::new(["Home", "Details"]))
        .mount_root(store)
        .expect("stack mounts");
    let home = stack.state().routes[0].key.clone();
    let tabs = NavigatorBuilder::new(TabRouter)
        .config(RouterConfig::new(["Feed", "Profile"]))
        .mount_nested(&stack, &home)
        .expect("tabs mount under Home");

    let log = Rc::new(RefCell::new(Vec::new()));
    watch("stack", &stack, &log);
    watch("tabs", &tabs, &log);

    tabs.helpers().invoke("jumpTo", understory_nav_state::Payload::route("Profile"))
        .expect("tabs define jumpTo");
    flush("jumpTo Profile", &log);

    stack.helpers().navigate("Details");
    flush("stack navigate Details", &log);

    stack.helpers().go_back();
    flush("stack goBack", &log);

    tabs.unmount();
    flush("unmount tabs", &log);
    assert!(stack.state().nested(&home).is_none());
}
