// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A stack whose first screen hosts a tab navigator.
//!
//! Shows where actions land: `navigate` from a tab screen is handled by the
//! tabs when the name is a tab, and bubbles to the stack otherwise.
//!
//! Run:
//! - `cargo run -p understory_demos --example nested_tabs`
//! - `RUST_LOG=trace cargo run -p understory_demos --example nested_tabs`

mod common;

use std::rc::Rc;

use common::{StackRouter, TabRouter, init_tracing, print_tree};
use understory_nav_state::RouterConfig;
use understory_navigator::{NavigatorBuilder, StateStore};

fn main() {
    init_tracing();

    let store = Rc::new(StateStore::new());
    let stack = NavigatorBuilder::new(StackRouter)
        .config(RouterConfig::new(["Home", "Details", "Settings"]))
        .mount_root(store.clone())
        .expect("stack mounts");
    let home = stack.state().routes[0].key.clone();
    let tabs = NavigatorBuilder::new(TabRouter)
        .config(RouterConfig::new(["Feed", "Profile", "Inbox"]).with_initial_route("Feed"))
        .mount_nested(&stack, &home)
        .expect("tabs mount under Home");
    let feed = tabs.state().routes[0].key.clone();

    println!("== Mounted ==");
    print_tree(&stack.state());

    let feed_screen = tabs.screen(&feed);

    // A tab name: handled by the tabs, the stack only sees a new nested state.
    feed_screen.navigate("Profile");
    println!("\n== navigate(\"Profile\") from Feed ==");
    print_tree(&stack.state());
    assert_eq!(tabs.state().index, 1);
    assert_eq!(stack.state().routes.len(), 1);

    // Not a tab name: bubbles to the stack, which pushes.
    feed_screen.navigate("Details");
    println!("\n== navigate(\"Details\") from Feed ==");
    print_tree(&stack.state());
    assert_eq!(stack.state().routes.len(), 2);
    println!(
        "Feed screen: focused = {}, can go back = {}",
        feed_screen.is_focused(),
        feed_screen.can_go_back()
    );

    // `goBack` is offered to the tabs first; they are not on their first tab
    // so they go back there before the stack pops.
    feed_screen.go_back();
    println!("\n== goBack() from Feed ==");
    print_tree(&stack.state());

    tracing::info!(commits = store.epoch(), "demo finished");
}
