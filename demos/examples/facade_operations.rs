// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! What a screen's facade exposes.
//!
//! - Operations inherited from ancestors dispatch through the ancestor.
//! - Router operations are merged with the baseline set; the baseline wins
//!   name collisions (the tab router's own `goBack` is shadowed).
//! - Facades are memoized until a dependency changes.
//!
//! Run:
//! - `cargo run -p understory_demos --example facade_operations`

mod common;

use std::rc::Rc;

use common::{StackRouter, TabRouter, print_tree};
use understory_nav_state::{Payload, RouterConfig};
use understory_navigator::{Command, FacadeError, NavigatorBuilder, StateStore};

fn main() {
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
    let feed = tabs.state().routes[0].key.clone();
    let screen = tabs.screen(&feed);

    println!("== Operations on the Feed screen ==");
    for name in screen.operation_names() {
        let op = screen.operation(name).expect("listed operations exist");
        let origin = if op.is_inherited() { "inherited" } else { "local" };
        let sample = op.action(Payload::None);
        println!("  {name:<10} {origin:<9} -> {}", sample.kind);
    }

    // `pop` only exists on the stack; the tab screen reaches it by inheritance.
    screen.navigate("Details");
    screen.invoke("pop", Payload::Count(1)).expect("inherited from the stack");
    assert_eq!(stack.state().routes.len(), 1);

    match screen.invoke("openDrawer", Payload::None) {
        Err(FacadeError::UnknownOperation(name)) => println!("\nno operation named {name:?}"),
        Ok(()) => unreachable!("no drawer in this tree"),
    }

    // Updaters bypass routers entirely.
    tabs.helpers()
        .dispatch(Command::update(|s| s.with_index(s.routes.len() - 1)));
    println!("\n== After an updater ==");
    print_tree(&stack.state());

    let before = tabs.helpers();
    assert!(before.ptr_eq(&tabs.helpers()));
    tabs.set_router(Rc::new(TabRouter));
    println!("\nrebuilt after set_router: {}", !before.ptr_eq(&tabs.helpers()));
}
