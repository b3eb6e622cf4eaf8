// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_navigator --heading-base-level=0

//! Understory Navigator: deterministic action dispatch and atomic state commits for nested navigators.
//!
//! ## Overview
//!
//! A UI organizes screens in nested containers: a stack whose screens hold tabs, whose tabs hold
//! another stack, and so on. Each container is a [`Navigator`] that owns one slice of a single
//! state tree (see `understory_nav_state`) and is driven by a container-kind specific
//! [`Router`](understory_nav_state::Router).
//!
//! This crate decides who handles an action, commits the result atomically, and gives each
//! screen a helper facade to talk to it. It does not render anything and ships no concrete
//! routers.
//!
//! ## Dispatch
//!
//! [`route_action`](dispatch::route_action) offers an action to the navigator it was dispatched
//! from, then bubbles it to ancestors, then offers it to mounted descendants. A
//! [`VisitedSet`](dispatch::VisitedSet) guarantees each navigator is asked at most once, so
//! dispatch terminates and at most one navigator handles the action. Unhandled actions are
//! dropped and logged at `debug`.
//!
//! ## Transactions
//!
//! A handled action writes the navigator's slice, which rewrites the parent's route, up to the
//! root [`StateStore`]. Every dispatch runs inside
//! [`StateStore::perform_transaction`]: writes are staged, reads see them, and observers are
//! notified once when the outermost transaction ends.
//!
//! ## Facades
//!
//! [`Navigator::helpers`] and [`Navigator::screen`] return a [`Facade`]: the operations
//! inherited from ancestors, this navigator's own router operations, and the baseline set
//! (`goBack`, `navigate`, `replace`, `reset`, `setParams`), plus `dispatch`, `emit`,
//! `is_focused`, and `can_go_back`. Facades are memoized on their dependencies.
//!
//! ## Events
//!
//! Each navigator has an [`Emitter`]. After every commit the root publishes `state` events on
//! navigators whose slice changed and `blur`/`focus` events for routes that left or joined the
//! focused path. Blurs go out deepest first, then focuses shallowest first.
//!
//! ## Workflow
//!
//! 1) Create a [`StateStore`] and mount the root with [`NavigatorBuilder::mount_root`].
//! 2) Mount nested navigators into routes with [`NavigatorBuilder::mount_nested`].
//! 3) Hand each screen its [`Navigator::screen`] facade; screens call `navigate`, `go_back`, or
//!    any named operation, and subscribe to `focus`/`blur` on the navigator's emitter.
//! 4) Unmount navigators with [`Navigator::unmount`] when their route goes away.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod dispatch;
pub mod events;
pub mod facade;
mod lifecycle;
pub mod navigator;
pub mod transaction;

#[cfg(test)]
mod testing;

pub use dispatch::{Container, VisitedSet, route_action};
pub use events::{Emitter, Event, EventData, EventListener, ListenerId};
pub use facade::{Command, Facade, FacadeBuilder, FacadeError, HelperOptions, Operation};
pub use navigator::{Navigator, NavigatorBuilder, NavigatorError};
pub use transaction::{StateStore, StoreListener};
