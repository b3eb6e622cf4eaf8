// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::rc::Rc;

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use understory_nav_state::{Action, NavState, Params, Route, Router, RouterConfig, StateKey};
use understory_navigator::{Command, Navigator, NavigatorBuilder, StateStore, VisitedSet};

/// Handles `TICK` only when `accepts`, by bumping a counter param on its route.
struct Level {
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
        if !self.accepts || !action.is("TICK") {
            return None;
        }
        let route = &state.routes[0];
        let n: u64 = route
            .params
            .as_ref()
            .and_then(|p| p.get("n"))
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        let mut params = Params::new();
        params.insert("n".into(), (n + 1).to_string());
        state.with_route_params(&route.key, &params)
    }

    fn can_go_back(&self, _: &NavState) -> bool {
        false
    }
}

/// A chain of `depth` navigators; only the root accepts `TICK`.
fn chain(depth: usize) -> Vec<Navigator> {
    let store = Rc::new(StateStore::new());
    let mut navs: Vec<Navigator> = Vec::with_capacity(depth);
    for level in 0..depth {
        let builder = NavigatorBuilder::new(Level { accepts: level == 0 })
            .config(RouterConfig::new(["Slot"]));
        let nav = match navs.last() {
            None => builder.mount_root(store.clone()).unwrap(),
            Some(parent) => {
                let slot = parent.state().routes[0].key.clone();
                builder.mount_nested(parent, &slot).unwrap()
            }
        };
        navs.push(nav);
    }
    navs
}

fn bench_bubble(c: &mut Criterion) {
    let mut group = c.benchmark_group("bubble");
    for &depth in &[2usize, 8, 32] {
        let navs = chain(depth);
        let leaf = navs.last().unwrap().clone();
        let tick = Action::new("TICK");
        group.throughput(Throughput::Elements(depth as u64));
        group.bench_function(format!("leaf_to_root_d{}", depth), |b| {
            b.iter(|| {
                let mut visited = VisitedSet::new();
                black_box(leaf.on_action(&tick, &mut visited));
            })
        });
        let unknown = Action::new("UNKNOWN");
        group.bench_function(format!("unhandled_d{}", depth), |b| {
            b.iter(|| {
                let mut visited = VisitedSet::new();
                black_box(leaf.on_action(&unknown, &mut visited));
            })
        });
    }
    group.finish();
}

fn bench_cascade(c: &mut Criterion) {
    let mut group = c.benchmark_group("cascade");
    for &depth in &[2usize, 8, 32] {
        let navs = chain(depth);
        let leaf = navs.last().unwrap().clone();
        group.throughput(Throughput::Elements(depth as u64));
        group.bench_function(format!("updater_d{}", depth), |b| {
            b.iter(|| {
                leaf.helpers()
                    .dispatch(Command::update(|s| s.with_index(0)));
            })
        });
        group.bench_function(format!("batched_x16_d{}", depth), |b| {
            b.iter(|| {
                leaf.store().perform_transaction(|| {
                    for _ in 0..16 {
                        leaf.helpers().dispatch(Action::new("TICK"));
                    }
                });
            })
        });
    }
    group.finish();
}

fn bench_mount(c: &mut Criterion) {
    let mut group = c.benchmark_group("mount");
    for &depth in &[8usize, 32] {
        group.throughput(Throughput::Elements(depth as u64));
        group.bench_function(format!("chain_d{}", depth), |b| {
            b.iter_batched(
                || depth,
                |d| black_box(chain(d)),
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_bubble, bench_cascade, bench_mount);
criterion_main!(benches);
