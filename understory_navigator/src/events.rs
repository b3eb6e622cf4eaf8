// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-navigator event channel.
//!
//! ## Overview
//!
//! An [`Emitter`] is a synchronous publish/subscribe list owned by one
//! navigator. Lifecycle notifications (`focus`, `blur`, `state`) are published
//! here after commits; screens may publish their own kinds through the facade.
//!
//! ## Delivery
//!
//! - Listeners run synchronously, in subscription order.
//! - A listener subscribed with a target route only sees events for that route;
//!   an untargeted listener sees every event of its kind.
//! - The listener list is snapshotted before delivery, so listeners added or
//!   removed during an emit take effect from the next emit.
//! - [`Emitter::emit`] returns true if any listener reported the event handled.

use alloc::borrow::Cow;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;

use understory_nav_state::{ChangeFlags, Params, RouteKey};

/// Lifecycle event kinds published by navigators.
pub mod kind {
    /// A route became part of the focused path.
    pub const FOCUS: &str = "focus";
    /// A route left the focused path.
    pub const BLUR: &str = "blur";
    /// The navigator's own state changed.
    pub const STATE: &str = "state";
}

/// Handle returned by subscriptions; pass it back to unsubscribe.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    pub(crate) const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

/// Data attached to an [`Event`].
#[derive(Clone, Debug, Default, PartialEq)]
pub enum EventData {
    /// No data.
    #[default]
    None,
    /// Free-form parameters.
    Params(Params),
    /// What changed, for [`kind::STATE`] events.
    Changes(ChangeFlags),
}

/// An event delivered through an [`Emitter`].
#[derive(Clone, Debug, PartialEq)]
pub struct Event {
    /// Event kind, e.g. [`kind::FOCUS`].
    pub kind: Cow<'static, str>,
    /// Route the event is about, if any.
    pub target: Option<RouteKey>,
    /// Attached data.
    pub data: EventData,
}

impl Event {
    /// An untargeted event with no data.
    pub fn new(kind: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind: kind.into(),
            target: None,
            data: EventData::None,
        }
    }

    /// Address the event to a route.
    #[must_use]
    pub fn with_target(mut self, target: RouteKey) -> Self {
        self.target = Some(target);
        self
    }

    /// Attach data.
    #[must_use]
    pub fn with_data(mut self, data: EventData) -> Self {
        self.data = data;
        self
    }
}

/// Event callback. Returns true if it handled the event.
pub type EventListener = Rc<dyn Fn(&Event) -> bool>;

struct Entry {
    id: ListenerId,
    kind: Cow<'static, str>,
    target: Option<RouteKey>,
    listener: EventListener,
}

impl Entry {
    fn accepts(&self, event: &Event) -> bool {
        self.kind == event.kind && (self.target.is_none() || self.target == event.target)
    }
}

#[derive(Default)]
struct EmitterInner {
    entries: RefCell<Vec<Entry>>,
    next_id: Cell<u64>,
}

/// Shared, cloneable event channel.
///
/// Clones share the same listener list; identity is observable through
/// [`Emitter::ptr_eq`].
#[derive(Clone, Default)]
pub struct Emitter {
    inner: Rc<EmitterInner>,
}

impl fmt::Debug for Emitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("listeners", &self.listener_count())
            .finish_non_exhaustive()
    }
}

impl Emitter {
    /// Create an emitter with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to events of `kind`, optionally only those targeting one route.
    pub fn subscribe(
        &self,
        kind: impl Into<Cow<'static, str>>,
        target: Option<RouteKey>,
        listener: impl Fn(&Event) -> bool + 'static,
    ) -> ListenerId {
        let raw = self.inner.next_id.get();
        self.inner.next_id.set(raw + 1);
        let id = ListenerId::new(raw);
        self.inner.entries.borrow_mut().push(Entry {
            id,
            kind: kind.into(),
            target,
            listener: Rc::new(listener),
        });
        id
    }

    /// Remove a listener. Returns false if it was not subscribed.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut entries = self.inner.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|e| e.id != id);
        entries.len() != before
    }

    /// Deliver `event` to matching listeners.
    pub fn emit(&self, event: &Event) -> bool {
        let matching: Vec<EventListener> = self
            .inner
            .entries
            .borrow()
            .iter()
            .filter(|e| e.accepts(event))
            .map(|e| e.listener.clone())
            .collect();
        let mut handled = false;
        for listener in matching {
            handled |= listener(event);
        }
        handled
    }

    /// Number of subscribed listeners.
    pub fn listener_count(&self) -> usize {
        self.inner.entries.borrow().len()
    }

    /// True if both handles share one listener list.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn delivers_in_subscription_order() {
        let emitter = Emitter::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        for tag in [1_u32, 2, 3] {
            let log = log.clone();
            emitter.subscribe("ping", None, move |_| {
                log.borrow_mut().push(tag);
                false
            });
        }
        assert!(!emitter.emit(&Event::new("ping")));
        assert_eq!(*log.borrow(), vec![1, 2, 3]);
    }

    #[test]
    fn handled_if_any_listener_handles() {
        let emitter = Emitter::new();
        emitter.subscribe("ping", None, |_| false);
        emitter.subscribe("ping", None, |_| true);
        assert!(emitter.emit(&Event::new("ping")));
        assert!(!emitter.emit(&Event::new("pong")));
    }

    #[test]
    fn targeted_listeners_filter_by_route() {
        let emitter = Emitter::new();
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        emitter.subscribe(kind::FOCUS, Some(RouteKey::new("a")), move |_| {
            h.set(h.get() + 1);
            true
        });
        assert!(!emitter.emit(&Event::new(kind::FOCUS).with_target(RouteKey::new("b"))));
        assert!(emitter.emit(&Event::new(kind::FOCUS).with_target(RouteKey::new("a"))));
        assert!(!emitter.emit(&Event::new(kind::FOCUS)));
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let emitter = Emitter::new();
        let id = emitter.subscribe("ping", None, |_| true);
        assert!(emitter.unsubscribe(id));
        assert!(!emitter.unsubscribe(id));
        assert!(!emitter.emit(&Event::new("ping")));
        assert_eq!(emitter.listener_count(), 0);
    }

    #[test]
    fn listeners_added_during_emit_wait_for_next_emit() {
        let emitter = Emitter::new();
        let calls = Rc::new(Cell::new(0));
        let (e, c) = (emitter.clone(), calls.clone());
        emitter.subscribe("ping", None, move |_| {
            let c = c.clone();
            e.subscribe("ping", None, move |_| {
                c.set(c.get() + 1);
                true
            });
            false
        });
        assert!(!emitter.emit(&Event::new("ping")));
        assert_eq!(calls.get(), 0);
        assert!(emitter.emit(&Event::new("ping")));
        assert_eq!(calls.get(), 1);
    }
}
