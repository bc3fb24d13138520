//! Publish/subscribe primitive owned by every content instance.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use super::{Event, EventKind};
use crate::content::ContentId;

/// A shared event handler.
pub type Handler = Rc<dyn Fn(&mut Event)>;

/// Handle returned by [`EventDispatcher::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Subscription {
    id: SubscriptionId,
    kind: EventKind,
    handler: Handler,
}

/// Synchronous, ordered event dispatch.
///
/// Handlers for a kind run in registration order, each exactly once per
/// dispatch, and all of them run: there is no short-circuiting. The handler
/// list is snapshotted when a dispatch starts, so handlers may subscribe,
/// unsubscribe or dispatch further events. A nested dispatch runs to
/// completion before the outer dispatch moves on to its next handler.
///
/// A panicking handler is isolated: the panic is logged and the remaining
/// handlers still run.
///
/// While the dispatcher is held (see [`Self::hold`]), dispatched events are
/// queued and delivered in order on the matching [`Self::release`].
#[derive(Default)]
pub struct EventDispatcher {
    owner: Cell<Option<ContentId>>,
    subscriptions: RefCell<Vec<Subscription>>,
    next_id: Cell<u64>,
    held: Cell<usize>,
    deferred: RefCell<VecDeque<Event>>,
}

impl EventDispatcher {
    /// Create a dispatcher with no owner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a dispatcher that stamps events with the given content id.
    pub fn for_content(id: ContentId) -> Self {
        let dispatcher = Self::default();
        dispatcher.owner.set(Some(id));
        dispatcher
    }

    /// The id stamped as target on dispatched events.
    pub fn owner(&self) -> Option<ContentId> {
        self.owner.get()
    }

    /// Register a handler for a kind. Returns an id for [`Self::unsubscribe`].
    pub fn subscribe<F>(&self, kind: impl Into<EventKind>, handler: F) -> SubscriptionId
    where
        F: Fn(&mut Event) + 'static,
    {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.subscriptions.borrow_mut().push(Subscription {
            id,
            kind: kind.into(),
            handler: Rc::new(handler),
        });
        id
    }

    /// Remove a handler. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscriptions = self.subscriptions.borrow_mut();
        match subscriptions.iter().position(|s| s.id == id) {
            Some(index) => {
                subscriptions.remove(index);
                true
            }
            None => false,
        }
    }

    /// Number of registered handlers across all kinds.
    pub fn subscriber_count(&self) -> usize {
        self.subscriptions.borrow().len()
    }

    /// Drop every handler and every queued event.
    pub fn clear(&self) {
        self.subscriptions.borrow_mut().clear();
        self.deferred.borrow_mut().clear();
    }

    /// Start queueing dispatches. Holds nest; each needs its own release.
    pub fn hold(&self) {
        self.held.set(self.held.get() + 1);
    }

    /// End one hold. Releasing the outermost hold delivers the queued
    /// events and returns them as left by the handlers.
    pub fn release(&self) -> Vec<Event> {
        let depth = self.held.get().saturating_sub(1);
        self.held.set(depth);
        if depth > 0 {
            return Vec::new();
        }

        let mut delivered = Vec::new();
        loop {
            let next = self.deferred.borrow_mut().pop_front();
            let Some(event) = next else {
                break;
            };
            delivered.push(self.deliver(event));
        }
        delivered
    }

    pub fn is_held(&self) -> bool {
        self.held.get() > 0
    }

    /// Number of events waiting for a release.
    pub fn deferred_count(&self) -> usize {
        self.deferred.borrow().len()
    }

    /// Dispatch an event (or a bare kind) to all matching handlers.
    ///
    /// Returns the event as left by the handlers, so callers can inspect
    /// [`Event::is_default_prevented`]. While held, the event is queued and
    /// returned before any handler saw it.
    pub fn dispatch(&self, event: impl Into<Event>) -> Event {
        let mut event = event.into();
        event.target = self.owner.get();

        if self.is_held() {
            tracing::trace!(kind = %event.kind, target = ?event.target, "event deferred");
            self.deferred.borrow_mut().push_back(event.clone());
            return event;
        }
        self.deliver(event)
    }

    fn deliver(&self, mut event: Event) -> Event {
        let handlers: Vec<Handler> = self
            .subscriptions
            .borrow()
            .iter()
            .filter(|s| s.kind == event.kind)
            .map(|s| Rc::clone(&s.handler))
            .collect();

        for (index, handler) in handlers.iter().enumerate() {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| handler(&mut event)));
            if outcome.is_err() {
                tracing::error!(
                    kind = %event.kind,
                    handler = index,
                    target = ?event.target,
                    "event handler panicked"
                );
            }
        }

        event
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("owner", &self.owner.get())
            .field("subscribers", &self.subscriber_count())
            .field("held", &self.held.get())
            .finish()
    }
}
