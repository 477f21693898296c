//! The observer registry between instrumentation feeds and the engines that
//! consume them.
//!
//! Subscribers hand the hub the sending half of a channel. Every event the
//! host emits is forwarded, in emission order, to each matching subscriber's
//! channel. Subscribing returns a `ListenerId` that is the only way to undo
//! the subscription.

use std::{collections::BTreeMap, fmt};

use crossbeam_channel::Sender;

use super::{EventKind, SourceEvent, TargetId};

/// Handle to a single subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, writer: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(writer, "listener-{}", self.0)
    }
}

/// Which targets' events a listener wants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListenerScope {
    /// Events raised by one target's own models.
    Target(TargetId),

    /// Events raised on behalf of every target, like suspension changes.
    AllTargets,
}

impl ListenerScope {
    fn matches(&self, target: &TargetId) -> bool {
        match self {
            ListenerScope::Target(id) => id == target,
            ListenerScope::AllTargets => true,
        }
    }
}

struct Listener {
    scope: ListenerScope,
    kind: EventKind,
    sender: Sender<SourceEvent>,
}

#[derive(Default)]
pub struct EventHub {
    next_listener_id: u64,

    /// Ordered by subscription so that delivery order is deterministic.
    listeners: BTreeMap<ListenerId, Listener>,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(
        &mut self,
        scope: ListenerScope,
        kind: EventKind,
        sender: Sender<SourceEvent>,
    ) -> ListenerId {
        let id = ListenerId(self.next_listener_id);
        self.next_listener_id += 1;

        log::trace!("{} subscribed to {:?} ({:?})", id, kind, scope);

        self.listeners.insert(
            id,
            Listener {
                scope,
                kind,
                sender,
            },
        );

        id
    }

    /// Removes a subscription. Returns false if it was already gone.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let removed = self.listeners.remove(&id).is_some();

        if removed {
            log::trace!("{} unsubscribed", id);
        }

        removed
    }

    /// Delivers an event raised by the given target's models. Returns the
    /// number of listeners it reached.
    pub fn emit(&self, target: &TargetId, event: SourceEvent) -> usize {
        self.deliver(event, |scope| scope.matches(target))
    }

    /// Delivers an event to every listener of its kind, regardless of scope.
    pub fn broadcast(&self, event: SourceEvent) -> usize {
        self.deliver(event, |_| true)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Number of listeners scoped to exactly this target.
    pub fn listener_count_for(&self, target: &TargetId) -> usize {
        self.listeners
            .values()
            .filter(|listener| listener.scope == ListenerScope::Target(target.clone()))
            .count()
    }

    fn deliver(&self, event: SourceEvent, accepts: impl Fn(&ListenerScope) -> bool) -> usize {
        let kind = event.kind();
        let mut delivered = 0;

        for (id, listener) in &self.listeners {
            if listener.kind != kind || !accepts(&listener.scope) {
                continue;
            }

            match listener.sender.send(event.clone()) {
                Ok(()) => delivered += 1,
                Err(_) => {
                    log::debug!("{} has no receiver left, skipping {:?}", id, kind);
                }
            }
        }

        delivered
    }
}
