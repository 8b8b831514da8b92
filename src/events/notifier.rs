// src/events/notifier.rs
//
// Change Notifier - cross-context propagation for persisted stores
//
// A store publishes every local write and listens for writes made by other
// contexts. With `Broadcast`, all stores sharing the bus converge. With
// `Local` there is no other context: publishing and listening do nothing,
// and callers behave exactly the same.

use std::sync::Arc;

use super::bus::{EventBus, SubscriptionId};
use super::types::DomainEvent;

#[derive(Clone, Default)]
pub enum ChangeNotifier {
    /// Publish to and listen on a shared bus
    Broadcast(Arc<EventBus>),
    /// Single execution context
    #[default]
    Local,
}

impl ChangeNotifier {
    pub fn broadcast(bus: Arc<EventBus>) -> Self {
        ChangeNotifier::Broadcast(bus)
    }

    pub fn publish<E>(&self, event: E)
    where
        E: DomainEvent + 'static,
    {
        if let ChangeNotifier::Broadcast(bus) = self {
            bus.emit(event);
        }
    }

    pub fn listen<E, F>(&self, handler: F) -> Option<SubscriptionId>
    where
        E: DomainEvent + 'static,
        F: Fn(&E) + Send + Sync + 'static,
    {
        match self {
            ChangeNotifier::Broadcast(bus) => Some(bus.subscribe::<E, F>(handler)),
            ChangeNotifier::Local => None,
        }
    }

    pub fn unlisten(&self, id: SubscriptionId) {
        if let ChangeNotifier::Broadcast(bus) = self {
            bus.unsubscribe(id);
        }
    }
}

impl std::fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChangeNotifier::Broadcast(_) => f.write_str("ChangeNotifier::Broadcast"),
            ChangeNotifier::Local => f.write_str("ChangeNotifier::Local"),
        }
    }
}
