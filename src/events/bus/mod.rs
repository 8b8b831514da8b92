pub mod event_bus;

pub use event_bus::{EventBus, EventLogEntry, SubscriptionId, EVENT_LOG_CAPACITY};
