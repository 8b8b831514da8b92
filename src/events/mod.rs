// src/events/mod.rs
//
// Internal Event System - Public API
//
// CRITICAL: EventHandler is INTERNAL and must NOT be exported

pub mod bus;
pub mod notifier;
pub mod types;

// ============================================================================
// PUBLIC EXPORTS - Event Types, Bus and Notifier
// ============================================================================

pub use types::DomainEvent;

pub use types::{
    // Locale
    MovieLanguageChanged,
    SystemLanguageChanged,

    // Sort
    SortPreferenceChanged,

    // Watchlist
    WatchlistChanged,
};

pub use bus::{EventBus, EventLogEntry, SubscriptionId, EVENT_LOG_CAPACITY};
pub use notifier::ChangeNotifier;

/// Initialize a new event bus
pub fn create_event_bus() -> EventBus {
    EventBus::new()
}
