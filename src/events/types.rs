// src/events/types.rs
//
// All change events broadcast between store instances.
// Each event represents an immutable fact that has already occurred.
//
// CRITICAL RULES:
// - Events are facts, not commands
// - Events are immutable
// - Events carry the full new value, so applying one twice is harmless
// - `origin` names the store instance that wrote the change; receivers
//   drop events carrying their own origin (echoes)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{SortContext, SortOption};

/// Trait that all domain events must implement
pub trait DomainEvent: std::fmt::Debug + Clone {
    /// Unique identifier for this event instance
    fn event_id(&self) -> Uuid;

    /// When this event occurred
    fn occurred_at(&self) -> DateTime<Utc>;

    /// Human-readable event type name
    fn event_type(&self) -> &'static str;
}

// ============================================================================
// LOCALE EVENTS
// ============================================================================

/// Emitted when a context changes the interface language
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemLanguageChanged {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub origin: Uuid,
    pub language: String,
}

impl SystemLanguageChanged {
    pub fn new(origin: Uuid, language: String) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            origin,
            language,
        }
    }
}

impl DomainEvent for SystemLanguageChanged {
    fn event_id(&self) -> Uuid { self.event_id }
    fn occurred_at(&self) -> DateTime<Utc> { self.occurred_at }
    fn event_type(&self) -> &'static str { "SystemLanguageChanged" }
}

/// Emitted when a context changes the catalog content language
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieLanguageChanged {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub origin: Uuid,
    pub language: String,
}

impl MovieLanguageChanged {
    pub fn new(origin: Uuid, language: String) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            origin,
            language,
        }
    }
}

impl DomainEvent for MovieLanguageChanged {
    fn event_id(&self) -> Uuid { self.event_id }
    fn occurred_at(&self) -> DateTime<Utc> { self.occurred_at }
    fn event_type(&self) -> &'static str { "MovieLanguageChanged" }
}

// ============================================================================
// SORT EVENTS
// ============================================================================

/// Emitted when a sort preference changes in one context
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SortPreferenceChanged {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub origin: Uuid,
    pub context: SortContext,
    pub sort: SortOption,
}

impl SortPreferenceChanged {
    pub fn new(origin: Uuid, context: SortContext, sort: SortOption) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            origin,
            context,
            sort,
        }
    }
}

impl DomainEvent for SortPreferenceChanged {
    fn event_id(&self) -> Uuid { self.event_id }
    fn occurred_at(&self) -> DateTime<Utc> { self.occurred_at }
    fn event_type(&self) -> &'static str { "SortPreferenceChanged" }
}

// ============================================================================
// WATCHLIST EVENTS
// ============================================================================

/// Emitted after any watchlist mutation, carrying the complete id list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchlistChanged {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub origin: Uuid,
    pub movie_ids: Vec<i64>,
}

impl WatchlistChanged {
    pub fn new(origin: Uuid, movie_ids: Vec<i64>) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            origin,
            movie_ids,
        }
    }
}

impl DomainEvent for WatchlistChanged {
    fn event_id(&self) -> Uuid { self.event_id }
    fn occurred_at(&self) -> DateTime<Utc> { self.occurred_at }
    fn event_type(&self) -> &'static str { "WatchlistChanged" }
}
