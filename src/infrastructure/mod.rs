// src/infrastructure/mod.rs
//
// Infrastructure Layer
//
// Contains implementation details that support the stores
// but are not part of the domain itself.
//
// RULES:
// - Infrastructure serves the domain
// - Infrastructure never dictates domain behavior
// - Infrastructure is replaceable

pub mod persisted_state;

pub use persisted_state::PersistedState;
