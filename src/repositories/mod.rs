// src/repositories/mod.rs
//
// Repository layer
//
// CRITICAL RULES:
// - Repositories are DUMB data mappers
// - NO business logic
// - NO event emission
// - Explicit SQL only

pub mod storage_repository;

pub use storage_repository::{InMemoryKeyValueStorage, KeyValueStorage, SqliteKeyValueStorage};

#[cfg(test)]
pub use storage_repository::MockKeyValueStorage;
