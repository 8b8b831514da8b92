// src/repositories/storage_repository.rs
//
// Namespaced key -> JSON string persistence

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::Utc;
use rusqlite::{params, OptionalExtension};

use crate::db::ConnectionPool;
use crate::error::{AppError, AppResult};

/// Durable storage for store snapshots. One namespace per store.
#[cfg_attr(test, mockall::automock)]
pub trait KeyValueStorage: Send + Sync {
    fn read(&self, namespace: &str) -> AppResult<Option<String>>;
    fn write(&self, namespace: &str, value: &str) -> AppResult<()>;
    fn remove(&self, namespace: &str) -> AppResult<()>;
}

pub struct SqliteKeyValueStorage {
    pool: Arc<ConnectionPool>,
}

impl SqliteKeyValueStorage {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }
}

impl KeyValueStorage for SqliteKeyValueStorage {
    fn read(&self, namespace: &str) -> AppResult<Option<String>> {
        let conn = self.pool.get()?;
        let value = conn
            .query_row(
                "SELECT value FROM kv_store WHERE namespace = ?1",
                params![namespace],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn write(&self, namespace: &str, value: &str) -> AppResult<()> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO kv_store (namespace, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(namespace) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![namespace, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn remove(&self, namespace: &str) -> AppResult<()> {
        let conn = self.pool.get()?;
        conn.execute("DELETE FROM kv_store WHERE namespace = ?1", params![namespace])?;
        Ok(())
    }
}

/// Process-local storage; contents vanish with the process
#[derive(Default)]
pub struct InMemoryKeyValueStorage {
    values: RwLock<HashMap<String, String>>,
}

impl InMemoryKeyValueStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for InMemoryKeyValueStorage {
    fn read(&self, namespace: &str) -> AppResult<Option<String>> {
        let values = self
            .values
            .read()
            .map_err(|e| AppError::Persistence(e.to_string()))?;
        Ok(values.get(namespace).cloned())
    }

    fn write(&self, namespace: &str, value: &str) -> AppResult<()> {
        let mut values = self
            .values
            .write()
            .map_err(|e| AppError::Persistence(e.to_string()))?;
        values.insert(namespace.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, namespace: &str) -> AppResult<()> {
        let mut values = self
            .values
            .write()
            .map_err(|e| AppError::Persistence(e.to_string()))?;
        values.remove(namespace);
        Ok(())
    }
}
