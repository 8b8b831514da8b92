// src/infrastructure/persisted_state.rs
//
// Versioned, best-effort persistence of one store snapshot
//
// CRITICAL RULES:
// - Stored form is {"version": N, "state": ...}
// - A missing, unreadable or differently-versioned record loads as the default
// - Writes never fail the caller; failures are logged and dropped
// - An older snapshot never overwrites a newer one

use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;

use crate::repositories::KeyValueStorage;

#[derive(Serialize)]
struct EnvelopeRef<'a, T> {
    version: u32,
    state: &'a T,
}

#[derive(Deserialize)]
struct RawEnvelope {
    version: u32,
    state: serde_json::Value,
}

pub struct PersistedState<T> {
    namespace: &'static str,
    version: u32,
    storage: Arc<dyn KeyValueStorage>,
    next_seq: AtomicU64,
    /// Sequence number of the last snapshot that reached storage
    written_seq: Arc<Mutex<u64>>,
    pending: Mutex<Vec<JoinHandle<()>>>,
    _state: PhantomData<fn() -> T>,
}

impl<T> PersistedState<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(storage: Arc<dyn KeyValueStorage>, namespace: &'static str, version: u32) -> Self {
        Self {
            namespace,
            version,
            storage,
            next_seq: AtomicU64::new(1),
            written_seq: Arc::new(Mutex::new(0)),
            pending: Mutex::new(Vec::new()),
            _state: PhantomData,
        }
    }

    pub fn namespace(&self) -> &'static str {
        self.namespace
    }

    /// Restore the stored snapshot, or `T::default()`
    pub fn load(&self) -> T
    where
        T: Default,
    {
        self.load_or(T::default())
    }

    /// Restore the stored snapshot, or `default`
    pub fn load_or(&self, default: T) -> T {
        let raw = match self.storage.read(self.namespace) {
            Ok(Some(raw)) => raw,
            Ok(None) => return default,
            Err(e) => {
                log::warn!("[PERSIST] {} unreadable, using defaults: {}", self.namespace, e);
                return default;
            }
        };

        let envelope: RawEnvelope = match serde_json::from_str(&raw) {
            Ok(envelope) => envelope,
            Err(e) => {
                log::warn!("[PERSIST] {} is malformed, using defaults: {}", self.namespace, e);
                return default;
            }
        };

        if envelope.version != self.version {
            log::warn!(
                "[PERSIST] {} has version {}, expected {}; using defaults",
                self.namespace,
                envelope.version,
                self.version
            );
            return default;
        }

        match serde_json::from_value(envelope.state) {
            Ok(state) => state,
            Err(e) => {
                log::warn!("[PERSIST] {} state rejected, using defaults: {}", self.namespace, e);
                default
            }
        }
    }

    /// Write `state` without blocking the caller.
    ///
    /// Inside a tokio runtime the write runs on the blocking pool and can be
    /// awaited with `flush`; outside one it runs inline.
    pub fn save(&self, state: &T) {
        let payload = match serde_json::to_string(&EnvelopeRef {
            version: self.version,
            state,
        }) {
            Ok(payload) => payload,
            Err(e) => {
                log::warn!("[PERSIST] {} could not be serialized: {}", self.namespace, e);
                return;
            }
        };

        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
        let storage = Arc::clone(&self.storage);
        let written_seq = Arc::clone(&self.written_seq);
        let namespace = self.namespace;

        let write = move || write_if_newer(storage.as_ref(), &written_seq, namespace, seq, &payload);

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let task = handle.spawn_blocking(write);
                let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
                pending.retain(|h| !h.is_finished());
                pending.push(task);
            }
            Err(_) => write(),
        }
    }

    /// Wait for every write issued so far
    pub async fn flush(&self) {
        let handles: Vec<JoinHandle<()>> = {
            let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
            pending.drain(..).collect()
        };
        for handle in handles {
            if let Err(e) = handle.await {
                log::error!("[PERSIST] {} write task failed: {}", self.namespace, e);
            }
        }
    }
}

fn write_if_newer(
    storage: &dyn KeyValueStorage,
    written_seq: &Mutex<u64>,
    namespace: &str,
    seq: u64,
    payload: &str,
) {
    let mut last = written_seq.lock().unwrap_or_else(|e| e.into_inner());
    if seq < *last {
        log::debug!("[PERSIST] {} skipped superseded write #{}", namespace, seq);
        return;
    }
    match storage.write(namespace, payload) {
        Ok(()) => *last = seq,
        Err(e) => log::warn!("[PERSIST] {} write failed: {}", namespace, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::repositories::{InMemoryKeyValueStorage, MockKeyValueStorage};

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Counter {
        value: u32,
    }

    #[test]
    fn test_save_then_load_outside_runtime() {
        let storage: Arc<dyn KeyValueStorage> = Arc::new(InMemoryKeyValueStorage::new());
        let persisted = PersistedState::<Counter>::new(Arc::clone(&storage), "counter", 1);

        persisted.save(&Counter { value: 4 });

        assert_eq!(
            storage.read("counter").unwrap().as_deref(),
            Some(r#"{"version":1,"state":{"value":4}}"#)
        );
        assert_eq!(persisted.load(), Counter { value: 4 });
    }

    #[test]
    fn test_missing_record_loads_default() {
        let storage: Arc<dyn KeyValueStorage> = Arc::new(InMemoryKeyValueStorage::new());
        let persisted = PersistedState::<Counter>::new(storage, "counter", 1);
        assert_eq!(persisted.load(), Counter::default());
    }

    #[test]
    fn test_version_mismatch_loads_default() {
        let storage: Arc<dyn KeyValueStorage> = Arc::new(InMemoryKeyValueStorage::new());
        storage
            .write("counter", r#"{"version":1,"state":{"value":9}}"#)
            .unwrap();

        let persisted = PersistedState::<Counter>::new(storage, "counter", 2);
        assert_eq!(persisted.load(), Counter::default());
    }

    #[test]
    fn test_malformed_record_loads_default() {
        let storage: Arc<dyn KeyValueStorage> = Arc::new(InMemoryKeyValueStorage::new());
        storage.write("counter", "not json").unwrap();
        storage
            .write("other", r#"{"version":1,"state":{"value":"nine"}}"#)
            .unwrap();

        assert_eq!(
            PersistedState::<Counter>::new(Arc::clone(&storage), "counter", 1).load(),
            Counter::default()
        );
        assert_eq!(
            PersistedState::<Counter>::new(storage, "other", 1).load(),
            Counter::default()
        );
    }

    #[test]
    fn test_storage_failures_are_swallowed() {
        let mut mock = MockKeyValueStorage::new();
        mock.expect_read()
            .returning(|_| Err(AppError::Persistence("disk gone".to_string())));
        mock.expect_write()
            .times(1)
            .returning(|_, _| Err(AppError::Persistence("quota exceeded".to_string())));

        let persisted = PersistedState::<Counter>::new(Arc::new(mock), "counter", 1);

        assert_eq!(persisted.load(), Counter::default());
        persisted.save(&Counter { value: 1 });
    }

    #[tokio::test]
    async fn test_flush_waits_for_background_writes() {
        let storage: Arc<dyn KeyValueStorage> = Arc::new(InMemoryKeyValueStorage::new());
        let persisted = PersistedState::<Counter>::new(Arc::clone(&storage), "counter", 1);

        for value in 1..=5 {
            persisted.save(&Counter { value });
        }
        persisted.flush().await;

        assert_eq!(persisted.load(), Counter { value: 5 });
    }

    #[test]
    fn test_older_write_never_overwrites_newer() {
        let storage = InMemoryKeyValueStorage::new();
        let written = Mutex::new(0);

        write_if_newer(&storage, &written, "counter", 2, "second");
        write_if_newer(&storage, &written, "counter", 1, "first");

        assert_eq!(storage.read("counter").unwrap().as_deref(), Some("second"));
    }
}
