//! Best-effort write-through shared by the stateful services.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use storage::codec::CodecError;
use storage::repository::KeyValueStore;

/// Locks `mutex`, recovering the data if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Reads and decodes the value under `key`.
///
/// Missing or malformed values start from the default, and the first write
/// replaces them. A failed read or a value from a newer schema also starts
/// from the default, but the session never writes to `key`, so the stored
/// value survives untouched.
pub(crate) async fn load<T, F>(kv: &dyn KeyValueStore, key: &str, decode: F) -> (T, Durability)
where
    T: Default,
    F: FnOnce(&str) -> Result<T, CodecError>,
{
    match kv.get(key).await {
        Ok(None) => {
            tracing::debug!(key, "nothing stored; starting fresh");
            (T::default(), Durability::connected())
        }
        Ok(Some(raw)) => match decode(&raw) {
            Ok(value) => (value, Durability::connected()),
            Err(err @ CodecError::UnsupportedVersion { .. }) => {
                tracing::warn!(key, error = %err, "stored value left untouched; changes kept in memory only");
                (T::default(), Durability::memory_only())
            }
            Err(err) => {
                tracing::warn!(key, error = %err, "stored value unreadable; using defaults");
                (T::default(), Durability::connected())
            }
        },
        Err(err) => {
            tracing::warn!(key, error = %err, "storage unavailable; changes kept in memory only");
            (T::default(), Durability::memory_only())
        }
    }
}

/// Tracks whether the last write reached durable storage.
#[derive(Debug)]
pub(crate) struct Durability {
    durable: AtomicBool,
    writes_enabled: bool,
}

impl Durability {
    pub(crate) fn connected() -> Self {
        Self {
            durable: AtomicBool::new(true),
            writes_enabled: true,
        }
    }

    /// Never writes; the stored value was not loaded and must not be replaced.
    pub(crate) fn memory_only() -> Self {
        Self {
            durable: AtomicBool::new(false),
            writes_enabled: false,
        }
    }

    pub(crate) fn is_durable(&self) -> bool {
        self.durable.load(Ordering::Acquire)
    }

    pub(crate) fn mark_degraded(&self) {
        self.durable.store(false, Ordering::Release);
    }

    /// Writes `value` under `key`. Failures are logged and leave the caller in
    /// memory-only mode until a later write succeeds.
    pub(crate) async fn write(&self, kv: &dyn KeyValueStore, key: &str, value: &str) {
        if !self.writes_enabled {
            tracing::trace!(key, "memory-only session; write skipped");
            return;
        }
        match kv.set(key, value).await {
            Ok(()) => {
                if !self.durable.swap(true, Ordering::AcqRel) {
                    tracing::info!(key, "durable storage available again");
                }
            }
            Err(err) => {
                if self.durable.swap(false, Ordering::AcqRel) {
                    tracing::warn!(key, error = %err, "storage write failed; continuing in memory only");
                } else {
                    tracing::debug!(key, error = %err, "storage write failed again");
                }
            }
        }
    }
}
