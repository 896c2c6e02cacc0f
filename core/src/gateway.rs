//! Persistence gateway contract and in-process implementations.
//!
//! The engine never talks to storage directly. It is handed a
//! [`PersistenceGateway`], a key-value capability with asynchronous
//! `save`/`load`, and treats both calls as potentially slow. Storage crates
//! provide file and SQLite backends; this module provides:
//!
//! - [`MemoryGateway`]: an in-memory map, with a switch to make every call
//!   fail (useful for exercising error paths).
//! - [`Delayed`]: a decorator that adds a fixed latency to every call.
//!
//! # Example
//!
//! ```
//! use form_schema_core::{MemoryGateway, PersistenceGateway};
//! use serde_json::json;
//!
//! let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! rt.block_on(async {
//!     let gateway = MemoryGateway::new();
//!     gateway.save("savedSchemas", json!([])).await.unwrap();
//!     assert_eq!(gateway.load("savedSchemas").await.unwrap(), Some(json!([])));
//!     assert_eq!(gateway.load("missing").await.unwrap(), None);
//! });
//! ```

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::PersistenceError;

/// Asynchronous key-value storage used to persist saved schemas.
///
/// Implementations must not expose partially written values: a `load`
/// observes either the previous or the new value of a concurrent `save`.
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// Stores `value` under `key`, replacing any previous value.
    async fn save(&self, key: &str, value: Value) -> Result<(), PersistenceError>;

    /// Returns the value stored under `key`, or `None` if nothing is stored.
    async fn load(&self, key: &str) -> Result<Option<Value>, PersistenceError>;
}

/// In-memory gateway.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    entries: Mutex<HashMap<String, Value>>,
    failing: AtomicBool,
}

/// Error reported by a [`MemoryGateway`] switched into failure mode.
#[derive(Debug, thiserror::Error)]
#[error("memory gateway is set to fail")]
pub struct SimulatedFailure;

impl MemoryGateway {
    /// Creates an empty gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Returns a copy of the value under `key` without going through the
    /// async contract.
    pub fn peek(&self, key: &str) -> Option<Value> {
        self.lock().get(key).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Value>> {
        // A poisoned map still holds whole values; recover it.
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn check_failing(&self) -> Result<(), PersistenceError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(PersistenceError::backend(SimulatedFailure))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl PersistenceGateway for MemoryGateway {
    async fn save(&self, key: &str, value: Value) -> Result<(), PersistenceError> {
        self.check_failing()?;
        self.lock().insert(key.to_string(), value);
        Ok(())
    }

    async fn load(&self, key: &str) -> Result<Option<Value>, PersistenceError> {
        self.check_failing()?;
        Ok(self.lock().get(key).cloned())
    }
}

/// Adds a fixed delay before every call of the wrapped gateway.
#[derive(Debug)]
pub struct Delayed<G> {
    inner: G,
    latency: Duration,
}

impl<G> Delayed<G> {
    /// Wraps `inner`, delaying each call by `latency`.
    pub fn new(inner: G, latency: Duration) -> Self {
        Self { inner, latency }
    }

    /// Returns the wrapped gateway.
    pub fn inner(&self) -> &G {
        &self.inner
    }

    /// Returns the configured latency.
    pub fn latency(&self) -> Duration {
        self.latency
    }
}

#[async_trait]
impl<G: PersistenceGateway> PersistenceGateway for Delayed<G> {
    async fn save(&self, key: &str, value: Value) -> Result<(), PersistenceError> {
        debug!(key, latency_ms = self.latency.as_millis() as u64, "delaying save");
        tokio::time::sleep(self.latency).await;
        self.inner.save(key, value).await
    }

    async fn load(&self, key: &str) -> Result<Option<Value>, PersistenceError> {
        debug!(key, latency_ms = self.latency.as_millis() as u64, "delaying load");
        tokio::time::sleep(self.latency).await;
        self.inner.load(key).await
    }
}
