//! Handle-keyed callback registry

use crate::error::{RegistryError, RegistryResult};
use dashmap::DashMap;
use once_cell::sync::Lazy;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Lazily created process-wide registry
///
/// ```
/// use rsbind_runtime::{CallbackRegistry, GlobalRegistry};
///
/// trait Listener: Send + Sync {
///     fn on_event(&self, code: i32);
/// }
///
/// static LISTENERS: GlobalRegistry<dyn Listener> = GlobalRegistry::new(CallbackRegistry::new);
///
/// assert!(LISTENERS.is_empty());
/// ```
pub type GlobalRegistry<T> = Lazy<CallbackRegistry<T>>;

/// Concurrent map from callback handles to live callbacks
///
/// Handles start at 1 and are never reused, so `0` can be used by callers
/// as "no callback". A removed handle stays dead.
pub struct CallbackRegistry<T: ?Sized> {
    entries: DashMap<u64, Arc<T>>,
    next_handle: AtomicU64,
}

impl<T: ?Sized> CallbackRegistry<T> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            next_handle: AtomicU64::new(1),
        }
    }

    /// Store `callback` and return its handle
    pub fn register(&self, callback: Arc<T>) -> u64 {
        let handle = self.next_handle.fetch_add(1, Ordering::SeqCst);
        self.entries.insert(handle, callback);
        tracing::debug!(handle, "registered callback");
        handle
    }

    /// Get the callback registered under `handle`
    pub fn get(&self, handle: u64) -> Option<Arc<T>> {
        self.entries.get(&handle).map(|r| r.clone())
    }

    /// Get the callback registered under `handle`, or an error naming it
    pub fn lookup(&self, handle: u64) -> RegistryResult<Arc<T>> {
        self.get(handle).ok_or(RegistryError::UnknownHandle(handle))
    }

    /// Get a callback that must still be registered.
    ///
    /// # Panics
    ///
    /// Panics if `handle` is unknown or was already removed. A trampoline
    /// invoked with a dead handle has no meaningful way to continue.
    pub fn expect_live(&self, handle: u64) -> Arc<T> {
        match self.lookup(handle) {
            Ok(callback) => callback,
            Err(e) => {
                tracing::error!(handle, "dispatch to dead callback");
                panic!("{e}")
            }
        }
    }

    /// Run `f` against the callback under `handle`
    ///
    /// The map is not locked while `f` runs, so `f` may register or remove
    /// callbacks itself.
    pub fn try_invoke<R>(&self, handle: u64, f: impl FnOnce(&T) -> R) -> RegistryResult<R> {
        let callback = self.lookup(handle)?;
        Ok(f(&callback))
    }

    /// Run `f` against a callback that must still be registered
    ///
    /// # Panics
    ///
    /// Panics under the same conditions as [`expect_live`](Self::expect_live).
    pub fn invoke<R>(&self, handle: u64, f: impl FnOnce(&T) -> R) -> R {
        let callback = self.expect_live(handle);
        f(&callback)
    }

    /// Remove and return the callback under `handle`
    pub fn remove(&self, handle: u64) -> Option<Arc<T>> {
        let removed = self.entries.remove(&handle).map(|(_, v)| v);
        if removed.is_some() {
            tracing::debug!(handle, "released callback");
        } else {
            tracing::warn!(handle, "release of unknown callback handle");
        }
        removed
    }

    /// Number of live callbacks
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: ?Sized> Default for CallbackRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}
