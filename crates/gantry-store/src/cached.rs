use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use tracing::debug;

/// Shared state behind one cache family.
struct CacheInner<V> {
    slots: RwLock<HashMap<String, V>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

/// One family of whole-object caches, keyed by configuration path.
///
/// The factory owns the slots; [`CachedStore`] handles are cheap views bound
/// to a single path. Hit/miss counts accumulate across all handles and are
/// reported when the family closes, which is how cache effectiveness gets
/// surfaced per resolution session.
pub struct CachedStoreFactory<V> {
    display_name: String,
    inner: Arc<CacheInner<V>>,
}

impl<V> CachedStoreFactory<V> {
    /// Create an empty cache family. `display_name` labels the close-time
    /// statistics (for example `"resolution result"`).
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            inner: Arc::new(CacheInner {
                slots: RwLock::new(HashMap::new()),
                hits: AtomicU64::new(0),
                misses: AtomicU64::new(0),
            }),
        }
    }

    /// Hand out a cache handle scoped to one configuration path.
    pub fn create_cached_store(&self, path: impl Into<String>) -> CachedStore<V> {
        CachedStore {
            path: path.into(),
            inner: Arc::clone(&self.inner),
        }
    }

    /// Log the accumulated statistics and drop all cached values.
    /// Idempotent.
    pub fn close(&self) {
        let mut slots = self.inner.slots.write().expect("cache lock poisoned");
        debug!(
            cache = %self.display_name,
            entries = slots.len(),
            hits = self.inner.hits.load(Ordering::Relaxed),
            misses = self.inner.misses.load(Ordering::Relaxed),
            "cache closed"
        );
        slots.clear();
    }

    /// Number of values currently cached across all paths.
    pub fn entry_count(&self) -> usize {
        self.inner.slots.read().expect("cache lock poisoned").len()
    }

    /// Loads answered from the cache so far.
    pub fn hits(&self) -> u64 {
        self.inner.hits.load(Ordering::Relaxed)
    }

    /// Loads that had to invoke the producer so far.
    pub fn misses(&self) -> u64 {
        self.inner.misses.load(Ordering::Relaxed)
    }
}

impl<V> std::fmt::Debug for CachedStoreFactory<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedStoreFactory")
            .field("display_name", &self.display_name)
            .field("entries", &self.entry_count())
            .finish()
    }
}

/// Get-or-compute cache over one configuration path's slot.
pub struct CachedStore<V> {
    path: String,
    inner: Arc<CacheInner<V>>,
}

impl<V: Clone> CachedStore<V> {
    /// Return the cached value for this path, computing it on first use.
    ///
    /// When two threads race the first load, both may run `produce`, but the
    /// first inserted value wins and every caller observes it.
    pub fn load<F: FnOnce() -> V>(&self, produce: F) -> V {
        {
            let slots = self.inner.slots.read().expect("cache lock poisoned");
            if let Some(value) = slots.get(&self.path) {
                self.inner.hits.fetch_add(1, Ordering::Relaxed);
                return value.clone();
            }
        }

        let value = produce();
        self.inner.misses.fetch_add(1, Ordering::Relaxed);
        let mut slots = self.inner.slots.write().expect("cache lock poisoned");
        slots.entry(self.path.clone()).or_insert(value).clone()
    }
}

impl<V> CachedStore<V> {
    /// The configuration path this handle is bound to.
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl<V> std::fmt::Debug for CachedStore<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedStore").field("path", &self.path).finish()
    }
}
