use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::thread::{self, ThreadId};

use tracing::debug;

use crate::binary::BinaryStore;
use crate::error::{StoreError, StoreResult};
use crate::temp::TempFileProvider;

/// File name prefix for store backing files.
pub const STORE_FILE_PREFIX: &str = "resolution";
/// File name suffix for store backing files.
pub const STORE_FILE_SUFFIX: &str = ".bin";

/// Registry key: one store exists per logical id per thread.
///
/// Keying on the thread keeps the hot write path uncontended; each worker
/// streams to its own file.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StoreKey {
    /// Caller-chosen logical identifier.
    pub id: String,
    /// The thread that acquired the store.
    pub thread: ThreadId,
}

impl StoreKey {
    fn current(id: &str) -> Self {
        Self {
            id: id.to_string(),
            thread: thread::current().id(),
        }
    }
}

/// All binary stores of one resolution session.
///
/// Owned by the session, never process-global. `acquire` hands out stores
/// keyed by (id, calling thread); `close_all` reclaims every backing file at
/// the end of resolution.
pub struct StoreRegistry {
    provider: Arc<dyn TempFileProvider>,
    stores: RwLock<HashMap<StoreKey, Arc<BinaryStore>>>,
}

impl StoreRegistry {
    /// Create an empty registry allocating files through `provider`.
    pub fn new(provider: Arc<dyn TempFileProvider>) -> Self {
        Self {
            provider,
            stores: RwLock::new(HashMap::new()),
        }
    }

    /// Return the store for (`id`, calling thread), creating it on first use.
    ///
    /// Existing keys are served off a read lock. Creation takes the write
    /// lock and re-checks the map first, so exactly one store is ever
    /// created per key.
    pub fn acquire(&self, id: &str) -> StoreResult<Arc<BinaryStore>> {
        let key = StoreKey::current(id);

        {
            let stores = self.stores.read().expect("registry lock poisoned");
            if let Some(store) = stores.get(&key) {
                return Ok(Arc::clone(store));
            }
        }

        let mut stores = self.stores.write().expect("registry lock poisoned");
        if let Some(store) = stores.get(&key) {
            return Ok(Arc::clone(store));
        }

        let path = self
            .provider
            .create_temp_file(STORE_FILE_PREFIX, STORE_FILE_SUFFIX)
            .map_err(|source| StoreError::Allocation { source })?;
        debug!(id, thread = ?key.thread, file = %path.display(), "created binary store");

        let store = Arc::new(BinaryStore::create(path)?);
        stores.insert(key, Arc::clone(&store));
        Ok(store)
    }

    /// Close every registered store and forget them all.
    ///
    /// Every store's close is attempted regardless of earlier failures; the
    /// first error, if any, is returned once all attempts are done.
    pub fn close_all(&self) -> StoreResult<()> {
        let stores: Vec<Arc<BinaryStore>> = {
            let mut map = self.stores.write().expect("registry lock poisoned");
            map.drain().map(|(_, store)| store).collect()
        };

        let mut result = Ok(());
        for store in &stores {
            if let Err(e) = store.close() {
                if result.is_ok() {
                    result = Err(e);
                }
            }
        }

        debug!(stores = stores.len(), "closed all binary stores");
        result
    }

    /// Number of stores currently registered.
    pub fn store_count(&self) -> usize {
        self.stores.read().expect("registry lock poisoned").len()
    }

    /// Returns `true` if no store has been acquired (or all were closed).
    pub fn is_empty(&self) -> bool {
        self.stores.read().expect("registry lock poisoned").is_empty()
    }
}

impl std::fmt::Debug for StoreRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreRegistry")
            .field("store_count", &self.store_count())
            .finish()
    }
}
