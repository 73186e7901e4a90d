use std::sync::Arc;
use std::time::Instant;

use tracing::info;

use crate::binary::BinaryStore;
use crate::cached::{CachedStore, CachedStoreFactory};
use crate::error::StoreResult;
use crate::registry::StoreRegistry;
use crate::temp::TempFileProvider;

/// Everything the resolution engine persists during one session: the binary
/// store registry plus the two whole-object cache families (`O` is the
/// resolution result model, `N` the resolved configuration model).
///
/// Created at the start of a resolution, closed once at the end. Closing
/// reclaims every temporary file and reports cache effectiveness.
pub struct ResultsStoreFactory<O, N> {
    registry: StoreRegistry,
    old_model_cache: CachedStoreFactory<O>,
    new_model_cache: CachedStoreFactory<N>,
}

impl<O, N> ResultsStoreFactory<O, N> {
    /// Create a factory allocating backing files through `provider`.
    pub fn new(provider: Arc<dyn TempFileProvider>) -> Self {
        Self {
            registry: StoreRegistry::new(provider),
            old_model_cache: CachedStoreFactory::new("resolution result"),
            new_model_cache: CachedStoreFactory::new("resolved configuration"),
        }
    }

    /// The binary store for (`id`, calling thread). See [`StoreRegistry::acquire`].
    pub fn create_binary_store(&self, id: &str) -> StoreResult<Arc<BinaryStore>> {
        self.registry.acquire(id)
    }

    /// Cache handle for resolution result models under one configuration path.
    pub fn create_old_model_cache(&self, path: impl Into<String>) -> CachedStore<O> {
        self.old_model_cache.create_cached_store(path)
    }

    /// Cache handle for resolved configuration models under one configuration path.
    pub fn create_new_model_cache(&self, path: impl Into<String>) -> CachedStore<N> {
        self.new_model_cache.create_cached_store(path)
    }

    /// Close the registry and both cache families.
    ///
    /// All three are closed even if one fails; the first failure is returned
    /// afterward. Idempotent.
    pub fn close(&self) -> StoreResult<()> {
        let start = Instant::now();
        let stores = self.registry.store_count();

        let result = self.registry.close_all();
        self.old_model_cache.close();
        self.new_model_cache.close();

        info!(
            stores,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "closed resolution result stores"
        );
        result
    }
}

impl<O, N> std::fmt::Debug for ResultsStoreFactory<O, N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultsStoreFactory")
            .field("stores", &self.registry.store_count())
            .finish()
    }
}
