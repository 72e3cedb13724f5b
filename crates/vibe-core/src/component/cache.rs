//! Bounded cache of compiled components keyed by exact source text.

use std::num::NonZeroUsize;
use std::sync::{Arc, PoisonError, RwLock};

use lru::LruCache;

use super::engine::Component;

pub const DEFAULT_CACHE_CAPACITY: usize = 64;

/// Least-recently-used cache of successfully compiled components.
///
/// Cloning shares the underlying storage. Only successes are ever inserted;
/// a hit returns the same `Arc` that was stored.
#[derive(Clone)]
pub struct ComponentCache {
    entries: Arc<RwLock<LruCache<String, Arc<dyn Component>>>>,
}

impl ComponentCache {
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Arc::new(RwLock::new(LruCache::new(capacity))),
        }
    }

    /// Looks up `source`, marking it most recently used.
    pub fn get(&self, source: &str) -> Option<Arc<dyn Component>> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .get(source)
            .cloned()
    }

    /// Whether `source` is cached, without touching recency.
    pub fn contains(&self, source: &str) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(source)
    }

    /// Inserts `component`, returning whatever was evicted to make room.
    pub fn insert(
        &self,
        source: String,
        component: Arc<dyn Component>,
    ) -> Option<(String, Arc<dyn Component>)> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if entries.contains(&source) {
            entries.put(source, component);
            return None;
        }
        entries.push(source, component)
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .cap()
            .get()
    }

    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl Default for ComponentCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl std::fmt::Debug for ComponentCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentCache")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .finish()
    }
}
