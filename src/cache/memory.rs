use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard};

use lru::LruCache;

use crate::cache::{CachedRender, RenderCache};
use crate::error::{RenderError, RenderResult};

/// In-memory LRU store for rendered components.
///
/// Safe to share behind an `Arc` between concurrent render operations.
#[derive(Debug)]
pub struct LruRenderCache {
    entries: Mutex<LruCache<String, CachedRender>>,
}

impl LruRenderCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn with_capacity(capacity: usize) -> RenderResult<Self> {
        let capacity = NonZeroUsize::new(capacity)
            .ok_or_else(|| RenderError::config("cache capacity must be greater than 0"))?;
        Ok(Self::new(capacity))
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A poisoned lock only means another render panicked mid-access; the
    // map itself is still consistent.
    fn lock(&self) -> MutexGuard<'_, LruCache<String, CachedRender>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl RenderCache for LruRenderCache {
    fn get(&self, key: &str) -> Option<CachedRender> {
        self.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: CachedRender) -> anyhow::Result<()> {
        self.lock().put(key.to_string(), value);
        Ok(())
    }

    fn supports_has(&self) -> bool {
        true
    }

    fn has(&self, key: &str) -> bool {
        self.lock().contains(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ComponentId;

    fn entry(html: &str, components: &[&str]) -> CachedRender {
        CachedRender {
            html: html.to_string(),
            components: components.iter().map(|c| ComponentId::from(*c)).collect(),
        }
    }

    #[test]
    fn test_zero_capacity_is_rejected() {
        assert!(matches!(
            LruRenderCache::with_capacity(0),
            Err(RenderError::Config(_))
        ));
    }

    #[test]
    fn test_set_then_get() {
        let cache = LruRenderCache::with_capacity(4).unwrap();
        cache.set("a", entry("<a/>", &["A"])).unwrap();
        assert!(cache.has("a"));
        assert_eq!(cache.get("a"), Some(entry("<a/>", &["A"])));
        assert_eq!(cache.get("b"), None);
    }

    #[test]
    fn test_last_write_wins() {
        let cache = LruRenderCache::with_capacity(4).unwrap();
        cache.set("a", entry("first", &[])).unwrap();
        cache.set("a", entry("second", &[])).unwrap();
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("a").unwrap().html, "second");
    }

    #[test]
    fn test_least_recently_used_is_evicted() {
        let cache = LruRenderCache::with_capacity(2).unwrap();
        cache.set("a", entry("a", &[])).unwrap();
        cache.set("b", entry("b", &[])).unwrap();
        // Touch `a` so `b` becomes the eviction candidate.
        cache.get("a");
        cache.set("c", entry("c", &[])).unwrap();

        assert!(cache.has("a"));
        assert!(!cache.has("b"));
        assert!(cache.has("c"));
    }
}
