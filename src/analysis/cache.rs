use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;

use crate::analysis::AnalysisReport;
use crate::types::CacheKey;

/// Default number of reports kept before eviction.
const DEFAULT_CAPACITY: usize = 16;

/// Bounded in-process cache of analysis reports, keyed by the filter set.
///
/// For embedding hosts that re-analyze interactively (switching filters
/// back and forth) without re-running collection. Reports are shared out
/// as `Arc`s; nothing is persisted across processes, and the one-shot
/// entry points never consult this cache.
pub struct CacheManager {
    cache: LruCache<CacheKey, Arc<AnalysisReport>>,
}

impl CacheManager {
    /// Create a cache manager with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a cache manager holding at most `capacity` reports.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: LruCache::new(capacity),
        }
    }

    /// Store a report, evicting the least recently used entry if full.
    pub fn store(&mut self, key: CacheKey, report: AnalysisReport) -> Arc<AnalysisReport> {
        let report = Arc::new(report);
        self.cache.put(key, Arc::clone(&report));
        report
    }

    /// Retrieve a report, refreshing its recency.
    pub fn get(&mut self, key: &CacheKey) -> Option<Arc<AnalysisReport>> {
        self.cache.get(key).cloned()
    }

    /// Drop every cached report.
    pub fn clear(&mut self) {
        self.cache.clear();
    }

    /// Number of cached reports.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

impl Default for CacheManager {
    fn default() -> Self {
        Self::new()
    }
}
