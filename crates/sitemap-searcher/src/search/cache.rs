//! Opt-in memoization of resolved URL sets per base URL.
//!
//! No TTL or eviction: callers invalidate explicitly.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

/// A resolved site held in the cache.
#[derive(Debug, Clone)]
pub struct CachedResolution {
    pub seeds: BTreeSet<String>,
    pub seeds_from_robots: bool,
    pub urls: Arc<HashSet<String>>,
    pub cached_at: DateTime<Utc>,
}

/// Concurrent map from normalized base URL to its resolved URL set.
#[derive(Debug, Default)]
pub struct ResolvedSetCache {
    entries: DashMap<String, CachedResolution>,
}

impl ResolvedSetCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, base: &str) -> Option<CachedResolution> {
        self.entries.get(base).map(|e| e.value().clone())
    }

    pub fn insert(
        &self,
        base: impl Into<String>,
        seeds: BTreeSet<String>,
        seeds_from_robots: bool,
        urls: Arc<HashSet<String>>,
    ) {
        self.entries.insert(
            base.into(),
            CachedResolution {
                seeds,
                seeds_from_robots,
                urls,
                cached_at: Utc::now(),
            },
        );
    }

    /// Drop one base URL. Returns whether it was cached.
    pub fn invalidate(&self, base: &str) -> bool {
        self.entries.remove(base).is_some()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_get_invalidate() {
        let cache = ResolvedSetCache::new();
        let urls = Arc::new(HashSet::from(["https://ex.com/a".to_string()]));
        let seeds = BTreeSet::from(["https://ex.com/sitemap.xml".to_string()]);

        cache.insert("https://ex.com/", seeds.clone(), true, urls.clone());
        let hit = cache.get("https://ex.com/").unwrap();
        assert_eq!(hit.urls, urls);
        assert_eq!(hit.seeds, seeds);
        assert!(hit.seeds_from_robots);

        assert!(cache.invalidate("https://ex.com/"));
        assert!(!cache.invalidate("https://ex.com/"));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_clear() {
        let cache = ResolvedSetCache::new();
        cache.insert("https://a.com/", BTreeSet::new(), false, Arc::default());
        cache.insert("https://b.com/", BTreeSet::new(), false, Arc::default());
        assert_eq!(cache.len(), 2);
        cache.clear();
        assert!(cache.get("https://a.com/").is_none());
    }
}
