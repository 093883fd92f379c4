//! Per-domain robots.txt cache
//!
//! Holds one entry per recently seen domain in a bounded LRU. Each entry sits
//! behind its own async mutex so robots acquisition, the crawl-delay check and
//! the `last_crawled` claim for a domain happen under a single lock.

use crate::robots::ParsedRobots;
use crate::storage::DomainRecord;
use chrono::{DateTime, Utc};
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::Arc;

/// What the crawler knows about one domain
#[derive(Debug, Default)]
pub struct DomainEntry {
    /// Parsed robots.txt, `None` until it has been acquired
    pub robots: Option<ParsedRobots>,

    /// The stored record, if the domain was persisted
    pub record: Option<DomainRecord>,

    /// When a page of this domain was last fetched
    pub last_crawled: Option<DateTime<Utc>>,
}

impl DomainEntry {
    /// Builds an entry from a record loaded from storage
    pub fn from_record(record: DomainRecord) -> Self {
        Self {
            robots: Some(ParsedRobots::from_content(&record.robots)),
            last_crawled: record.last_crawled,
            record: Some(record),
        }
    }

    /// Returns true once robots.txt has been acquired
    pub fn is_resolved(&self) -> bool {
        self.robots.is_some()
    }
}

/// Shared handle to a domain entry
pub type SharedDomainEntry = Arc<tokio::sync::Mutex<DomainEntry>>;

/// Bounded LRU of domain entries keyed by lowercased domain
pub struct RobotsCache {
    entries: Mutex<LruCache<String, SharedDomainEntry>>,
}

impl RobotsCache {
    /// Creates a cache holding at most `capacity` domains (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Returns the entry for `domain`, inserting an unresolved one if absent
    ///
    /// The returned handle stays valid after eviction; a later call for the
    /// same domain then starts from a fresh entry.
    pub fn entry(&self, domain: &str) -> SharedDomainEntry {
        let key = domain.to_lowercase();
        let mut entries = self.entries.lock();

        if let Some(entry) = entries.get(&key) {
            return Arc::clone(entry);
        }

        let entry = Arc::new(tokio::sync::Mutex::new(DomainEntry::default()));
        entries.put(key, Arc::clone(&entry));
        entry
    }

    /// Returns true if the domain is currently cached
    pub fn contains(&self, domain: &str) -> bool {
        self.entries.lock().contains(&domain.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.lock().cap().get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_entry_is_shared() {
        let cache = RobotsCache::new(4);

        let first = cache.entry("example.com");
        first.lock().await.robots = Some(ParsedRobots::allow_all());

        let second = cache.entry("EXAMPLE.com");
        assert!(Arc::ptr_eq(&first, &second));
        assert!(second.lock().await.is_resolved());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_least_recently_used_is_evicted() {
        let cache = RobotsCache::new(2);

        cache.entry("a.com");
        cache.entry("b.com");
        cache.entry("a.com");
        cache.entry("c.com");

        assert!(cache.contains("a.com"));
        assert!(!cache.contains("b.com"));
        assert!(cache.contains("c.com"));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let cache = RobotsCache::new(0);
        assert_eq!(cache.capacity(), 1);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_entry_from_record() {
        let now = Utc::now();
        let entry = DomainEntry::from_record(DomainRecord {
            id: 7,
            domain: "example.com".to_string(),
            robots: "User-agent: *\nDisallow: /".to_string(),
            last_crawled: Some(now),
        });

        assert!(entry.is_resolved());
        assert_eq!(entry.last_crawled, Some(now));
        assert!(!entry
            .robots
            .as_ref()
            .unwrap()
            .is_allowed("https://example.com/", "OWS-CRAWLER"));
    }
}
