//! Content-addressed query cache.
//!
//! Entries are keyed by a [`CacheKey`]: a tag naming the query family
//! (`"articles"`, `"bookmarks"`, ...) plus a SHA-256 digest of the full
//! request descriptor. Each entry carries its own freshness window; reads
//! past the window still return the value as [`Lookup::Stale`] so views can
//! keep showing it while a refresh runs. Mutations invalidate by key or by
//! tag. Capacity is bounded with LRU eviction.
//!
//! Time is passed in explicitly so expiry is testable without sleeping.

use lru::LruCache;
use sha2::{Digest, Sha256};
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

/// Default number of entries kept across all query families.
pub const DEFAULT_CAPACITY: usize = 256;

/// Identity of one cached query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    tag: &'static str,
    digest: String,
}

impl CacheKey {
    /// Hash `parts` under `tag`.
    ///
    /// Each part is length-prefixed before hashing so `["ab", "c"]` and
    /// `["a", "bc"]` produce different keys.
    pub fn new(tag: &'static str, parts: &[&str]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(tag.as_bytes());
        for part in parts {
            hasher.update((part.len() as u64).to_le_bytes());
            hasher.update(part.as_bytes());
        }
        Self {
            tag,
            digest: format!("{:x}", hasher.finalize()),
        }
    }

    pub fn tag(&self) -> &'static str {
        self.tag
    }

    pub fn digest(&self) -> &str {
        &self.digest
    }
}

/// Result of a cache read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<V> {
    /// Within its freshness window.
    Fresh(V),
    /// Past its window; show it and refresh in the background.
    Stale(V),
    Miss,
}

impl<V> Lookup<V> {
    pub fn value(self) -> Option<V> {
        match self {
            Lookup::Fresh(v) | Lookup::Stale(v) => Some(v),
            Lookup::Miss => None,
        }
    }

    pub fn is_fresh(&self) -> bool {
        matches!(self, Lookup::Fresh(_))
    }
}

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    stored_at: Instant,
    ttl: Duration,
}

/// Bounded TTL cache for query results.
#[derive(Debug)]
pub struct QueryCache<V> {
    entries: LruCache<CacheKey, Entry<V>>,
}

impl<V: Clone> QueryCache<V> {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: LruCache::new(capacity),
        }
    }

    /// Read `key` as of `now`, promoting it in the LRU order.
    pub fn lookup(&mut self, key: &CacheKey, now: Instant) -> Lookup<V> {
        match self.entries.get(key) {
            Some(entry) if now.saturating_duration_since(entry.stored_at) < entry.ttl => {
                Lookup::Fresh(entry.value.clone())
            }
            Some(entry) => Lookup::Stale(entry.value.clone()),
            None => Lookup::Miss,
        }
    }

    /// Store `value`, replacing any previous entry for `key`.
    pub fn insert(&mut self, key: &CacheKey, value: V, ttl: Duration, now: Instant) {
        self.entries.put(
            key.clone(),
            Entry {
                value,
                stored_at: now,
                ttl,
            },
        );
    }

    /// Drop one entry. Returns whether it existed.
    pub fn invalidate(&mut self, key: &CacheKey) -> bool {
        self.entries.pop(key).is_some()
    }

    /// Drop every entry under `tag`, returning how many were removed.
    pub fn invalidate_tag(&mut self, tag: &str) -> usize {
        let doomed: Vec<CacheKey> = self
            .entries
            .iter()
            .filter(|(key, _)| key.tag == tag)
            .map(|(key, _)| key.clone())
            .collect();
        for key in &doomed {
            self.entries.pop(key);
        }
        if !doomed.is_empty() {
            tracing::debug!(tag, removed = doomed.len(), "Invalidated cache tag");
        }
        doomed.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V: Clone> Default for QueryCache<V> {
    fn default() -> Self {
        Self::new(NonZeroUsize::new(DEFAULT_CAPACITY).unwrap_or(NonZeroUsize::MIN))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache(capacity: usize) -> QueryCache<u32> {
        QueryCache::new(NonZeroUsize::new(capacity).unwrap())
    }

    #[test]
    fn keys_are_content_addressed() {
        let a = CacheKey::new("articles", &["ai", "all", "1"]);
        let b = CacheKey::new("articles", &["ai", "all", "1"]);
        let c = CacheKey::new("articles", &["ai", "all", "2"]);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.digest().len(), 64);
    }

    #[test]
    fn keys_separate_parts_and_tags() {
        assert_ne!(
            CacheKey::new("articles", &["ab", "c"]),
            CacheKey::new("articles", &["a", "bc"])
        );
        assert_ne!(
            CacheKey::new("articles", &["1"]).digest(),
            CacheKey::new("bookmarks", &["1"]).digest()
        );
    }

    #[test]
    fn fresh_then_stale() {
        let mut c = cache(4);
        let t0 = Instant::now();
        let key = CacheKey::new("articles", &["1"]);
        assert_eq!(c.lookup(&key, t0), Lookup::Miss);

        c.insert(&key, 7, Duration::from_secs(300), t0);
        assert_eq!(c.lookup(&key, t0 + Duration::from_secs(299)), Lookup::Fresh(7));
        assert_eq!(c.lookup(&key, t0 + Duration::from_secs(300)), Lookup::Stale(7));
    }

    #[test]
    fn invalidate_by_tag_leaves_other_tags() {
        let mut c = cache(8);
        let now = Instant::now();
        let ttl = Duration::from_secs(30);
        c.insert(&CacheKey::new("bookmarks", &["u1"]), 1, ttl, now);
        c.insert(&CacheKey::new("bookmarks", &["u2"]), 2, ttl, now);
        c.insert(&CacheKey::new("articles", &["1"]), 3, ttl, now);

        assert_eq!(c.invalidate_tag("bookmarks"), 2);
        assert_eq!(c.len(), 1);
        assert_eq!(c.invalidate_tag("bookmarks"), 0);
        assert!(c.lookup(&CacheKey::new("articles", &["1"]), now).is_fresh());
    }

    #[test]
    fn invalidate_single_key() {
        let mut c = cache(4);
        let now = Instant::now();
        let key = CacheKey::new("bookmark-status", &["42", "user_x"]);
        c.insert(&key, 1, Duration::from_secs(30), now);
        assert!(c.invalidate(&key));
        assert!(!c.invalidate(&key));
        assert_eq!(c.lookup(&key, now), Lookup::Miss);
    }

    #[test]
    fn evicts_least_recently_used() {
        let mut c = cache(2);
        let now = Instant::now();
        let ttl = Duration::from_secs(60);
        let (a, b, d) = (
            CacheKey::new("t", &["a"]),
            CacheKey::new("t", &["b"]),
            CacheKey::new("t", &["d"]),
        );
        c.insert(&a, 1, ttl, now);
        c.insert(&b, 2, ttl, now);
        let _ = c.lookup(&a, now);
        c.insert(&d, 3, ttl, now);
        assert_eq!(c.lookup(&b, now), Lookup::Miss);
        assert_eq!(c.lookup(&a, now).value(), Some(1));
    }
}
