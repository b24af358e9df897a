/// In-process refresh-token cache
///
/// Keys are hashed onto a fixed set of segments, each guarded by its own
/// lock and holding an equal share of the byte budget. When a segment is
/// full its least recently used entries are dropped, which makes the whole
/// cache approximately LRU. Capacity eviction and explicit deletion look the
/// same to callers: both surface as `NotFound`.

use std::collections::hash_map::RandomState;
use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

const SEGMENT_COUNT: usize = 256;
/// Smallest total budget the cache accepts
const MIN_CAPACITY: usize = 512 * 1024;
/// Bookkeeping bytes charged per entry on top of key and value
const ENTRY_OVERHEAD: usize = 24;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CacheError {
    #[error("entry not found")]
    NotFound,
    /// The entry is larger than one segment's share of the budget, not the whole budget
    #[error("entry of {size} bytes exceeds per-segment capacity of {capacity} bytes")]
    EntryTooLarge { size: usize, capacity: usize },
}

/// Key/value store used for refresh tokens
///
/// A distributed implementation can stand in for [`MemoryCache`] as long as
/// `del` stays atomic with respect to `get`.
pub trait CacheRepository: Send + Sync {
    /// Store `value` under `key`. `ttl_seconds == 0` means no expiry.
    ///
    /// For [`MemoryCache`] the size limit of a single entry is its segment's
    /// share of the budget (`capacity / 256`), so a 512 KiB cache rejects
    /// entries above 2 KiB with `EntryTooLarge`.
    fn set(&self, key: &[u8], value: &[u8], ttl_seconds: u32) -> Result<(), CacheError>;
    fn get(&self, key: &[u8]) -> Result<Vec<u8>, CacheError>;
    /// Remove `key`, returning whether it was present
    fn del(&self, key: &[u8]) -> bool;
}

struct Entry {
    value: Vec<u8>,
    expires_at: Option<Instant>,
    stamp: u64,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

fn entry_size(key: &[u8], value: &[u8]) -> usize {
    key.len() + value.len() + ENTRY_OVERHEAD
}

struct Segment {
    entries: HashMap<Vec<u8>, Entry>,
    /// access stamp -> key, oldest first
    recency: BTreeMap<u64, Vec<u8>>,
    used: usize,
    capacity: usize,
    clock: u64,
}

impl Segment {
    fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            recency: BTreeMap::new(),
            used: 0,
            capacity,
            clock: 0,
        }
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn remove(&mut self, key: &[u8]) -> Option<Entry> {
        let entry = self.entries.remove(key)?;
        self.recency.remove(&entry.stamp);
        self.used -= entry_size(key, &entry.value);
        Some(entry)
    }

    fn evict_oldest(&mut self) -> bool {
        let Some((_, key)) = self.recency.pop_first() else {
            return false;
        };
        if let Some(entry) = self.entries.remove(&key) {
            self.used -= entry_size(&key, &entry.value);
        }
        true
    }

    fn set(&mut self, key: &[u8], value: &[u8], ttl: Option<Duration>) -> Result<(), CacheError> {
        let size = entry_size(key, value);
        if size > self.capacity {
            return Err(CacheError::EntryTooLarge {
                size,
                capacity: self.capacity,
            });
        }

        self.remove(key);
        while self.used + size > self.capacity && self.evict_oldest() {}

        let stamp = self.tick();
        self.recency.insert(stamp, key.to_vec());
        self.entries.insert(
            key.to_vec(),
            Entry {
                value: value.to_vec(),
                expires_at: ttl.map(|ttl| Instant::now() + ttl),
                stamp,
            },
        );
        self.used += size;
        Ok(())
    }

    fn get(&mut self, key: &[u8]) -> Result<Vec<u8>, CacheError> {
        let now = Instant::now();
        let expired = match self.entries.get(key) {
            None => return Err(CacheError::NotFound),
            Some(entry) => entry.is_expired(now),
        };
        if expired {
            self.remove(key);
            return Err(CacheError::NotFound);
        }

        let stamp = self.tick();
        let entry = self.entries.get_mut(key).ok_or(CacheError::NotFound)?;
        self.recency.remove(&entry.stamp);
        entry.stamp = stamp;
        self.recency.insert(stamp, key.to_vec());
        Ok(entry.value.clone())
    }

    fn del(&mut self, key: &[u8]) -> bool {
        match self.remove(key) {
            Some(entry) => !entry.is_expired(Instant::now()),
            None => false,
        }
    }
}

pub struct MemoryCache {
    segments: Box<[Mutex<Segment>]>,
    hasher: RandomState,
}

impl MemoryCache {
    /// Cache with a total budget of `capacity` bytes (at least 512 KiB)
    pub fn new(capacity: usize) -> Self {
        Self::with_segments(capacity.max(MIN_CAPACITY), SEGMENT_COUNT)
    }

    pub(crate) fn with_segments(capacity: usize, segment_count: usize) -> Self {
        let segment_count = segment_count.max(1);
        let per_segment = capacity / segment_count;
        let segments = (0..segment_count)
            .map(|_| Mutex::new(Segment::new(per_segment)))
            .collect();

        Self {
            segments,
            hasher: RandomState::new(),
        }
    }

    fn segment(&self, key: &[u8]) -> &Mutex<Segment> {
        let index = self.hasher.hash_one(key) as usize % self.segments.len();
        &self.segments[index]
    }

    /// Number of stored entries, expired ones included until touched
    pub fn len(&self) -> usize {
        self.segments.iter().map(|s| s.lock().entries.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes currently charged against the budget
    pub fn used_bytes(&self) -> usize {
        self.segments.iter().map(|s| s.lock().used).sum()
    }
}

impl CacheRepository for MemoryCache {
    fn set(&self, key: &[u8], value: &[u8], ttl_seconds: u32) -> Result<(), CacheError> {
        let ttl = (ttl_seconds > 0).then(|| Duration::from_secs(u64::from(ttl_seconds)));
        self.segment(key).lock().set(key, value, ttl)
    }

    fn get(&self, key: &[u8]) -> Result<Vec<u8>, CacheError> {
        self.segment(key).lock().get(key)
    }

    fn del(&self, key: &[u8]) -> bool {
        self.segment(key).lock().del(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_set_get_del() {
        let cache = MemoryCache::new(0);

        cache.set(b"key", b"value", 0).unwrap();
        assert_eq!(cache.get(b"key").unwrap(), b"value");

        assert!(cache.del(b"key"));
        assert_eq!(cache.get(b"key"), Err(CacheError::NotFound));
        // idempotent
        assert!(!cache.del(b"key"));
    }

    #[test]
    fn test_overwrite_keeps_one_entry() {
        let cache = MemoryCache::new(0);
        cache.set(b"key", b"first", 0).unwrap();
        cache.set(b"key", b"second-value", 0).unwrap();

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(b"key").unwrap(), b"second-value");
        assert_eq!(cache.used_bytes(), entry_size(b"key", b"second-value"));
    }

    #[test]
    fn test_ttl_expiry() {
        let cache = MemoryCache::new(0);
        cache.set(b"short", b"v", 1).unwrap();
        cache.set(b"forever", b"v", 0).unwrap();

        std::thread::sleep(Duration::from_millis(1100));

        assert_eq!(cache.get(b"short"), Err(CacheError::NotFound));
        assert!(cache.get(b"forever").is_ok());
    }

    #[test]
    fn test_entry_too_large() {
        let cache = MemoryCache::with_segments(1024, 1);
        let big = vec![0u8; 2048];

        let result = cache.set(b"big", &big, 0);
        assert!(matches!(result, Err(CacheError::EntryTooLarge { .. })));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_entry_limit_is_per_segment() {
        let cache = MemoryCache::new(MIN_CAPACITY);
        let per_segment = MIN_CAPACITY / SEGMENT_COUNT;
        let value = vec![0u8; per_segment];

        // far below the total budget, still above one segment's share
        let result = cache.set(b"key", &value, 0);
        assert_eq!(
            result,
            Err(CacheError::EntryTooLarge {
                size: entry_size(b"key", &value),
                capacity: per_segment,
            })
        );

        let fits = vec![0u8; per_segment - ENTRY_OVERHEAD - 3];
        assert!(cache.set(b"key", &fits, 0).is_ok());
    }

    #[test]
    fn test_least_recently_used_is_evicted() {
        // room for exactly three 100-byte values
        let size = entry_size(b"k0", &[0u8; 100]);
        let cache = MemoryCache::with_segments(size * 3, 1);

        for key in [b"k0", b"k1", b"k2"] {
            cache.set(key, &[0u8; 100], 0).unwrap();
        }
        // touch k0 so k1 becomes the oldest
        cache.get(b"k0").unwrap();
        cache.set(b"k3", &[0u8; 100], 0).unwrap();

        assert!(cache.get(b"k0").is_ok());
        assert_eq!(cache.get(b"k1"), Err(CacheError::NotFound));
        assert!(cache.get(b"k2").is_ok());
        assert!(cache.get(b"k3").is_ok());
        assert!(cache.used_bytes() <= size * 3);
    }

    #[test]
    fn test_del_of_expired_entry_reports_absent() {
        let cache = MemoryCache::new(0);
        cache.set(b"key", b"v", 1).unwrap();
        std::thread::sleep(Duration::from_millis(1100));

        assert!(!cache.del(b"key"));
    }

    #[test]
    fn test_concurrent_access() {
        let cache = Arc::new(MemoryCache::new(0));

        std::thread::scope(|scope| {
            for t in 0..8 {
                let cache = cache.clone();
                scope.spawn(move || {
                    for i in 0..200 {
                        let key = format!("{t}-{i}");
                        cache.set(key.as_bytes(), key.as_bytes(), 0).unwrap();
                        assert_eq!(cache.get(key.as_bytes()).unwrap(), key.as_bytes());
                        if i % 2 == 0 {
                            assert!(cache.del(key.as_bytes()));
                        }
                    }
                });
            }
        });

        assert_eq!(cache.len(), 8 * 100);
    }

    #[test]
    fn test_only_one_del_wins() {
        let cache = MemoryCache::new(0);
        cache.set(b"handle", b"user", 0).unwrap();

        let wins: usize = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8).map(|_| scope.spawn(|| cache.del(b"handle"))).collect();
            handles.into_iter().map(|h| h.join().unwrap() as usize).sum()
        });

        assert_eq!(wins, 1);
    }
}
