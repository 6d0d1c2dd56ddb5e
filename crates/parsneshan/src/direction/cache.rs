use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use super::Direction;

/// Number of leading characters used as the cache key.
pub const KEY_CHARS: usize = 32;

/// Prefix-keyed memo of classification results. Implementations must be
/// safe to share across threads; a miss only costs a rescan.
pub trait DirectionCache: Send + Sync {
    fn get(&self, key: &str) -> Option<Direction>;

    fn insert(&self, key: String, direction: Direction);
}

/// Never remembers anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCache;

impl DirectionCache for NoCache {
    fn get(&self, _key: &str) -> Option<Direction> {
        None
    }

    fn insert(&self, _key: String, _direction: Direction) {}
}

#[derive(Debug, Default)]
struct Entries {
    map: HashMap<String, Direction>,
    order: VecDeque<String>,
}

/// A capped map that evicts the oldest insertion first.
#[derive(Debug)]
pub struct BoundedCache {
    capacity: usize,
    entries: Mutex<Entries>,
}

impl BoundedCache {
    pub const DEFAULT_CAPACITY: usize = 1000;

    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Mutex::new(Entries::default()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.lock().map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Entries> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for BoundedCache {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

impl DirectionCache for BoundedCache {
    fn get(&self, key: &str) -> Option<Direction> {
        self.lock().map.get(key).copied()
    }

    fn insert(&self, key: String, direction: Direction) {
        if self.capacity == 0 {
            return;
        }
        let mut entries = self.lock();
        if let Some(existing) = entries.map.get_mut(&key) {
            *existing = direction;
            return;
        }
        while entries.map.len() >= self.capacity {
            let Some(oldest) = entries.order.pop_front() else {
                break;
            };
            entries.map.remove(&oldest);
        }
        entries.order.push_back(key.clone());
        entries.map.insert(key, direction);
    }
}

/// The process-wide cache shared by every parser built with the default
/// policy.
pub fn shared() -> Arc<dyn DirectionCache> {
    static SHARED: OnceLock<Arc<dyn DirectionCache>> = OnceLock::new();
    SHARED
        .get_or_init(|| Arc::new(BoundedCache::default()))
        .clone()
}
