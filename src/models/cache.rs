// cache.rs — Keyed cache of loaded models, shared by every column chunk call.
//
// At most one load runs per key. Callers that arrive while a key is loading block on
// that load and share its outcome, including its failure. Different keys never wait
// on each other: the map lock is only held to find or insert a slot.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use serde::Serialize;

use crate::error::Result;
use crate::options::DeviceArg;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModelKey {
    pub repo: String,
    pub device: DeviceArg,
}

impl ModelKey {
    pub fn new(repo: impl Into<String>, device: DeviceArg) -> Self {
        Self { repo: repo.into(), device }
    }
}

impl fmt::Display for ModelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.repo, self.device)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub entries: usize,
    pub loads: u64,
    pub hits: u64,
    pub failed_loads: u64,
    pub evictions: u64,
}

struct Slot<E> {
    cell: OnceLock<Result<Arc<E>>>,
    last_used: AtomicU64,
}

impl<E> Slot<E> {
    fn new() -> Self {
        Self {
            cell: OnceLock::new(),
            last_used: AtomicU64::new(0),
        }
    }

    fn is_ready(&self) -> bool {
        matches!(self.cell.get(), Some(Ok(_)))
    }
}

pub struct ModelCache<E> {
    slots: Mutex<HashMap<ModelKey, Arc<Slot<E>>>>,
    capacity: Option<usize>,
    clock: AtomicU64,
    loads: AtomicU64,
    hits: AtomicU64,
    failed_loads: AtomicU64,
    evictions: AtomicU64,
}

impl<E> ModelCache<E> {
    /// A cache that never evicts.
    pub fn new() -> Self {
        Self::with_capacity(None)
    }

    /// `Some(n)` evicts the least recently used loaded model once more than `n` are cached.
    pub fn with_capacity(capacity: Option<usize>) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            capacity: capacity.map(|n| n.max(1)),
            clock: AtomicU64::new(0),
            loads: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            failed_loads: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Return the cached model for `key`, running `load` if no caller has loaded it yet.
    pub fn get_or_load<F>(&self, key: &ModelKey, load: F) -> Result<Arc<E>>
    where
        F: FnOnce(&ModelKey) -> Result<E>,
    {
        let slot = {
            let mut slots = self.lock_slots();
            Arc::clone(slots.entry(key.clone()).or_insert_with(|| Arc::new(Slot::new())))
        };
        slot.last_used.store(self.tick(), Ordering::Relaxed);

        let mut loaded_here = false;
        let result = slot
            .cell
            .get_or_init(|| {
                loaded_here = true;
                self.loads.fetch_add(1, Ordering::Relaxed);
                log::info!("Loading model {}", key);
                let loaded = load(key).map(Arc::new);
                match &loaded {
                    Ok(_) => log::info!("Model {} loaded", key),
                    Err(e) => log::error!("Model {} failed to load: {}", key, e),
                }
                loaded
            })
            .clone();

        match (&result, loaded_here) {
            (Ok(_), false) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
            }
            (Ok(_), true) => self.enforce_capacity(key),
            (Err(_), true) => {
                self.failed_loads.fetch_add(1, Ordering::Relaxed);
                // Waiters already holding this slot see the failure; later calls start over.
                let mut slots = self.lock_slots();
                if slots.get(key).is_some_and(|s| Arc::ptr_eq(s, &slot)) {
                    slots.remove(key);
                }
            }
            (Err(_), false) => {}
        }

        result
    }

    pub fn contains(&self, key: &ModelKey) -> bool {
        self.lock_slots().get(key).is_some_and(|s| s.is_ready())
    }

    /// Drop the cache's reference to a model. Calls already holding it keep it alive.
    pub fn evict(&self, key: &ModelKey) -> bool {
        let removed = self.lock_slots().remove(key).is_some();
        if removed {
            self.evictions.fetch_add(1, Ordering::Relaxed);
            log::info!("Evicted model {}", key);
        }
        removed
    }

    pub fn clear(&self) {
        let mut slots = self.lock_slots();
        let n = slots.len() as u64;
        slots.clear();
        self.evictions.fetch_add(n, Ordering::Relaxed);
    }

    pub fn keys(&self) -> Vec<ModelKey> {
        let slots = self.lock_slots();
        let mut keys: Vec<ModelKey> = slots
            .iter()
            .filter(|(_, s)| s.is_ready())
            .map(|(k, _)| k.clone())
            .collect();
        keys.sort_by(|a, b| a.repo.cmp(&b.repo).then(a.device.to_string().cmp(&b.device.to_string())));
        keys
    }

    pub fn stats(&self) -> CacheStats {
        let entries = self.lock_slots().values().filter(|s| s.is_ready()).count();
        CacheStats {
            entries,
            loads: self.loads.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
            failed_loads: self.failed_loads.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }

    fn enforce_capacity(&self, just_loaded: &ModelKey) {
        let Some(capacity) = self.capacity else {
            return;
        };
        let mut slots = self.lock_slots();
        while slots.values().filter(|s| s.is_ready()).count() > capacity {
            let victim = slots
                .iter()
                .filter(|(k, s)| *k != just_loaded && s.is_ready())
                .min_by_key(|(_, s)| s.last_used.load(Ordering::Relaxed))
                .map(|(k, _)| k.clone());
            let Some(victim) = victim else {
                break;
            };
            slots.remove(&victim);
            self.evictions.fetch_add(1, Ordering::Relaxed);
            log::info!("Evicted least recently used model {}", victim);
        }
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn lock_slots(&self) -> MutexGuard<'_, HashMap<ModelKey, Arc<Slot<E>>>> {
        // A panic while holding the map lock cannot leave the map half-updated.
        self.slots.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl<E> Default for ModelCache<E> {
    fn default() -> Self {
        Self::new()
    }
}
