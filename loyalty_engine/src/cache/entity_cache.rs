use std::{
    collections::HashMap,
    future::Future,
    hash::Hash,
    sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use log::trace;

use crate::traits::LedgerError;

struct Entries<K, V> {
    values: HashMap<K, V>,
    /// Ticks on every write to the map.
    epoch: u64,
    /// The epoch at which each key was last written. A load that started before the key's last write must not
    /// repopulate it, since the value it read may predate that write. Entries are never removed, otherwise a racing
    /// load could no longer be told apart from a fresh one.
    written_at: HashMap<K, u64>,
}

impl<K: Eq + Hash, V> Entries<K, V> {
    fn touch(&mut self, key: K) {
        self.epoch += 1;
        self.written_at.insert(key, self.epoch);
    }
}

/// A read-through map for one entity kind.
pub(crate) struct EntityCache<K, V> {
    name: &'static str,
    entries: RwLock<Entries<K, V>>,
}

impl<K, V> EntityCache<K, V>
where
    K: Eq + Hash + Clone + std::fmt::Display,
    V: Clone,
{
    pub fn new(name: &'static str) -> Self {
        let entries = Entries { values: HashMap::new(), epoch: 0, written_at: HashMap::new() };
        Self { name, entries: RwLock::new(entries) }
    }

    // A panic while holding the lock cannot leave the map half-written, so a poisoned lock is still usable.
    fn read(&self) -> RwLockReadGuard<'_, Entries<K, V>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Entries<K, V>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.read().values.get(key).cloned()
    }

    pub fn epoch(&self) -> u64 {
        self.read().epoch
    }

    /// Stores a value that was loaded from the store, unless `key` has been written since `epoch`. Writes to other keys
    /// do not affect the fill.
    pub fn fill(&self, key: K, value: V, epoch: u64) -> bool {
        let mut entries = self.write();
        if entries.written_at.get(&key).is_some_and(|&written| written > epoch) {
            trace!("🗂️ Not caching {} {key}. It was loaded before the last write.", self.name);
            return false;
        }
        entries.values.insert(key, value);
        true
    }

    /// Stores a value that is known to be current, such as the result of a committed write.
    pub fn put(&self, key: K, value: V) {
        let mut entries = self.write();
        entries.touch(key.clone());
        entries.values.insert(key, value);
    }

    pub fn invalidate(&self, key: &K) {
        let mut entries = self.write();
        entries.touch(key.clone());
        if entries.values.remove(key).is_some() {
            trace!("🗂️ Invalidated {} {key}", self.name);
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.read().values.len()
    }

    /// Returns the cached value for `key`, or loads it with `load` and caches the result.
    ///
    /// Load errors are returned as-is and nothing is cached.
    pub async fn get_or_load<F, Fut>(&self, key: K, load: F) -> Result<V, LedgerError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, LedgerError>>,
    {
        if let Some(value) = self.get(&key) {
            trace!("🗂️ Cache hit for {} {key}", self.name);
            return Ok(value);
        }
        let epoch = self.epoch();
        let value = load().await?;
        self.fill(key, value.clone(), epoch);
        Ok(value)
    }
}
