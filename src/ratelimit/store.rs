//! Concurrent per-key entry storage.
//!
//! One `WindowEntry` per key, stored in a sharded concurrent map. Mutation
//! goes through [`KeyStore::with_entry`], which holds the shard write lock
//! for the duration of the closure: concurrent callers for the same key see
//! a serialized view of that key's entry, while unrelated keys live on other
//! shards and do not contend.

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use super::window::WindowEntry;

/// Concurrency-safe mapping from rate limit key to window state.
#[derive(Debug, Default)]
pub struct KeyStore {
    entries: DashMap<String, WindowEntry>,
}

impl KeyStore {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Run `f` with exclusive access to the key's entry, creating a fresh
    /// entry starting at `now` if the key has never been seen.
    pub fn with_entry<T>(
        &self,
        key: &str,
        now: DateTime<Utc>,
        f: impl FnOnce(&mut WindowEntry) -> T,
    ) -> T {
        let mut entry = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| WindowEntry::fresh(now));
        f(entry.value_mut())
    }

    /// Read a snapshot of the key's entry without creating state.
    pub fn peek(&self, key: &str) -> Option<WindowEntry> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    /// Replace the key's entry unconditionally, creating it if absent.
    pub fn overwrite(&self, key: &str, entry: WindowEntry) {
        self.entries.insert(key.to_string(), entry);
    }

    /// Drop the key's entry, if any.
    pub fn remove(&self, key: &str) {
        self.entries.remove(key);
    }

    /// Keep only entries for which the predicate returns true.
    pub fn retain(&self, mut keep: impl FnMut(&str, &WindowEntry) -> bool) {
        self.entries.retain(|key, entry| keep(key, entry));
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
