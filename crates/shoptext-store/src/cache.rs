//! Bounded newest-first caches over a [`VariableStore`].
//!
//! Each cache is a ring of at most `limit` entries (default 15) ordered by
//! `cached_at` descending. The cache enforces the cap on every write, so a
//! host store never grows unbounded no matter how many parses run.

use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use shoptext_core::ShopData;

use crate::orders::ServiceOrder;
use crate::store::{Scope, StoreError, VariableStore};

/// Default maximum retained entries per cache.
pub const DEFAULT_CACHE_LIMIT: usize = 15;

const SHOP_CACHE_KEY: &str = "shop_catalog_cache";
const ORDER_CACHE_KEY: &str = "service_orders_cache";

/// A cached value with its ordering key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedEntry<T> {
    pub cached_at: DateTime<Utc>,
    pub value: T,
}

/// Bounded cache bound to one `(scope, key)` slot of a store.
pub struct BoundedCache<'a, S: VariableStore, T> {
    store: &'a S,
    scope: Scope,
    key: &'static str,
    limit: usize,
    _marker: std::marker::PhantomData<T>,
}

/// The most recent parse results for a script scope.
pub fn shop_cache<S: VariableStore>(store: &S, scope: Scope) -> BoundedCache<'_, S, ShopData> {
    BoundedCache::new(store, scope, SHOP_CACHE_KEY)
}

/// The most recent service orders for a script scope.
pub fn order_cache<S: VariableStore>(
    store: &S,
    scope: Scope,
) -> BoundedCache<'_, S, Vec<ServiceOrder>> {
    BoundedCache::new(store, scope, ORDER_CACHE_KEY)
}

impl<'a, S: VariableStore, T: Serialize + DeserializeOwned> BoundedCache<'a, S, T> {
    fn new(store: &'a S, scope: Scope, key: &'static str) -> Self {
        BoundedCache {
            store,
            scope,
            key,
            limit: DEFAULT_CACHE_LIMIT,
            _marker: std::marker::PhantomData,
        }
    }

    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.max(1);
        self
    }

    /// Reads all entries, newest first, capped at the limit. Entries that
    /// fail to deserialize are dropped individually.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backing store cannot be read.
    pub fn read(&self) -> Result<Vec<CachedEntry<T>>, StoreError> {
        let Some(value) = self.store.read_raw(&self.scope, self.key)? else {
            return Ok(Vec::new());
        };
        let serde_json::Value::Array(items) = value else {
            tracing::warn!(key = self.key, "cache slot held a non-array; ignoring");
            return Ok(Vec::new());
        };
        let mut entries: Vec<CachedEntry<T>> = items
            .into_iter()
            .filter_map(|item| match serde_json::from_value(item) {
                Ok(entry) => Some(entry),
                Err(error) => {
                    tracing::warn!(key = self.key, %error, "dropping undecodable cache entry");
                    None
                }
            })
            .collect();
        entries.sort_by(|a, b| b.cached_at.cmp(&a.cached_at));
        entries.truncate(self.limit);
        Ok(entries)
    }

    /// Returns the newest cached value, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backing store cannot be read.
    pub fn latest(&self) -> Result<Option<T>, StoreError> {
        Ok(self.read()?.into_iter().next().map(|entry| entry.value))
    }

    /// Prepends a new value, evicting the oldest entries beyond the limit.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backing store cannot be read or
    /// written.
    pub fn push(&self, value: T) -> Result<(), StoreError> {
        let mut entries = self.read()?;
        entries.insert(
            0,
            CachedEntry {
                cached_at: Utc::now(),
                value,
            },
        );
        self.write(entries)
    }

    /// Replaces the cache contents. Entries are re-stamped with
    /// millisecond-offset timestamps so their given order is preserved
    /// under the newest-first sort, then capped.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backing store cannot be written.
    pub fn write(&self, entries: Vec<CachedEntry<T>>) -> Result<(), StoreError> {
        let now = Utc::now();
        let mut stamped: Vec<CachedEntry<T>> = entries
            .into_iter()
            .enumerate()
            .map(|(idx, entry)| CachedEntry {
                cached_at: now - Duration::milliseconds(i64::try_from(idx).unwrap_or(i64::MAX)),
                value: entry.value,
            })
            .collect();
        stamped.truncate(self.limit);
        let serialized = serde_json::to_value(&stamped)?;
        self.store.write_raw(&self.scope, self.key, serialized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn cache(store: &MemoryStore) -> BoundedCache<'_, MemoryStore, u32> {
        BoundedCache::new(store, Scope::script("test"), "test_cache")
    }

    #[test]
    fn empty_cache_reads_empty() {
        let store = MemoryStore::new();
        assert!(cache(&store).read().expect("read").is_empty());
        assert_eq!(cache(&store).latest().expect("latest"), None);
    }

    #[test]
    fn push_then_latest() {
        let store = MemoryStore::new();
        let c = cache(&store);
        c.push(1).expect("push");
        c.push(2).expect("push");
        assert_eq!(c.latest().expect("latest"), Some(2));
    }

    #[test]
    fn entries_come_back_newest_first() {
        let store = MemoryStore::new();
        let c = cache(&store);
        for n in 1..=4 {
            c.push(n).expect("push");
        }
        let values: Vec<u32> = c.read().expect("read").into_iter().map(|e| e.value).collect();
        assert_eq!(values, vec![4, 3, 2, 1]);
    }

    #[test]
    fn cap_evicts_oldest() {
        let store = MemoryStore::new();
        let c = cache(&store).with_limit(3);
        for n in 1..=5 {
            c.push(n).expect("push");
        }
        let values: Vec<u32> = c.read().expect("read").into_iter().map(|e| e.value).collect();
        assert_eq!(values, vec![5, 4, 3]);
    }

    #[test]
    fn default_limit_is_fifteen() {
        let store = MemoryStore::new();
        let c = cache(&store);
        for n in 0..40 {
            c.push(n).expect("push");
        }
        assert_eq!(c.read().expect("read").len(), DEFAULT_CACHE_LIMIT);
    }

    #[test]
    fn undecodable_entries_dropped_individually() {
        let store = MemoryStore::new();
        let scope = Scope::script("test");
        store
            .write_raw(
                &scope,
                "test_cache",
                serde_json::json!([
                    {"cached_at": "2026-08-01T00:00:00Z", "value": 10},
                    {"cached_at": "not a date", "value": 11},
                    {"cached_at": "2026-08-02T00:00:00Z", "value": "not a u32"}
                ]),
            )
            .expect("seed");
        let c = cache(&store);
        let entries = c.read().expect("read");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].value, 10);
    }

    #[test]
    fn non_array_slot_ignored() {
        let store = MemoryStore::new();
        let scope = Scope::script("test");
        store
            .write_raw(&scope, "test_cache", serde_json::json!({"odd": true}))
            .expect("seed");
        assert!(cache(&store).read().expect("read").is_empty());
    }

    #[test]
    fn shop_cache_roundtrips_shop_data() {
        let store = MemoryStore::new();
        let c = shop_cache(&store, Scope::script("s"));
        c.push(ShopData::default()).expect("push");
        let latest = c.latest().expect("latest").expect("entry");
        assert!(latest.is_empty());
    }
}
