// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! In-process ordered store.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;

use super::{Key, KeyRange, KvStore, StoreError, Value};

/// `BTreeMap`-backed store with the same ordering semantics as the Redis
/// layout. Counts every operation it serves.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
    operations: AtomicU64,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `get`, `put` and `range_scan` calls served so far.
    pub fn operation_count(&self) -> u64 {
        self.operations.load(Ordering::Acquire)
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    #[inline]
    fn record(&self) {
        self.operations.fetch_add(1, Ordering::AcqRel);
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &Key) -> Result<Option<Value>, StoreError> {
        self.record();
        Ok(self.entries.read().get(key.as_bytes()).cloned().map(Value::new))
    }

    async fn put(&self, key: Key, value: Value) -> Result<(), StoreError> {
        self.record();
        self.entries.write().insert(key.0, value.0);
        Ok(())
    }

    async fn range_scan(&self, range: &KeyRange) -> Result<Vec<(Key, Value)>, StoreError> {
        self.record();
        // BTreeMap::range panics on inverted bounds.
        if range.is_empty() {
            return Ok(Vec::new());
        }

        let bounds: (Bound<&[u8]>, Bound<&[u8]>) = (
            Bound::Included(range.lower.as_bytes()),
            Bound::Excluded(range.upper.as_bytes()),
        );
        let entries = self.entries.read();
        Ok(entries
            .range::<[u8], _>(bounds)
            .map(|(k, v)| (Key::new(k.clone()), Value::new(v.clone())))
            .collect())
    }
}
