// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Store doubles for unit tests.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use super::{Key, KeyRange, KvStore, MemoryStore, StoreError, Value};

#[derive(Debug, Clone, Copy)]
pub enum FailureMode {
    Unavailable,
    Rejected,
}

/// Fails the first `failures` calls, then delegates to a [`MemoryStore`].
pub struct FlakyStore {
    backing: Arc<MemoryStore>,
    mode: FailureMode,
    failures: u32,
    calls: AtomicU32,
}

impl FlakyStore {
    pub fn new(backing: Arc<MemoryStore>, mode: FailureMode, failures: u32) -> Self {
        Self {
            backing,
            mode,
            failures,
            calls: AtomicU32::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::Acquire)
    }

    fn check(&self) -> Result<(), StoreError> {
        let call = self.calls.fetch_add(1, Ordering::AcqRel);
        if call < self.failures {
            return Err(match self.mode {
                FailureMode::Unavailable => StoreError::unavailable("connection reset by peer"),
                FailureMode::Rejected => {
                    StoreError::RequestRejected("ERR syntax error".to_string())
                }
            });
        }
        Ok(())
    }
}

#[async_trait]
impl KvStore for FlakyStore {
    async fn get(&self, key: &Key) -> Result<Option<Value>, StoreError> {
        self.check()?;
        self.backing.get(key).await
    }

    async fn put(&self, key: Key, value: Value) -> Result<(), StoreError> {
        self.check()?;
        self.backing.put(key, value).await
    }

    async fn range_scan(&self, range: &KeyRange) -> Result<Vec<(Key, Value)>, StoreError> {
        self.check()?;
        self.backing.range_scan(range).await
    }
}

/// Returns scan results in reverse key order, like a store without
/// ordering guarantees.
pub struct ReversingStore {
    backing: MemoryStore,
}

impl ReversingStore {
    pub fn new() -> Self {
        Self {
            backing: MemoryStore::new(),
        }
    }
}

#[async_trait]
impl KvStore for ReversingStore {
    async fn get(&self, key: &Key) -> Result<Option<Value>, StoreError> {
        self.backing.get(key).await
    }

    async fn put(&self, key: Key, value: Value) -> Result<(), StoreError> {
        self.backing.put(key, value).await
    }

    async fn range_scan(&self, range: &KeyRange) -> Result<Vec<(Key, Value)>, StoreError> {
        let mut entries = self.backing.range_scan(range).await?;
        entries.reverse();
        Ok(entries)
    }
}

/// Returns a fixed set of entries from every scan, regardless of range.
pub struct FixedScanStore {
    entries: Vec<(Key, Value)>,
}

impl FixedScanStore {
    pub fn new(entries: Vec<(Key, Value)>) -> Self {
        Self { entries }
    }
}

#[async_trait]
impl KvStore for FixedScanStore {
    async fn get(&self, _key: &Key) -> Result<Option<Value>, StoreError> {
        Ok(None)
    }

    async fn put(&self, _key: Key, _value: Value) -> Result<(), StoreError> {
        Ok(())
    }

    async fn range_scan(&self, _range: &KeyRange) -> Result<Vec<(Key, Value)>, StoreError> {
        Ok(self.entries.clone())
    }
}
