// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Key-value types and the store trait.

use async_trait::async_trait;

use super::error::StoreError;

/// A store key. Ordered byte-wise, which is the order `range_scan` follows.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Key(pub Vec<u8>);

impl Key {
    #[inline]
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}

/// An opaque stored value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Value(pub Vec<u8>);

impl Value {
    #[inline]
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}

/// Half-open key range `[lower, upper)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRange {
    pub lower: Key,
    pub upper: Key,
}

impl KeyRange {
    /// Creates a range from its inclusive lower and exclusive upper bound.
    pub fn new(lower: Key, upper: Key) -> Self {
        Self { lower, upper }
    }

    /// Returns true if no key can fall inside the range.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lower >= self.upper
    }

    /// Returns true if `key` lies in `[lower, upper)`.
    #[inline]
    pub fn contains(&self, key: &[u8]) -> bool {
        key >= self.lower.as_bytes() && key < self.upper.as_bytes()
    }
}

/// The key-value store trait.
///
/// Implementations must be shareable between concurrent tasks; no method
/// takes `&mut self`. A dropped future abandons its request.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Reads the value stored at `key`.
    async fn get(&self, key: &Key) -> Result<Option<Value>, StoreError>;

    /// Writes `value` at `key`, replacing any previous value.
    async fn put(&self, key: Key, value: Value) -> Result<(), StoreError>;

    /// Returns every entry in `range`, in ascending key order.
    ///
    /// An empty range yields an empty vector.
    async fn range_scan(&self, range: &KeyRange) -> Result<Vec<(Key, Value)>, StoreError>;
}

#[async_trait]
impl<S: KvStore + ?Sized> KvStore for std::sync::Arc<S> {
    async fn get(&self, key: &Key) -> Result<Option<Value>, StoreError> {
        (**self).get(key).await
    }

    async fn put(&self, key: Key, value: Value) -> Result<(), StoreError> {
        (**self).put(key, value).await
    }

    async fn range_scan(&self, range: &KeyRange) -> Result<Vec<(Key, Value)>, StoreError> {
        (**self).range_scan(range).await
    }
}
