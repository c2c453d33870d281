// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Ordered key-value storage clients.
//!
//! Everything above this layer talks to a [`KvStore`]: point `get`, `put`
//! with overwrite semantics, and `range_scan` over a half-open byte range
//! returning entries in ascending key order.
//!
//! # Implementations
//!
//! - [`RedisStore`]: remote Redis, lazily connected, one deadline per round
//!   trip. Transient failures surface as [`StoreError::Unavailable`].
//! - [`MemoryStore`]: in-process `BTreeMap`, counts operations.
//! - [`RetryingStore`]: decorator adding bounded exponential backoff for
//!   `Unavailable` errors. [`StoreError::RequestRejected`] is never retried.
//!
//! # Example
//!
//! ```no_run
//! use minutestore::storage::{KvStore, Key, RedisStore, RetryingStore, StoreConfig, Value};
//!
//! # async fn example() -> Result<(), minutestore::storage::StoreError> {
//! let config = StoreConfig::new("redis://127.0.0.1:6379/0");
//! let retry = config.retry.clone();
//! let store = RetryingStore::new(RedisStore::open(config)?, retry)?;
//!
//! store.put(Key::from("k"), Value::from("v")).await?;
//! assert_eq!(store.get(&Key::from("k")).await?, Some(Value::from("v")));
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod kv;
mod memory;
mod redis_store;
mod retry;
#[cfg(test)]
pub(crate) mod testing;

pub use config::{redact_url, RetryPolicy, StoreConfig};
pub use error::StoreError;
pub use kv::{Key, KeyRange, KvStore, Value};
pub use memory::MemoryStore;
pub use redis_store::RedisStore;
pub use retry::RetryingStore;
