// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Retry decorator for store clients.

use std::future::Future;

use async_trait::async_trait;
use rand::Rng;
use tracing::{debug, warn};

use super::{Key, KeyRange, KvStore, RetryPolicy, StoreError, Value};

/// Wraps a store and retries transient failures with bounded exponential
/// backoff.
///
/// Only [`StoreError::Unavailable`] is retried. A rejected request is
/// returned on the first occurrence. Once the attempt ceiling is reached the
/// last `Unavailable` error is returned with the total attempt count.
pub struct RetryingStore<S> {
    inner: S,
    policy: RetryPolicy,
}

impl<S: KvStore> RetryingStore<S> {
    /// Wraps `inner` with the given policy.
    pub fn new(inner: S, policy: RetryPolicy) -> Result<Self, StoreError> {
        policy.validate()?;
        Ok(Self { inner, policy })
    }

    /// Returns a reference to the wrapped store.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Returns the active retry policy.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    async fn with_retry<T, F, Fut>(&self, op: &'static str, mut attempt_fn: F) -> Result<T, StoreError>
    where
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = Result<T, StoreError>> + Send,
        T: Send,
    {
        let mut attempt = 1;
        loop {
            match attempt_fn().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(op, attempt, "store operation recovered after retry");
                    }
                    return Ok(value);
                }
                Err(err) if err.is_transient() && attempt < self.policy.max_attempts => {
                    let delay = self.jittered(self.policy.backoff(attempt));
                    warn!(
                        op,
                        attempt,
                        max_attempts = self.policy.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "transient store failure, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err.with_attempts(attempt)),
            }
        }
    }

    fn jittered(&self, delay: std::time::Duration) -> std::time::Duration {
        if self.policy.jitter <= 0.0 || delay.is_zero() {
            return delay;
        }
        let factor = 1.0 + rand::thread_rng().gen_range(0.0..=self.policy.jitter);
        delay.mul_f64(factor).min(self.policy.max_backoff)
    }
}

#[async_trait]
impl<S: KvStore> KvStore for RetryingStore<S> {
    async fn get(&self, key: &Key) -> Result<Option<Value>, StoreError> {
        self.with_retry("get", || self.inner.get(key)).await
    }

    async fn put(&self, key: Key, value: Value) -> Result<(), StoreError> {
        self.with_retry("put", || self.inner.put(key.clone(), value.clone()))
            .await
    }

    async fn range_scan(&self, range: &KeyRange) -> Result<Vec<(Key, Value)>, StoreError> {
        self.with_retry("range_scan", || self.inner.range_scan(range))
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::storage::testing::{FailureMode, FlakyStore};
    use crate::storage::MemoryStore;

    fn fast_policy(attempts: u32) -> RetryPolicy {
        RetryPolicy::default()
            .with_max_attempts(attempts)
            .with_backoff(Duration::from_millis(10), Duration::from_millis(100))
            .with_jitter(0.0)
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_after_transient_failures() {
        let backing = Arc::new(MemoryStore::new());
        backing.put(Key::from("k"), Value::from("v")).await.unwrap();

        let flaky = FlakyStore::new(Arc::clone(&backing), FailureMode::Unavailable, 2);
        let store = RetryingStore::new(flaky, fast_policy(3)).unwrap();

        let value = store.get(&Key::from("k")).await.unwrap();
        assert_eq!(value, Some(Value::from("v")));
        assert_eq!(store.inner().calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_max_attempts() {
        let flaky = FlakyStore::new(Arc::new(MemoryStore::new()), FailureMode::Unavailable, 10);
        let store = RetryingStore::new(flaky, fast_policy(3)).unwrap();

        let err = store.get(&Key::from("k")).await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable { attempts: 3, .. }));
        assert_eq!(store.inner().calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejected_is_not_retried() {
        let flaky = FlakyStore::new(Arc::new(MemoryStore::new()), FailureMode::Rejected, 1);
        let store = RetryingStore::new(flaky, fast_policy(5)).unwrap();

        let err = store
            .put(Key::from("k"), Value::from("v"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::RequestRejected(_)));
        assert_eq!(store.inner().calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_waits_between_attempts() {
        let flaky = FlakyStore::new(Arc::new(MemoryStore::new()), FailureMode::Unavailable, 2);
        let store = RetryingStore::new(flaky, fast_policy(3)).unwrap();

        let start = tokio::time::Instant::now();
        let range = KeyRange::new(Key::from("a"), Key::from("z"));
        store.range_scan(&range).await.unwrap();

        // 10ms before the second attempt, 20ms before the third.
        assert_eq!(start.elapsed(), Duration::from_millis(30));
    }

    #[tokio::test]
    async fn test_no_retry_policy_fails_fast() {
        let flaky = FlakyStore::new(Arc::new(MemoryStore::new()), FailureMode::Unavailable, 1);
        let store = RetryingStore::new(flaky, RetryPolicy::no_retry()).unwrap();

        let err = store.get(&Key::from("k")).await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable { attempts: 1, .. }));
    }

    #[test]
    fn test_invalid_policy_rejected() {
        let result = RetryingStore::new(MemoryStore::new(), RetryPolicy::default().with_max_attempts(0));
        assert!(matches!(result, Err(StoreError::InvalidConfig(_))));
    }
}
