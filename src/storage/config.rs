// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Configuration for store clients.

use std::time::Duration;

use super::StoreError;

/// Bounded exponential backoff for transient store failures.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts including the first one. Must be at least 1.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub initial_backoff: Duration,
    /// Upper bound for any single delay.
    pub max_backoff: Duration,
    /// Growth factor between consecutive delays.
    pub multiplier: f64,
    /// Fraction of each delay added as random jitter, in `[0, 1]`.
    pub jitter: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            initial_backoff: Duration::from_millis(50),
            max_backoff: Duration::from_secs(2),
            multiplier: 2.0,
            jitter: 0.1,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Sets the attempt ceiling.
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Sets the first and maximum backoff delays.
    pub fn with_backoff(mut self, initial: Duration, max: Duration) -> Self {
        self.initial_backoff = initial;
        self.max_backoff = max;
        self
    }

    /// Sets the jitter fraction.
    pub fn with_jitter(mut self, jitter: f64) -> Self {
        self.jitter = jitter;
        self
    }

    /// Delay before retry number `retry` (1-based), without jitter.
    pub fn backoff(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(63) as i32;
        let scaled = self.initial_backoff.as_nanos() as f64 * self.multiplier.powi(exponent);
        if scaled >= self.max_backoff.as_nanos() as f64 {
            return self.max_backoff;
        }
        Duration::from_nanos(scaled.max(0.0) as u64)
    }

    pub fn validate(&self) -> Result<(), StoreError> {
        if self.max_attempts == 0 {
            return Err(StoreError::InvalidConfig(
                "retry.max_attempts must be at least 1".to_string(),
            ));
        }
        if !(self.multiplier >= 1.0) {
            return Err(StoreError::InvalidConfig(format!(
                "retry.multiplier must be >= 1.0, got {}",
                self.multiplier
            )));
        }
        if !(0.0..=1.0).contains(&self.jitter) {
            return Err(StoreError::InvalidConfig(format!(
                "retry.jitter must be within [0, 1], got {}",
                self.jitter
            )));
        }
        if self.initial_backoff > self.max_backoff {
            return Err(StoreError::InvalidConfig(
                "retry.initial_backoff exceeds retry.max_backoff".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration for the Redis-backed store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreConfig {
    /// Connection string, e.g. `redis://127.0.0.1:6379/0`.
    pub url: String,
    /// Name of the sorted set that orders every stored key. Also prefixes
    /// every value entry, so it is the namespace of the store within one
    /// database. Must not contain NUL.
    pub index_key: String,
    /// Deadline for a single round trip.
    pub op_timeout: Duration,
    /// Deadline for establishing a connection.
    pub connect_timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379/0".to_string(),
            index_key: "minutestore:index".to_string(),
            op_timeout: Duration::from_secs(2),
            connect_timeout: Duration::from_secs(2),
            retry: RetryPolicy::default(),
        }
    }
}

impl StoreConfig {
    /// Creates a configuration for the given connection string.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Sets the name of the ordering index.
    pub fn with_index_key(mut self, index_key: impl Into<String>) -> Self {
        self.index_key = index_key.into();
        self
    }

    /// Sets the per-operation deadline.
    pub fn with_op_timeout(mut self, timeout: Duration) -> Self {
        self.op_timeout = timeout;
        self
    }

    /// Sets the connect deadline.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Checks that the configuration can produce a working client.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.url.is_empty() {
            return Err(StoreError::InvalidConfig("url is empty".to_string()));
        }
        if self.index_key.is_empty() {
            return Err(StoreError::InvalidConfig("index_key is empty".to_string()));
        }
        if self.index_key.contains('\0') {
            return Err(StoreError::InvalidConfig(
                "index_key must not contain NUL".to_string(),
            ));
        }
        if self.op_timeout.is_zero() || self.connect_timeout.is_zero() {
            return Err(StoreError::InvalidConfig(
                "timeouts must be non-zero".to_string(),
            ));
        }
        self.retry.validate()
    }
}

/// Strips credentials from a connection string for logging.
pub fn redact_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://***{}", &url[..scheme_end], &url[at..])
        }
        _ => url.to_string(),
    }
}
