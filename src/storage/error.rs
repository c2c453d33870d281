// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Storage error types.

/// Errors that can occur in storage operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Transient infrastructure failure: connection refused or dropped,
    /// deadline exceeded, server loading. Safe to retry.
    #[error("store unavailable after {attempts} attempt(s): {reason}")]
    Unavailable { attempts: u32, reason: String },

    /// The store refused the request itself. Retrying cannot help; this
    /// means the request was malformed.
    #[error("store rejected request: {0}")]
    RequestRejected(String),

    #[error("invalid store configuration: {0}")]
    InvalidConfig(String),
}

impl StoreError {
    /// Creates an `Unavailable` error for a single failed attempt.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        StoreError::Unavailable {
            attempts: 1,
            reason: reason.into(),
        }
    }

    /// Returns true if the operation may succeed when retried.
    #[inline]
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Unavailable { .. })
    }

    /// Rewrites the attempt count of an `Unavailable` error.
    pub(crate) fn with_attempts(self, attempts: u32) -> Self {
        match self {
            StoreError::Unavailable { reason, .. } => StoreError::Unavailable { attempts, reason },
            other => other,
        }
    }
}
