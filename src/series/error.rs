// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Series and key codec error types.

use crate::storage::StoreError;
use crate::time::Timestamp;

use super::SeriesId;

/// Errors raised by the key codec. None of them involve the store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyError {
    #[error("timestamp {timestamp} is before the epoch")]
    InvalidTimestamp { timestamp: Timestamp },

    #[error("unknown metric kind: {0}")]
    UnknownMetricKind(String),

    #[error("owner id is empty")]
    EmptyOwner,

    #[error("owner id too long: {len} > {max}")]
    OwnerTooLong { len: usize, max: usize },

    #[error("invalid key encoding: {0}")]
    InvalidKeyEncoding(String),

    #[error("invalid value encoding: {0}")]
    InvalidValueEncoding(String),
}

/// Errors that can occur in series operations.
#[derive(Debug, thiserror::Error)]
pub enum SeriesError {
    #[error(transparent)]
    Key(#[from] KeyError),

    #[error("store error on series {series}: {source}")]
    Store {
        series: SeriesId,
        #[source]
        source: StoreError,
    },

    #[error("corrupt entry in series {series}: {reason}")]
    Corrupt { series: SeriesId, reason: String },
}

impl SeriesError {
    /// Returns the underlying store error, if any.
    pub fn store_error(&self) -> Option<&StoreError> {
        match self {
            SeriesError::Store { source, .. } => Some(source),
            _ => None,
        }
    }
}
