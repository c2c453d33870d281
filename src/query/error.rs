// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Query error types.

use crate::series::{KeyError, SeriesError};

/// Errors surfaced to the transport. Access denial is not an error; it is
/// reported as [`QueryOutcome::Denied`](super::QueryOutcome::Denied).
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] KeyError),

    #[error("store unavailable: {0}")]
    StoreUnavailable(#[source] SeriesError),

    #[error("internal error: {0}")]
    Internal(#[source] SeriesError),
}

impl QueryError {
    /// Returns true if the request itself was at fault and retrying it
    /// unchanged cannot succeed.
    pub fn is_client_error(&self) -> bool {
        matches!(self, QueryError::InvalidRequest(_))
    }

    /// Returns true if the same request may succeed later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, QueryError::StoreUnavailable(_))
    }
}

impl From<SeriesError> for QueryError {
    fn from(err: SeriesError) -> Self {
        match err {
            SeriesError::Key(key) => QueryError::InvalidRequest(key),
            err if err.store_error().is_some_and(|e| e.is_transient()) => {
                QueryError::StoreUnavailable(err)
            }
            err => QueryError::Internal(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::{MetricKind, OwnerId, SeriesId};
    use crate::storage::StoreError;

    fn series() -> SeriesId {
        SeriesId::new(MetricKind::SensorValuesPerMinute, OwnerId::from("u1"))
    }

    #[test]
    fn test_key_error_is_client_error() {
        let err = QueryError::from(SeriesError::Key(KeyError::UnknownMetricKind("X".into())));
        assert!(matches!(err, QueryError::InvalidRequest(_)));
        assert!(err.is_client_error());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_unavailable_store() {
        let err = QueryError::from(SeriesError::Store {
            series: series(),
            source: StoreError::unavailable("connection refused"),
        });
        assert!(matches!(err, QueryError::StoreUnavailable(_)));
        assert!(!err.is_client_error());
        assert!(err.is_retryable());
    }

    #[test]
    fn test_rejected_request_is_internal() {
        let err = QueryError::from(SeriesError::Store {
            series: series(),
            source: StoreError::RequestRejected("WRONGTYPE".into()),
        });
        assert!(matches!(err, QueryError::Internal(_)));
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_corrupt_is_internal() {
        let err = QueryError::from(SeriesError::Corrupt {
            series: series(),
            reason: "bad value".into(),
        });
        assert!(matches!(err, QueryError::Internal(_)));
    }
}
