// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Caller-facing query entry point.
//!
//! [`QueryFacade`] composes the access gate and the series repository: the
//! gate always runs first, and a denied caller causes no store traffic at
//! all. Denial is an `Ok` outcome, distinct from an empty series.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use minutestore::query::{QueryFacade, QueryOutcome, SeriesRequest};
//! use minutestore::series::OwnerId;
//! use minutestore::storage::MemoryStore;
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let facade = QueryFacade::new(Arc::new(MemoryStore::new()));
//! let request = SeriesRequest::new("u1", "SENSOR_VALUES_PER_MINUTE", 0, 3600);
//!
//! let outcome = facade.handle_request(Some(&OwnerId::from("u2")), &request).await.unwrap();
//! assert_eq!(outcome, QueryOutcome::Denied);
//! # });
//! ```

mod error;

pub use error::QueryError;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::error;

use crate::access::{AccessAuditLogger, AccessPolicy, IdentityOracle, SelfAccessPolicy};
use crate::series::{MetricKind, OwnerId, Sample, SeriesError, TimeSeriesRepository, TimeWindow};
use crate::storage::KvStore;
use crate::time::Timestamp;

/// Transport-level series request. Bounds are whole seconds since the Unix
/// epoch, start inclusive and end exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesRequest {
    pub owner: String,
    pub metric_kind: String,
    pub start: i64,
    pub end: i64,
}

impl SeriesRequest {
    pub fn new(owner: impl Into<String>, metric_kind: impl Into<String>, start: i64, end: i64) -> Self {
        Self {
            owner: owner.into(),
            metric_kind: metric_kind.into(),
            start,
            end,
        }
    }

    /// Returns the requested window.
    pub fn window(&self) -> TimeWindow {
        TimeWindow::new(Timestamp::from_secs(self.start), Timestamp::from_secs(self.end))
    }
}

/// Result of a query that did not fail.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "samples", rename_all = "snake_case")]
pub enum QueryOutcome {
    /// Samples in the window, ordered by timestamp. May be empty.
    Series(Vec<Sample>),
    /// The caller may not read the requested series.
    Denied,
}

impl QueryOutcome {
    pub fn is_denied(&self) -> bool {
        matches!(self, QueryOutcome::Denied)
    }

    /// Returns the samples of a `Series` outcome.
    pub fn samples(&self) -> Option<&[Sample]> {
        match self {
            QueryOutcome::Series(samples) => Some(samples),
            QueryOutcome::Denied => None,
        }
    }
}

/// Authorized read access to per-owner series.
pub struct QueryFacade<S: KvStore, P: AccessPolicy = SelfAccessPolicy> {
    repository: TimeSeriesRepository<S>,
    policy: P,
    audit: AccessAuditLogger,
}

impl<S: KvStore> QueryFacade<S, SelfAccessPolicy> {
    /// Creates a facade enforcing self-access only.
    pub fn new(store: Arc<S>) -> Self {
        Self::with_policy(store, SelfAccessPolicy)
    }
}

impl<S: KvStore, P: AccessPolicy> QueryFacade<S, P> {
    /// Creates a facade with a custom access policy.
    pub fn with_policy(store: Arc<S>, policy: P) -> Self {
        Self {
            repository: TimeSeriesRepository::new(store),
            policy,
            audit: AccessAuditLogger::default(),
        }
    }

    /// Replaces the audit logger.
    pub fn with_audit_logger(mut self, audit: AccessAuditLogger) -> Self {
        self.audit = audit;
        self
    }

    pub fn repository(&self) -> &TimeSeriesRepository<S> {
        &self.repository
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Returns `requested`'s samples of `kind` in `window` if `caller` may
    /// read them.
    pub async fn get_series_for_caller(
        &self,
        caller: Option<&OwnerId>,
        requested: &OwnerId,
        kind: MetricKind,
        window: TimeWindow,
    ) -> Result<QueryOutcome, QueryError> {
        let details = format!("kind={} window={}", kind, window);
        if !self.gate(caller, requested, details) {
            return Ok(QueryOutcome::Denied);
        }
        self.read(caller, requested, kind, window).await
    }

    /// Serves a transport request.
    ///
    /// The caller is authorized before the metric kind is parsed, so a
    /// denied caller cannot learn which kinds exist.
    pub async fn handle_request(
        &self,
        caller: Option<&OwnerId>,
        request: &SeriesRequest,
    ) -> Result<QueryOutcome, QueryError> {
        let requested = OwnerId::new(request.owner.clone());
        let window = request.window();
        let details = format!("kind={} window={}", request.metric_kind, window);
        if !self.gate(caller, &requested, details) {
            return Ok(QueryOutcome::Denied);
        }

        let kind = request.metric_kind.parse::<MetricKind>()?;
        self.read(caller, &requested, kind, window).await
    }

    /// Resolves the caller through `oracle`, then serves `request`.
    pub async fn resolve_and_query<O: IdentityOracle>(
        &self,
        oracle: &O,
        ctx: &O::Context,
        request: &SeriesRequest,
    ) -> Result<QueryOutcome, QueryError> {
        let caller = oracle.resolve_caller_identity(ctx).await;
        self.handle_request(caller.as_ref(), request).await
    }

    fn gate(&self, caller: Option<&OwnerId>, requested: &OwnerId, details: String) -> bool {
        let permitted = self.policy.authorize(caller, requested).is_permitted();
        self.audit.log_decision(caller, requested, details, permitted);
        permitted
    }

    async fn read(
        &self,
        caller: Option<&OwnerId>,
        owner: &OwnerId,
        kind: MetricKind,
        window: TimeWindow,
    ) -> Result<QueryOutcome, QueryError> {
        match self.repository.range_query(kind, owner, window).await {
            Ok(samples) => Ok(QueryOutcome::Series(samples)),
            Err(err) => {
                if !matches!(err, SeriesError::Key(_)) {
                    self.audit.log_failure(caller, owner, err.to_string());
                }
                let err = QueryError::from(err);
                if let QueryError::Internal(source) = &err {
                    error!(owner = %owner, kind = %kind, error = %source, "series query failed");
                }
                Err(err)
            }
        }
    }
}
