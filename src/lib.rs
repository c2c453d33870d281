// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! minutestore: per-owner metric time series on an ordered key-value store.
//!
//! Samples are keyed so that one time window of one owner's series is a
//! single contiguous key range. Reads go through an access gate that lets
//! owners see only their own series.

pub mod access;
pub mod query;
pub mod series;
pub mod storage;
pub mod time;

pub use access::{
    AccessAuditLogger, AccessPolicy, AuthorizationDecision, IdentityOracle, RequestContext,
    SelfAccessPolicy, SessionTable,
};
pub use query::{QueryError, QueryFacade, QueryOutcome, SeriesRequest};
pub use series::{
    KeyError, MetricKind, OwnerId, Sample, SeriesError, SeriesId, TimeSeriesRepository,
    TimeWindow,
};
pub use storage::{
    Key, KeyRange, KvStore, MemoryStore, RedisStore, RetryPolicy, RetryingStore, StoreConfig,
    StoreError, Value,
};
pub use time::{now_unix_secs, Clock, ManualClock, SystemClock, Timestamp};
