// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Per-owner metric time series.
//!
//! A series is identified by `(MetricKind, OwnerId)` and holds at most one
//! sample per resolution slot. Samples live in an ordered [`KvStore`] under
//! keys built by the [`key`] codec:
//!
//! ```text
//! [kind_tag:u8][owner_len:u32 BE][owner bytes][timestamp:u64 BE]
//! ```
//!
//! so that a time window of one series maps to exactly one contiguous key
//! range, and a window query is a single range scan.
//!
//! [`KvStore`]: crate::storage::KvStore
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use minutestore::series::{MetricKind, OwnerId, Sample, TimeSeriesRepository, TimeWindow};
//! use minutestore::storage::MemoryStore;
//! use minutestore::time::Timestamp;
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let repo = TimeSeriesRepository::new(Arc::new(MemoryStore::new()));
//! let owner = OwnerId::from("u1");
//! let kind = MetricKind::SensorValuesPerMinute;
//!
//! repo.append(kind, &owner, Sample::new(Timestamp::from_minutes(10), 5.0)).await.unwrap();
//!
//! let window = TimeWindow::new(Timestamp::from_minutes(0), Timestamp::from_minutes(60));
//! let samples = repo.range_query(kind, &owner, window).await.unwrap();
//! assert_eq!(samples.len(), 1);
//! # });
//! ```

mod error;
pub mod key;
mod kind;
mod repository;
mod sample;

pub use error::{KeyError, SeriesError};
pub use kind::MetricKind;
pub use repository::TimeSeriesRepository;
pub use sample::{OwnerId, Sample, SeriesId, TimeWindow};
