// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Time-series repository over a [`KvStore`].

use std::sync::Arc;

use tracing::{debug, warn};

use crate::storage::{Key, KvStore, StoreError, Value};

use super::key::{
    decode_sample_key, decode_sample_value, encode_sample_key, encode_sample_value,
    encode_window_bounds,
};
use super::{KeyError, MetricKind, OwnerId, Sample, SeriesError, SeriesId, TimeWindow};

/// Reads and appends samples of `(kind, owner)` series.
///
/// The repository is stateless apart from the injected store; clones of the
/// `Arc` may be shared freely between tasks.
pub struct TimeSeriesRepository<S: KvStore> {
    store: Arc<S>,
}

impl<S: KvStore> Clone for TimeSeriesRepository<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: KvStore> TimeSeriesRepository<S> {
    /// Creates a repository over `store`.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Returns the samples of the series whose timestamps lie in `window`,
    /// ordered by timestamp.
    ///
    /// An empty window yields an empty vector without a store round trip.
    /// Codec errors are raised before the store is touched.
    pub async fn range_query(
        &self,
        kind: MetricKind,
        owner: &OwnerId,
        window: TimeWindow,
    ) -> Result<Vec<Sample>, SeriesError> {
        let Some(range) = encode_window_bounds(kind, owner, &window)? else {
            return Ok(Vec::new());
        };

        let entries = self
            .store
            .range_scan(&range)
            .await
            .map_err(|e| Self::store_error(kind, owner, e))?;

        let mut samples = Vec::with_capacity(entries.len());
        for (key, value) in &entries {
            samples.push(Self::decode_entry(kind, owner, &window, key, value)?);
        }

        if !samples.windows(2).all(|w| w[0].timestamp < w[1].timestamp) {
            warn!(
                series = %SeriesId::new(kind, owner.clone()),
                "store returned samples out of order"
            );
            samples.sort_by_key(|s| s.timestamp);
        }

        debug!(
            series = %SeriesId::new(kind, owner.clone()),
            window = %window,
            count = samples.len(),
            "range query"
        );
        Ok(samples)
    }

    /// Stores `sample` in the series, aligned down to the kind's resolution.
    ///
    /// Writing the same slot twice keeps the last value.
    pub async fn append(
        &self,
        kind: MetricKind,
        owner: &OwnerId,
        sample: Sample,
    ) -> Result<(), SeriesError> {
        if sample.timestamp.is_before_epoch() {
            return Err(KeyError::InvalidTimestamp {
                timestamp: sample.timestamp,
            }
            .into());
        }
        let aligned = sample.timestamp.align_down(kind.resolution());
        let key = encode_sample_key(kind, owner, aligned)?;

        self.store
            .put(key, encode_sample_value(sample.value))
            .await
            .map_err(|e| Self::store_error(kind, owner, e))
    }

    /// Returns the newest sample in `window`, if any.
    pub async fn latest(
        &self,
        kind: MetricKind,
        owner: &OwnerId,
        window: TimeWindow,
    ) -> Result<Option<Sample>, SeriesError> {
        let mut samples = self.range_query(kind, owner, window).await?;
        Ok(samples.pop())
    }

    fn decode_entry(
        kind: MetricKind,
        owner: &OwnerId,
        window: &TimeWindow,
        key: &Key,
        value: &Value,
    ) -> Result<Sample, SeriesError> {
        let corrupt = |reason: String| SeriesError::Corrupt {
            series: SeriesId::new(kind, owner.clone()),
            reason,
        };

        let (decoded_kind, decoded_owner, timestamp) =
            decode_sample_key(key.as_bytes()).map_err(|e| corrupt(e.to_string()))?;
        if decoded_kind != kind || &decoded_owner != owner {
            return Err(corrupt(format!(
                "scan returned key of series {}/{}",
                decoded_kind, decoded_owner
            )));
        }
        if !window.contains(timestamp) {
            return Err(corrupt(format!(
                "scan returned timestamp {} outside {}",
                timestamp.as_secs(),
                window
            )));
        }

        let value = decode_sample_value(value.as_bytes()).map_err(|e| corrupt(e.to_string()))?;
        Ok(Sample::new(timestamp, value))
    }

    fn store_error(kind: MetricKind, owner: &OwnerId, source: StoreError) -> SeriesError {
        SeriesError::Store {
            series: SeriesId::new(kind, owner.clone()),
            source,
        }
    }
}
