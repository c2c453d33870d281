// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Sample key encoding and decoding.
//!
//! Format: `[kind_tag:u8][owner_len:u32 BE][owner bytes][timestamp:u64 BE]`
//!
//! The length prefix keeps series prefixes from nesting: no series prefix is
//! a prefix of another, so the key ranges of two different series never
//! overlap. The big-endian timestamp makes byte order equal time order within
//! a series.

use crate::storage::{Key, KeyRange, Value};
use crate::time::Timestamp;

use super::{KeyError, MetricKind, OwnerId, TimeWindow};

/// Maximum owner id size in bytes.
pub const MAX_OWNER_LEN: usize = 1024;

const HEADER_LEN: usize = 1 + 4;
const TIMESTAMP_LEN: usize = 8;
const VALUE_LEN: usize = 8;

/// Returns the prefix shared by every key of a series.
pub fn series_prefix(kind: MetricKind, owner: &OwnerId) -> Result<Vec<u8>, KeyError> {
    let owner_bytes = owner.as_str().as_bytes();
    if owner_bytes.is_empty() {
        return Err(KeyError::EmptyOwner);
    }
    if owner_bytes.len() > MAX_OWNER_LEN {
        return Err(KeyError::OwnerTooLong {
            len: owner_bytes.len(),
            max: MAX_OWNER_LEN,
        });
    }

    let mut prefix = Vec::with_capacity(HEADER_LEN + owner_bytes.len() + TIMESTAMP_LEN);
    prefix.push(kind.tag());
    prefix.extend_from_slice(&(owner_bytes.len() as u32).to_be_bytes());
    prefix.extend_from_slice(owner_bytes);
    Ok(prefix)
}

/// Encodes the key of the sample at `ts` in series `(kind, owner)`.
pub fn encode_sample_key(
    kind: MetricKind,
    owner: &OwnerId,
    ts: Timestamp,
) -> Result<Key, KeyError> {
    if ts.is_before_epoch() {
        return Err(KeyError::InvalidTimestamp { timestamp: ts });
    }

    let mut encoded = series_prefix(kind, owner)?;
    encoded.extend_from_slice(&(ts.as_secs() as u64).to_be_bytes());
    Ok(Key::new(encoded))
}

/// Decodes a sample key back into its series and timestamp.
pub fn decode_sample_key(encoded: &[u8]) -> Result<(MetricKind, OwnerId, Timestamp), KeyError> {
    if encoded.len() < HEADER_LEN {
        return Err(KeyError::InvalidKeyEncoding(
            "key too short for header".to_string(),
        ));
    }

    let kind = MetricKind::from_tag(encoded[0])?;
    let owner_len = u32::from_be_bytes([encoded[1], encoded[2], encoded[3], encoded[4]]) as usize;

    let expected_len = HEADER_LEN + owner_len + TIMESTAMP_LEN;
    if encoded.len() != expected_len {
        return Err(KeyError::InvalidKeyEncoding(format!(
            "expected {} bytes, got {}",
            expected_len,
            encoded.len()
        )));
    }

    if owner_len == 0 {
        return Err(KeyError::InvalidKeyEncoding("empty owner".to_string()));
    }

    let owner_bytes = &encoded[HEADER_LEN..HEADER_LEN + owner_len];
    let owner = std::str::from_utf8(owner_bytes)
        .map_err(|e| KeyError::InvalidKeyEncoding(format!("owner is not utf-8: {}", e)))?;

    let ts_offset = HEADER_LEN + owner_len;
    let mut ts_bytes = [0u8; TIMESTAMP_LEN];
    ts_bytes.copy_from_slice(&encoded[ts_offset..]);
    let secs = u64::from_be_bytes(ts_bytes);
    let secs = i64::try_from(secs).map_err(|_| {
        KeyError::InvalidKeyEncoding(format!("timestamp {} out of range", secs))
    })?;

    Ok((kind, OwnerId::from(owner), Timestamp::from_secs(secs)))
}

/// Computes the key range holding exactly the samples of `(kind, owner)`
/// inside `window`.
///
/// Returns `None` when the window is empty or lies entirely before the
/// epoch, without looking at the owner. A start before the epoch is clamped
/// to it; nothing earlier can be stored.
pub fn encode_window_bounds(
    kind: MetricKind,
    owner: &OwnerId,
    window: &TimeWindow,
) -> Result<Option<KeyRange>, KeyError> {
    if window.is_empty() || window.end <= Timestamp::EPOCH {
        return Ok(None);
    }

    let start = window.start.max(Timestamp::EPOCH);
    let lower = encode_sample_key(kind, owner, start)?;
    let upper = encode_sample_key(kind, owner, window.end)?;
    Ok(Some(KeyRange::new(lower, upper)))
}

/// Encodes a sample value as its big-endian IEEE-754 bit pattern.
#[inline]
pub fn encode_sample_value(value: f64) -> Value {
    Value::new(value.to_bits().to_be_bytes().to_vec())
}

/// Decodes a value written by [`encode_sample_value`].
pub fn decode_sample_value(encoded: &[u8]) -> Result<f64, KeyError> {
    let bytes: [u8; VALUE_LEN] = encoded.try_into().map_err(|_| {
        KeyError::InvalidValueEncoding(format!(
            "expected {} bytes, got {}",
            VALUE_LEN,
            encoded.len()
        ))
    })?;
    Ok(f64::from_bits(u64::from_be_bytes(bytes)))
}
