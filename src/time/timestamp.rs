// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Whole-second instants measured from the Unix epoch.

use std::time::Duration;

use serde::Serialize;

/// An instant in whole seconds since `1970-01-01T00:00:00Z`.
///
/// Negative values are representable so that callers can build windows
/// relative to "now" without overflow checks, but nothing before the epoch
/// can be stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// The Unix epoch. The earliest storable instant.
    pub const EPOCH: Timestamp = Timestamp(0);

    /// Creates a timestamp from seconds since the epoch.
    #[inline]
    pub const fn from_secs(secs: i64) -> Self {
        Self(secs)
    }

    /// Creates a timestamp from whole minutes since the epoch.
    #[inline]
    pub const fn from_minutes(minutes: i64) -> Self {
        Self(minutes.saturating_mul(60))
    }

    /// Returns seconds since the epoch.
    #[inline]
    pub const fn as_secs(&self) -> i64 {
        self.0
    }

    /// Returns true if this instant precedes the epoch.
    #[inline]
    pub const fn is_before_epoch(&self) -> bool {
        self.0 < 0
    }

    /// Rounds down to the start of the bucket of width `resolution`.
    ///
    /// Buckets are anchored at the epoch, so instants before it round
    /// towards negative infinity rather than towards zero. A bucket start
    /// below `i64::MIN` saturates there.
    pub fn align_down(&self, resolution: Duration) -> Self {
        let width = i64::try_from(resolution.as_secs()).unwrap_or(i64::MAX);
        if width <= 1 {
            return *self;
        }
        Self(self.0.div_euclid(width).saturating_mul(width))
    }

    /// Returns `self - duration`, saturating at `i64::MIN`.
    pub fn saturating_sub(&self, duration: Duration) -> Self {
        let secs = i64::try_from(duration.as_secs()).unwrap_or(i64::MAX);
        Self(self.0.saturating_sub(secs))
    }

    /// Returns `self + duration`, saturating at `i64::MAX`.
    pub fn saturating_add(&self, duration: Duration) -> Self {
        let secs = i64::try_from(duration.as_secs()).unwrap_or(i64::MAX);
        Self(self.0.saturating_add(secs))
    }
}

impl From<i64> for Timestamp {
    fn from(secs: i64) -> Self {
        Self(secs)
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}s", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_minutes() {
        assert_eq!(Timestamp::from_minutes(10).as_secs(), 600);
        assert_eq!(Timestamp::from_minutes(0), Timestamp::EPOCH);
    }

    #[test]
    fn test_align_down_to_minute() {
        let minute = Duration::from_secs(60);
        assert_eq!(Timestamp::from_secs(659).align_down(minute), Timestamp::from_secs(600));
        assert_eq!(Timestamp::from_secs(600).align_down(minute), Timestamp::from_secs(600));
        assert_eq!(Timestamp::from_secs(-1).align_down(minute), Timestamp::from_secs(-60));
    }

    #[test]
    fn test_align_down_saturates_near_min() {
        let minute = Duration::from_secs(60);
        assert_eq!(Timestamp::from_secs(i64::MIN).align_down(minute).as_secs(), i64::MIN);
        assert_eq!(Timestamp::from_secs(i64::MIN + 5).align_down(minute).as_secs(), i64::MIN);
        assert_eq!(
            Timestamp::from_secs(i64::MAX - 1).align_down(Duration::MAX),
            Timestamp::EPOCH
        );
    }

    #[test]
    fn test_align_down_sub_second_resolution_is_identity() {
        let ts = Timestamp::from_secs(1234);
        assert_eq!(ts.align_down(Duration::from_millis(500)), ts);
        assert_eq!(ts.align_down(Duration::from_secs(1)), ts);
    }

    #[test]
    fn test_before_epoch() {
        assert!(Timestamp::from_secs(-1).is_before_epoch());
        assert!(!Timestamp::EPOCH.is_before_epoch());
    }

    #[test]
    fn test_saturating_arithmetic() {
        let ts = Timestamp::from_secs(i64::MIN + 1);
        assert_eq!(ts.saturating_sub(Duration::from_secs(10)).as_secs(), i64::MIN);

        let ts = Timestamp::from_secs(100);
        assert_eq!(ts.saturating_add(Duration::from_secs(20)).as_secs(), 120);
    }

    #[test]
    fn test_ordering() {
        assert!(Timestamp::from_minutes(10) < Timestamp::from_minutes(11));
    }
}
