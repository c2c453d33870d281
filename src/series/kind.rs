// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Metric kind identification.

use std::str::FromStr;
use std::time::Duration;

use super::KeyError;

/// What a series measures. Closed set; each variant owns a distinct key tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MetricKind {
    /// One sensor reading per minute.
    SensorValuesPerMinute,
}

impl MetricKind {
    /// Every known kind.
    pub const ALL: [MetricKind; 1] = [MetricKind::SensorValuesPerMinute];

    /// Returns the one-byte tag that leads every key of this kind.
    #[inline]
    pub fn tag(&self) -> u8 {
        match self {
            MetricKind::SensorValuesPerMinute => 0x01,
        }
    }

    /// Resolves a key tag.
    pub fn from_tag(tag: u8) -> Result<Self, KeyError> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.tag() == tag)
            .ok_or_else(|| KeyError::UnknownMetricKind(format!("tag 0x{:02x}", tag)))
    }

    /// Returns the canonical name.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            MetricKind::SensorValuesPerMinute => "SENSOR_VALUES_PER_MINUTE",
        }
    }

    /// Width of one sample slot. Samples inside the same slot are the same
    /// logical sample.
    #[inline]
    pub fn resolution(&self) -> Duration {
        match self {
            MetricKind::SensorValuesPerMinute => Duration::from_secs(60),
        }
    }
}

impl FromStr for MetricKind {
    type Err = KeyError;

    /// Accepts the canonical name, upper or lower case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| s == kind.name() || s == kind.name().to_ascii_lowercase())
            .ok_or_else(|| KeyError::UnknownMetricKind(s.to_string()))
    }
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
