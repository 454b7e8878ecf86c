// SPDX-License-Identifier: MIT OR Apache-2.0

//! Randomized polling intervals.

use crate::domain::{ConfigError, Result};
use rand::Rng;
use std::time::Duration;

/// Produces wait durations drawn uniformly from `[min, max]`.
///
/// Many watchers polling the same resource with a fixed period tend to fire in
/// lockstep; drawing every interval at random keeps them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JitterTicker {
    min: Duration,
    max: Duration,
}

impl JitterTicker {
    /// Creates a ticker for the given bounds.
    ///
    /// Returns `InvalidInterval` if `min` exceeds `max`.
    pub fn new(min: Duration, max: Duration) -> Result<Self> {
        if min > max {
            return Err(ConfigError::InvalidInterval { min, max });
        }
        Ok(Self { min, max })
    }

    /// Returns the lower bound.
    pub fn min(&self) -> Duration {
        self.min
    }

    /// Returns the upper bound.
    pub fn max(&self) -> Duration {
        self.max
    }

    /// Draws the next interval.
    pub fn next_interval(&self) -> Duration {
        let span = self.max - self.min;
        if span.is_zero() {
            return self.min;
        }
        let span_nanos = u64::try_from(span.as_nanos()).unwrap_or(u64::MAX);
        let offset = rand::thread_rng().gen_range(0..=span_nanos);
        self.min + Duration::from_nanos(offset)
    }
}
