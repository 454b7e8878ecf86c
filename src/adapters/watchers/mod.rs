// SPDX-License-Identifier: MIT OR Apache-2.0

//! Watcher implementations for configuration change detection.
//!
//! This module contains implementations of the `ConfigWatcher` trait for
//! monitoring configuration changes.

pub mod jitter;
pub mod polling_watcher;

pub use jitter::JitterTicker;
pub use polling_watcher::{PollingWatcher, WatchOptions, DEFAULT_MAX_INTERVAL, DEFAULT_MIN_INTERVAL};
