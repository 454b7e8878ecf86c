// SPDX-License-Identifier: MIT OR Apache-2.0

//! Polling watcher for configuration changes.
//!
//! This module provides a watcher that periodically re-reads a byte source,
//! decodes it into a scratch record and publishes the fields that differ from
//! the last known record.

use crate::adapters::watchers::jitter::JitterTicker;
use crate::domain::{ConfigError, FieldMap, Result};
use crate::ports::{diff_records, ByteSource, ConfigCodec, ConfigWatcher, Record};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Default lower bound of the polling interval.
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_secs(5);

/// Default upper bound of the polling interval.
pub const DEFAULT_MAX_INTERVAL: Duration = Duration::from_secs(9);

/// Polling interval bounds for a [`PollingWatcher`].
///
/// Each wait between reconciliation ticks is drawn uniformly from
/// `[min_interval, max_interval]`.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use streamcfg::adapters::WatchOptions;
///
/// let options = WatchOptions::new()
///     .min_interval(Duration::from_secs(1))
///     .max_interval(Duration::from_secs(2));
/// assert!(options.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchOptions {
    /// Shortest wait between ticks
    pub min_interval: Duration,
    /// Longest wait between ticks
    pub max_interval: Duration,
}

impl WatchOptions {
    /// Creates options with the default 5s to 9s interval.
    pub fn new() -> Self {
        Self {
            min_interval: DEFAULT_MIN_INTERVAL,
            max_interval: DEFAULT_MAX_INTERVAL,
        }
    }

    /// Sets the shortest wait between ticks.
    pub fn min_interval(mut self, interval: Duration) -> Self {
        self.min_interval = interval;
        self
    }

    /// Sets the longest wait between ticks.
    pub fn max_interval(mut self, interval: Duration) -> Self {
        self.max_interval = interval;
        self
    }

    /// Sets both bounds.
    pub fn interval(self, min: Duration, max: Duration) -> Self {
        self.min_interval(min).max_interval(max)
    }

    /// Checks that the bounds are ordered.
    pub fn validate(&self) -> Result<()> {
        JitterTicker::new(self.min_interval, self.max_interval).map(|_| ())
    }
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self::new()
    }
}

enum WatchEvent {
    Delta(FieldMap),
    Failed(ConfigError),
}

#[derive(Debug, Default)]
struct Slot {
    /// The event waiting for a consumer
    event: Option<WatchEvent>,
    /// Set once by `stop`
    stopped: bool,
    /// Set when the polling thread has exited
    finished: bool,
}

/// Single-event rendezvous between the polling thread and its consumers.
///
/// Every state change is broadcast, so consumers blocked in `next` observe
/// `stop` without waiting for the polling thread.
#[derive(Debug, Default)]
struct Handoff {
    slot: Mutex<Slot>,
    changed: Condvar,
}

impl Handoff {
    fn slot(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn wait<'a>(&self, slot: MutexGuard<'a, Slot>) -> MutexGuard<'a, Slot> {
        self.changed
            .wait(slot)
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Sleeps for `interval` unless stopped first. Returns false once stopped.
    fn sleep(&self, interval: Duration) -> bool {
        let slot = self.slot();
        let (slot, _) = self
            .changed
            .wait_timeout_while(slot, interval, |slot| !slot.stopped)
            .unwrap_or_else(PoisonError::into_inner);
        !slot.stopped
    }

    /// Offers `event` and waits until a consumer takes it. Returns false if
    /// the watcher was stopped instead.
    fn publish(&self, event: WatchEvent) -> bool {
        let mut slot = self.slot();
        if slot.stopped {
            return false;
        }
        slot.event = Some(event);
        self.changed.notify_all();

        let slot = self
            .changed
            .wait_while(slot, |slot| slot.event.is_some() && !slot.stopped)
            .unwrap_or_else(PoisonError::into_inner);
        !slot.stopped
    }

    /// Marks the watcher stopped. Returns false if it already was.
    fn stop(&self) -> bool {
        let mut slot = self.slot();
        if slot.stopped {
            return false;
        }
        slot.stopped = true;
        slot.event = None;
        self.changed.notify_all();
        true
    }

    fn is_stopped(&self) -> bool {
        self.slot().stopped
    }
}

/// Marks the handoff finished when the polling thread exits, even by panic.
struct FinishGuard(Arc<Handoff>);

impl Drop for FinishGuard {
    fn drop(&mut self) {
        let mut slot = self.0.slot();
        slot.finished = true;
        self.0.changed.notify_all();
    }
}

/// One reconciliation tick: read, decode, diff.
struct Reconciler<S, C, R> {
    source: S,
    codec: C,
    last_known: R,
}

impl<S, C, R> Reconciler<S, C, R>
where
    S: ByteSource,
    C: ConfigCodec<R>,
    R: Record,
{
    fn tick(&mut self) -> Result<Option<FieldMap>> {
        let mut scratch = self.last_known.zero_like();
        let bytes = self.source.acquire()?;
        self.codec.decode(&bytes, &mut scratch)?;

        let delta = diff_records(&self.last_known, &scratch)?;
        if delta.is_empty() {
            tracing::trace!("No changes in {}", self.source.name());
            return Ok(None);
        }

        tracing::debug!(
            "Detected {} changed field(s) in {}",
            delta.len(),
            self.source.name()
        );
        self.last_known = scratch;
        Ok(Some(delta))
    }
}

/// Watcher that polls a byte source on a jittered interval.
///
/// A background thread re-reads the source, decodes it with the codec and
/// compares the result against the last known record. Non-empty deltas are
/// handed over one at a time through [`next`](ConfigWatcher::next); the thread
/// waits for each delta to be taken before polling again.
///
/// [`stop`](ConfigWatcher::stop) wakes every blocked `next` at once, even while
/// the thread is still inside a slow read. Dropping the watcher stops it and
/// waits for that read to finish.
///
/// Reading or decoding failures end the watch. The error is returned once by
/// `next`, after which `next` reports `WatcherStopped`. Create a new watcher to
/// resume.
///
/// # Examples
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use std::time::Duration;
/// use streamcfg::adapters::{FileSource, JsonCodec, PollingWatcher, WatchOptions};
/// use streamcfg::ports::ConfigWatcher;
///
/// # fn main() -> streamcfg::domain::Result<()> {
/// let watcher = PollingWatcher::watch(
///     FileSource::new("/path/to/config.json"),
///     JsonCodec::new(),
///     serde_json::Value::Null,
///     WatchOptions::new().interval(Duration::from_secs(1), Duration::from_secs(2)),
/// )?;
///
/// let delta = watcher.next()?;
/// println!("changed: {:?}", delta);
///
/// // Later, stop watching
/// watcher.stop()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct PollingWatcher {
    /// Name of the watched source
    name: String,
    /// Deltas, the terminal error and the stop flag shared with the thread
    handoff: Arc<Handoff>,
    /// Thread handle for the polling thread
    worker: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for WatchEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WatchEvent::Delta(delta) => f.debug_tuple("Delta").field(delta).finish(),
            WatchEvent::Failed(err) => f.debug_tuple("Failed").field(err).finish(),
        }
    }
}

impl PollingWatcher {
    /// Starts watching `source`.
    ///
    /// # Arguments
    ///
    /// * `source` - Where to read the configuration bytes on every tick
    /// * `codec` - How to decode the bytes
    /// * `initial` - The record the first tick is compared against
    /// * `options` - Polling interval bounds
    pub fn watch<S, C, R>(source: S, codec: C, initial: R, options: WatchOptions) -> Result<Self>
    where
        S: ByteSource + 'static,
        C: ConfigCodec<R> + 'static,
        R: Record,
    {
        let ticker = JitterTicker::new(options.min_interval, options.max_interval)?;
        let name = source.name().to_string();

        let handoff = Arc::new(Handoff::default());

        let reconciler = Reconciler {
            source,
            codec,
            last_known: initial,
        };

        let thread_name = name.clone();
        let thread_handoff = Arc::clone(&handoff);
        let worker = thread::Builder::new()
            .name("streamcfg-watcher".to_string())
            .spawn(move || run(reconciler, ticker, thread_handoff, &thread_name))
            .map_err(|e| ConfigError::WatcherError {
                message: format!("Failed to spawn watcher thread: {}", e),
                source: Some(Box::new(e)),
            })?;

        tracing::debug!(
            "Watching {} every {:?}..{:?}",
            name,
            options.min_interval,
            options.max_interval
        );

        Ok(Self {
            name,
            handoff,
            worker: Some(worker),
        })
    }

    /// Returns the name of the watched source.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true once [`stop`](ConfigWatcher::stop) has been called.
    pub fn is_stopped(&self) -> bool {
        self.handoff.is_stopped()
    }
}

fn run<S, C, R>(
    mut reconciler: Reconciler<S, C, R>,
    ticker: JitterTicker,
    handoff: Arc<Handoff>,
    name: &str,
) where
    S: ByteSource,
    C: ConfigCodec<R>,
    R: Record,
{
    let _finish = FinishGuard(Arc::clone(&handoff));

    loop {
        if !handoff.sleep(ticker.next_interval()) {
            tracing::debug!("Watcher for {} stopped", name);
            return;
        }

        let (event, fatal) = match reconciler.tick() {
            Ok(None) => continue,
            Ok(Some(delta)) => (WatchEvent::Delta(delta), false),
            Err(err) => {
                tracing::warn!("Watcher for {} terminating: {}", name, err);
                (WatchEvent::Failed(err), true)
            }
        };

        if !handoff.publish(event) {
            tracing::debug!("Watcher for {} stopped", name);
            return;
        }
        if fatal {
            return;
        }
    }
}

impl ConfigWatcher for PollingWatcher {
    fn next(&self) -> Result<FieldMap> {
        let mut slot = self.handoff.slot();
        loop {
            if slot.stopped {
                return Err(ConfigError::WatcherStopped);
            }
            if let Some(event) = slot.event.take() {
                self.handoff.changed.notify_all();
                return match event {
                    WatchEvent::Delta(delta) => Ok(delta),
                    WatchEvent::Failed(err) => Err(err),
                };
            }
            if slot.finished {
                return Err(ConfigError::WatcherStopped);
            }
            slot = self.handoff.wait(slot);
        }
    }

    fn stop(&self) -> Result<()> {
        if self.handoff.stop() {
            tracing::debug!("Stopping watcher for {}", self.name);
        }
        Ok(())
    }
}

impl Drop for PollingWatcher {
    fn drop(&mut self) {
        let _ = self.stop();

        // Wait for the thread to finish its current tick
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::flatten_fields;
    use serde::{Deserialize, Serialize};
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Instant;

    #[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
    struct Pair {
        #[serde(rename = "A")]
        a: i64,
        #[serde(rename = "B")]
        b: i64,
    }

    impl Record for Pair {
        fn zero_like(&self) -> Self {
            Pair::default()
        }

        fn to_fields(&self) -> Result<FieldMap> {
            flatten_fields(self)
        }
    }

    struct PairCodec;

    impl ConfigCodec<Pair> for PairCodec {
        fn name(&self) -> &str {
            "pair"
        }

        fn decode(&self, bytes: &[u8], dst: &mut Pair) -> Result<()> {
            *dst = serde_json::from_slice(bytes).map_err(|e| ConfigError::decode("pair", e))?;
            Ok(())
        }

        fn encode(&self, src: &Pair) -> Result<Vec<u8>> {
            serde_json::to_vec(src).map_err(|e| ConfigError::encode("pair", e))
        }
    }

    #[derive(Clone)]
    struct MemorySource(Arc<Mutex<std::result::Result<Vec<u8>, String>>>);

    impl MemorySource {
        fn new(content: &str) -> Self {
            MemorySource(Arc::new(Mutex::new(Ok(content.as_bytes().to_vec()))))
        }

        fn set(&self, content: &str) {
            *self.0.lock().unwrap() = Ok(content.as_bytes().to_vec());
        }

        fn fail(&self, message: &str) {
            *self.0.lock().unwrap() = Err(message.to_string());
        }
    }

    impl ByteSource for MemorySource {
        fn name(&self) -> &str {
            "memory"
        }

        fn acquire(&mut self) -> Result<Vec<u8>> {
            self.0
                .lock()
                .unwrap()
                .clone()
                .map_err(|message| ConfigError::SourceUnavailable {
                    source_name: "memory".to_string(),
                    message,
                    source: None,
                })
        }
    }

    // Takes `delay` to produce unchanged content.
    struct SlowSource {
        delay: Duration,
    }

    impl ByteSource for SlowSource {
        fn name(&self) -> &str {
            "slow"
        }

        fn acquire(&mut self) -> Result<Vec<u8>> {
            thread::sleep(self.delay);
            Ok(br#"{"A":1,"B":2}"#.to_vec())
        }
    }

    fn fast() -> WatchOptions {
        WatchOptions::new().interval(Duration::from_millis(5), Duration::from_millis(15))
    }

    fn start(source: &MemorySource) -> Arc<PollingWatcher> {
        Arc::new(
            PollingWatcher::watch(source.clone(), PairCodec, Pair { a: 1, b: 2 }, fast()).unwrap(),
        )
    }

    fn stop_after(watcher: &Arc<PollingWatcher>, delay: Duration) -> thread::JoinHandle<()> {
        let watcher = Arc::clone(watcher);
        thread::spawn(move || {
            thread::sleep(delay);
            watcher.stop().unwrap();
        })
    }

    #[test]
    fn test_watch_options_default() {
        let options = WatchOptions::default();
        assert_eq!(options.min_interval, DEFAULT_MIN_INTERVAL);
        assert_eq!(options.max_interval, DEFAULT_MAX_INTERVAL);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_watch_rejects_inverted_interval() {
        let options = WatchOptions::new().interval(Duration::from_secs(2), Duration::from_secs(1));
        let result = PollingWatcher::watch(MemorySource::new("{}"), PairCodec, Pair::default(), options);
        assert!(matches!(result, Err(ConfigError::InvalidInterval { .. })));
    }

    #[test]
    fn test_single_delta_for_single_change() {
        let source = MemorySource::new(r#"{"A":1,"B":2}"#);
        let watcher = start(&source);

        thread::sleep(Duration::from_millis(50));
        source.set(r#"{"A":1,"B":3}"#);

        let delta = watcher.next().unwrap();
        assert_eq!(delta.len(), 1);
        assert_eq!(delta["B"], json!(3));

        // Unchanged content produces nothing more.
        let stopper = stop_after(&watcher, Duration::from_millis(100));
        assert!(watcher.next().unwrap_err().is_stopped());
        stopper.join().unwrap();
    }

    #[test]
    fn test_deltas_in_detection_order() {
        let source = MemorySource::new(r#"{"A":1,"B":2}"#);
        let watcher = start(&source);

        source.set(r#"{"A":5,"B":2}"#);
        let first = watcher.next().unwrap();
        assert_eq!(first["A"], json!(5));
        assert!(!first.contains_key("B"));

        source.set(r#"{"A":5,"B":9}"#);
        let second = watcher.next().unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second["B"], json!(9));

        watcher.stop().unwrap();
    }

    #[test]
    fn test_source_failure_is_fatal_and_reported_once() {
        let source = MemorySource::new(r#"{"A":1,"B":2}"#);
        source.fail("disk gone");
        let watcher = start(&source);

        let err = watcher.next().unwrap_err();
        assert!(matches!(err, ConfigError::SourceUnavailable { .. }));
        assert!(watcher.next().unwrap_err().is_stopped());
    }

    #[test]
    fn test_decode_failure_is_fatal() {
        let source = MemorySource::new("{not json");
        let watcher = start(&source);

        let err = watcher.next().unwrap_err();
        assert!(matches!(err, ConfigError::DecodeFailure { .. }));
        assert!(watcher.next().unwrap_err().is_stopped());
    }

    #[test]
    fn test_next_after_stop_returns_immediately() {
        let source = MemorySource::new(r#"{"A":1,"B":2}"#);
        let watcher = start(&source);

        watcher.stop().unwrap();
        let started = Instant::now();
        assert!(watcher.next().unwrap_err().is_stopped());
        assert!(started.elapsed() < Duration::from_millis(100));
        assert!(watcher.is_stopped());
    }

    #[test]
    fn test_stop_is_idempotent() {
        let source = MemorySource::new(r#"{"A":1,"B":2}"#);
        let watcher = start(&source);
        assert!(watcher.stop().is_ok());
        assert!(watcher.stop().is_ok());
    }

    #[test]
    fn test_stop_unblocks_pending_next() {
        let source = MemorySource::new(r#"{"A":1,"B":2}"#);
        let watcher = Arc::new(
            PollingWatcher::watch(
                source.clone(),
                PairCodec,
                Pair { a: 1, b: 2 },
                WatchOptions::new().interval(Duration::from_secs(30), Duration::from_secs(60)),
            )
            .unwrap(),
        );

        let stopper = stop_after(&watcher, Duration::from_millis(50));
        let started = Instant::now();
        assert!(watcher.next().unwrap_err().is_stopped());
        assert!(started.elapsed() < Duration::from_secs(5));
        stopper.join().unwrap();
    }

    #[test]
    fn test_stop_unblocks_next_during_slow_read() {
        let watcher = Arc::new(
            PollingWatcher::watch(
                SlowSource {
                    delay: Duration::from_secs(2),
                },
                PairCodec,
                Pair { a: 1, b: 2 },
                WatchOptions::new().interval(Duration::from_millis(1), Duration::from_millis(2)),
            )
            .unwrap(),
        );

        let consumers: Vec<_> = (0..2)
            .map(|_| {
                let watcher = Arc::clone(&watcher);
                thread::spawn(move || {
                    let result = watcher.next();
                    (result, Instant::now())
                })
            })
            .collect();

        // Both consumers are waiting while the thread is inside the read.
        thread::sleep(Duration::from_millis(200));
        let stopped_at = Instant::now();
        watcher.stop().unwrap();

        for consumer in consumers {
            let (result, returned_at) = consumer.join().unwrap();
            assert!(result.unwrap_err().is_stopped());
            assert!(returned_at.duration_since(stopped_at) < Duration::from_millis(500));
        }
    }

    #[test]
    fn test_stop_releases_unconsumed_delta() {
        let source = MemorySource::new(r#"{"A":9,"B":9}"#);
        let watcher = start(&source);

        // Give the thread time to block on handing over the delta.
        thread::sleep(Duration::from_millis(50));
        watcher.stop().unwrap();
        assert!(watcher.next().unwrap_err().is_stopped());
        drop(watcher);
    }

    #[test]
    fn test_watcher_name() {
        let source = MemorySource::new("{}");
        let watcher = start(&source);
        assert_eq!(watcher.name(), "memory");
    }
}
