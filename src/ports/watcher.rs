// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration watcher trait definition.
//!
//! This module defines the `ConfigWatcher` trait, a pull-style interface for
//! receiving the fields of a configuration that changed since the last delivery.

use crate::domain::{FieldMap, Result};

/// A trait for watching configuration sources for changes.
///
/// Callers pull deltas with [`next`](ConfigWatcher::next) and cancel the watch
/// with [`stop`](ConfigWatcher::stop). Both take `&self` so one thread can block
/// in `next` while another stops the watcher.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to allow for use in multi-threaded contexts.
///
/// # Examples
///
/// ```rust
/// use streamcfg::ports::ConfigWatcher;
/// use streamcfg::domain::{ConfigError, FieldMap, Result};
/// use std::sync::atomic::{AtomicBool, Ordering};
///
/// struct Idle {
///     stopped: AtomicBool,
/// }
///
/// impl ConfigWatcher for Idle {
///     fn next(&self) -> Result<FieldMap> {
///         Err(ConfigError::WatcherStopped)
///     }
///
///     fn stop(&self) -> Result<()> {
///         self.stopped.store(true, Ordering::SeqCst);
///         Ok(())
///     }
/// }
///
/// let watcher = Idle { stopped: AtomicBool::new(false) };
/// watcher.stop().unwrap();
/// assert!(watcher.next().unwrap_err().is_stopped());
/// ```
pub trait ConfigWatcher: Send + Sync {
    /// Blocks until the next change is available.
    ///
    /// # Returns
    ///
    /// * `Ok(FieldMap)` - The fields that changed, never empty
    /// * `Err(ConfigError::WatcherStopped)` - The watcher was stopped or has terminated
    /// * `Err(ConfigError)` - A fatal error ended the watch; it is reported once
    fn next(&self) -> Result<FieldMap>;

    /// Stops watching for configuration changes.
    ///
    /// Any call blocked in [`next`](ConfigWatcher::next) returns promptly with
    /// `WatcherStopped`. Calling `stop` more than once is allowed.
    fn stop(&self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ConfigError;
    use serde_json::json;
    use std::sync::Mutex;

    // Replays a fixed list of deltas, then reports stopped.
    struct ScriptedWatcher {
        deltas: Mutex<Vec<FieldMap>>,
    }

    impl ConfigWatcher for ScriptedWatcher {
        fn next(&self) -> Result<FieldMap> {
            self.deltas
                .lock()
                .unwrap()
                .pop()
                .ok_or(ConfigError::WatcherStopped)
        }

        fn stop(&self) -> Result<()> {
            self.deltas.lock().unwrap().clear();
            Ok(())
        }
    }

    #[test]
    fn test_watcher_next_then_stopped() {
        let delta: FieldMap = [("b".to_string(), json!(3))].into();
        let watcher = ScriptedWatcher {
            deltas: Mutex::new(vec![delta.clone()]),
        };
        assert_eq!(watcher.next().unwrap(), delta);
        assert!(watcher.next().unwrap_err().is_stopped());
    }

    #[test]
    fn test_watcher_stop() {
        let watcher = ScriptedWatcher {
            deltas: Mutex::new(vec![FieldMap::new()]),
        };
        watcher.stop().unwrap();
        watcher.stop().unwrap();
        assert!(watcher.next().unwrap_err().is_stopped());
    }

    #[test]
    fn test_watcher_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn ConfigWatcher>();
    }
}
