// SPDX-License-Identifier: MIT OR Apache-2.0

//! Byte source trait definition.
//!
//! This module defines the `ByteSource` trait, the port through which the watcher
//! re-acquires raw configuration bytes on every reconciliation tick. A file source
//! opens, reads and closes its path on each call; a reader source simply reads the
//! caller's stream again.

use crate::domain::Result;

/// A trait for sources of raw configuration bytes.
///
/// # Thread Safety
///
/// Implementations must be `Send` so they can be moved into the watcher's
/// background thread.
///
/// # Examples
///
/// ```rust
/// use streamcfg::ports::ByteSource;
/// use streamcfg::domain::Result;
///
/// struct Fixed(&'static [u8]);
///
/// impl ByteSource for Fixed {
///     fn name(&self) -> &str {
///         "fixed"
///     }
///
///     fn acquire(&mut self) -> Result<Vec<u8>> {
///         Ok(self.0.to_vec())
///     }
/// }
///
/// let mut source = Fixed(b"{}");
/// assert_eq!(source.acquire().unwrap(), b"{}");
/// ```
pub trait ByteSource: Send {
    /// Returns a short description of the source for logs and errors.
    fn name(&self) -> &str;

    /// Reads the complete current contents of the source.
    ///
    /// Failures are reported as
    /// [`ConfigError::SourceUnavailable`](crate::domain::ConfigError::SourceUnavailable).
    fn acquire(&mut self) -> Result<Vec<u8>>;
}

impl ByteSource for Box<dyn ByteSource> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn acquire(&mut self) -> Result<Vec<u8>> {
        (**self).acquire()
    }
}
