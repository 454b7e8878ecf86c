// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration codec trait definition.
//!
//! This module defines the `ConfigCodec` trait, which decodes raw configuration bytes
//! into a record and encodes a record back into bytes. The byte layout is entirely
//! up to the codec (JSON, YAML, ...).

use crate::domain::Result;
use std::sync::Arc;

/// A pluggable serialization format for records of type `R`.
///
/// # Examples
///
/// ```rust
/// use streamcfg::domain::{ConfigError, Result};
/// use streamcfg::ports::ConfigCodec;
///
/// struct Lines;
///
/// impl ConfigCodec<Vec<String>> for Lines {
///     fn name(&self) -> &str {
///         "lines"
///     }
///
///     fn decode(&self, bytes: &[u8], dst: &mut Vec<String>) -> Result<()> {
///         let text = std::str::from_utf8(bytes).map_err(|e| ConfigError::decode("lines", e))?;
///         *dst = text.lines().map(str::to_string).collect();
///         Ok(())
///     }
///
///     fn encode(&self, src: &Vec<String>) -> Result<Vec<u8>> {
///         Ok(src.join("\n").into_bytes())
///     }
/// }
///
/// let mut lines = Vec::new();
/// Lines.decode(b"a\nb", &mut lines).unwrap();
/// assert_eq!(lines, vec!["a", "b"]);
/// ```
pub trait ConfigCodec<R>: Send + Sync {
    /// Returns a short identifier such as `json` or `yaml`, used in errors and logs.
    fn name(&self) -> &str;

    /// Decodes `bytes` into `dst`.
    ///
    /// `dst` is usually a freshly zeroed record. Malformed input is reported as
    /// [`ConfigError::DecodeFailure`](crate::domain::ConfigError::DecodeFailure).
    fn decode(&self, bytes: &[u8], dst: &mut R) -> Result<()>;

    /// Encodes `src` into bytes.
    fn encode(&self, src: &R) -> Result<Vec<u8>>;
}

impl<R, C> ConfigCodec<R> for Arc<C>
where
    C: ConfigCodec<R> + ?Sized,
{
    fn name(&self) -> &str {
        (**self).name()
    }

    fn decode(&self, bytes: &[u8], dst: &mut R) -> Result<()> {
        (**self).decode(bytes, dst)
    }

    fn encode(&self, src: &R) -> Result<Vec<u8>> {
        (**self).encode(src)
    }
}
