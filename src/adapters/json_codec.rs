// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON codec adapter.

use crate::domain::{ConfigError, Result};
use crate::ports::ConfigCodec;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Decodes and encodes records as JSON using `serde_json`.
///
/// # Examples
///
/// ```rust
/// use serde::{Deserialize, Serialize};
/// use streamcfg::adapters::JsonCodec;
/// use streamcfg::ports::ConfigCodec;
///
/// #[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
/// struct Config {
///     key: String,
///     pass: String,
/// }
///
/// let mut cfg = Config::default();
/// JsonCodec::new()
///     .decode(br#"{"key":"val","pass":"test"}"#, &mut cfg)
///     .unwrap();
/// assert_eq!(cfg.pass, "test");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec {
    pretty: bool,
}

impl JsonCodec {
    /// Creates a codec producing compact JSON.
    pub fn new() -> Self {
        Self { pretty: false }
    }

    /// Creates a codec producing indented JSON when encoding.
    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

impl<R> ConfigCodec<R> for JsonCodec
where
    R: Serialize + DeserializeOwned,
{
    fn name(&self) -> &str {
        "json"
    }

    fn decode(&self, bytes: &[u8], dst: &mut R) -> Result<()> {
        *dst = serde_json::from_slice(bytes).map_err(|e| ConfigError::decode("json", e))?;
        Ok(())
    }

    fn encode(&self, src: &R) -> Result<Vec<u8>> {
        let encoded = if self.pretty {
            serde_json::to_vec_pretty(src)
        } else {
            serde_json::to_vec(src)
        };
        encoded.map_err(|e| ConfigError::encode("json", e))
    }
}
