// SPDX-License-Identifier: MIT OR Apache-2.0

//! YAML codec adapter.

use crate::domain::{ConfigError, Result};
use crate::ports::ConfigCodec;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Decodes and encodes records as YAML using `serde_yaml`.
///
/// # Examples
///
/// ```rust
/// use streamcfg::adapters::YamlCodec;
/// use streamcfg::ports::ConfigCodec;
///
/// let mut value = serde_json::Value::Null;
/// YamlCodec::new()
///     .decode(b"database:\n  host: localhost\n  port: 5432\n", &mut value)
///     .unwrap();
/// assert_eq!(value["database"]["port"], 5432);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlCodec;

impl YamlCodec {
    /// Creates a new YAML codec.
    pub fn new() -> Self {
        YamlCodec
    }
}

impl<R> ConfigCodec<R> for YamlCodec
where
    R: Serialize + DeserializeOwned,
{
    fn name(&self) -> &str {
        "yaml"
    }

    fn decode(&self, bytes: &[u8], dst: &mut R) -> Result<()> {
        *dst = serde_yaml::from_slice(bytes).map_err(|e| ConfigError::decode("yaml", e))?;
        Ok(())
    }

    fn encode(&self, src: &R) -> Result<Vec<u8>> {
        serde_yaml::to_string(src)
            .map(String::into_bytes)
            .map_err(|e| ConfigError::encode("yaml", e))
    }
}
