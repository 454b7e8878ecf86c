// SPDX-License-Identifier: MIT OR Apache-2.0

//! Environment variable key lookup adapter.
//!
//! This module provides a [`KeyLookup`] that resolves placeholder keys from the
//! process environment.

use crate::ports::KeyLookup;
use std::collections::HashMap;
use std::env;

/// Maximum length for environment variable keys (prevents DoS)
const MAX_ENV_KEY_LEN: usize = 512;

/// Maximum length for environment variable values (prevents DoS)
const MAX_ENV_VALUE_LEN: usize = 1048576; // 1MB

/// Key lookup backed by environment variables.
///
/// Keys are read live on every lookup, so a watcher picks up environment changes
/// on its next tick. An optional prefix is prepended to every key, which lets a
/// placeholder `${DB_HOST}` resolve `MYAPP_DB_HOST`.
///
/// # Examples
///
/// ```rust
/// use streamcfg::adapters::EnvVarLookup;
/// use streamcfg::ports::KeyLookup;
///
/// // Resolve keys as-is
/// let lookup = EnvVarLookup::new();
///
/// // Resolve `${HOST}` from `MYAPP_HOST`
/// let lookup = EnvVarLookup::with_prefix("MYAPP_");
/// ```
#[derive(Debug, Clone, Default)]
pub struct EnvVarLookup {
    /// Optional prefix prepended to every key
    prefix: Option<String>,
    /// Fixed values used instead of the process environment
    values: Option<HashMap<String, String>>,
}

impl EnvVarLookup {
    /// Creates a lookup over the whole process environment.
    pub fn new() -> Self {
        Self {
            prefix: None,
            values: None,
        }
    }

    /// Creates a lookup that prepends `prefix` to every key.
    ///
    /// # Arguments
    ///
    /// * `prefix` - The prefix to prepend (e.g., "APP_")
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
            values: None,
        }
    }

    /// Creates a lookup with pre-populated values for testing.
    ///
    /// **Note**: This method is primarily intended for testing. The process
    /// environment is not consulted at all.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use streamcfg::adapters::EnvVarLookup;
    /// use streamcfg::ports::KeyLookup;
    /// use std::collections::HashMap;
    ///
    /// let mut values = HashMap::new();
    /// values.insert("PLACEHOLDER".to_string(), "test".to_string());
    ///
    /// let lookup = EnvVarLookup::with_values(values);
    /// assert_eq!(lookup.lookup("PLACEHOLDER"), Some("test".to_string()));
    /// ```
    pub fn with_values(values: HashMap<String, String>) -> Self {
        Self {
            prefix: None,
            values: Some(values),
        }
    }

    fn full_key<'a>(&self, key: &'a str) -> std::borrow::Cow<'a, str> {
        match &self.prefix {
            Some(prefix) => format!("{}{}", prefix, key).into(),
            None => key.into(),
        }
    }
}

impl KeyLookup for EnvVarLookup {
    fn lookup(&self, key: &str) -> Option<String> {
        let key = self.full_key(key);

        if key.is_empty() || key.len() > MAX_ENV_KEY_LEN || key.contains(['=', '\0']) {
            tracing::debug!("Skipping invalid environment variable key: key_len={}", key.len());
            return None;
        }

        let value = match &self.values {
            Some(values) => values.get(key.as_ref()).cloned(),
            None => env::var(key.as_ref()).ok(),
        }?;

        if value.len() > MAX_ENV_VALUE_LEN {
            tracing::debug!(
                "Skipping oversized environment variable: key={}, value_len={} (max value={})",
                key,
                value.len(),
                MAX_ENV_VALUE_LEN
            );
            return None;
        }

        Some(value)
    }
}
