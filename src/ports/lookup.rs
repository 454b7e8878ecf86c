// SPDX-License-Identifier: MIT OR Apache-2.0

//! Key lookup trait definition.
//!
//! Substitution patterns resolve the key extracted from a placeholder through a
//! `KeyLookup`. The process environment is the usual implementation, but any map
//! of strings will do.

use std::collections::HashMap;

/// A source of replacement values for placeholder keys.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` because a compiled pattern is shared
/// read-only between transformers.
///
/// # Examples
///
/// ```rust
/// use streamcfg::ports::KeyLookup;
/// use std::collections::HashMap;
///
/// let mut values = HashMap::new();
/// values.insert("HOME".to_string(), "/home/app".to_string());
///
/// assert_eq!(values.lookup("HOME"), Some("/home/app".to_string()));
/// assert_eq!(values.lookup("MISSING"), None);
/// ```
pub trait KeyLookup: Send + Sync {
    /// Returns the value mapped to `key`, or `None` when it is not mapped.
    fn lookup(&self, key: &str) -> Option<String>;
}

impl KeyLookup for HashMap<String, String> {
    fn lookup(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl<F> KeyLookup for F
where
    F: Fn(&str) -> Option<String> + Send + Sync,
{
    fn lookup(&self, key: &str) -> Option<String> {
        self(key)
    }
}
