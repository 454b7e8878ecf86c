// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared fixtures for integration tests.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use streamcfg::domain::{flatten_fields, FieldMap, Result};
use streamcfg::ports::Record;
use streamcfg::transform::CompiledPattern;

/// A record with two numeric fields named `A` and `B`.
#[allow(dead_code)]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pair {
    #[serde(rename = "A", default)]
    pub a: i64,
    #[serde(rename = "B", default)]
    pub b: i64,
}

impl Record for Pair {
    fn zero_like(&self) -> Self {
        Pair::default()
    }

    fn to_fields(&self) -> Result<FieldMap> {
        flatten_fields(self)
    }
}

/// A record with a key and a password.
#[allow(dead_code)]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub pass: String,
}

impl Record for Credentials {
    fn zero_like(&self) -> Self {
        Credentials::default()
    }

    fn to_fields(&self) -> Result<FieldMap> {
        flatten_fields(self)
    }
}

/// Builds the default `${KEY}` pattern over a fixed set of values.
#[allow(dead_code)]
pub fn placeholders(pairs: &[(&str, &str)]) -> Arc<CompiledPattern> {
    let values: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Arc::new(CompiledPattern::placeholders(values))
}
