// SPDX-License-Identifier: MIT OR Apache-2.0

//! A hexagonal architecture crate for streaming configuration loading and watching.
//!
//! This crate reads configuration bytes from files or readers, substitutes
//! placeholder patterns such as `${KEY}` while the bytes stream through bounded
//! buffers, decodes them into typed records and watches sources for field-level
//! changes.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain Layer**: Core types and logic (`ConfigError`, `FieldMap`, field diffing)
//! - **Ports**: Trait definitions that define interfaces (`Record`, `ConfigCodec`, `ByteSource`, `ConfigWatcher`)
//! - **Transform**: The streaming pattern substitution engine (`CompiledPattern`, `ChunkTransformer`)
//! - **Adapters**: Implementations for specific sources and formats (files, JSON, YAML, env vars, polling)
//! - **Service**: The file-backed configuration that orchestrates everything
//!
//! # Feature Flags
//!
//! - `json`: Enable the JSON codec (default)
//! - `env`: Enable environment variable placeholder lookup (default)
//! - `yaml`: Enable the YAML codec
//! - `full`: Enable all features
//!
//! # Quick Start
//!
//! ```rust
//! use std::collections::HashMap;
//! use std::sync::Arc;
//! use streamcfg::prelude::*;
//!
//! let env: HashMap<String, String> = [("PLACEHOLDER".to_string(), "test".to_string())].into();
//! let pattern = Arc::new(CompiledPattern::placeholders(env));
//! let mut transformer = ChunkTransformer::new(pattern);
//!
//! let src = br#"{"key": "val", "pass": "${PLACEHOLDER}"}"#;
//! let mut dst = [0u8; 64];
//! let n = transformer.transform_slice(src, &mut dst).unwrap();
//! assert_eq!(&dst[..n], br#"{"key": "val", "pass": "test"}"#);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;
pub mod transform;

/// Commonly used types and traits.
///
/// This module re-exports the most commonly used types and traits for convenient access.
pub mod prelude {
    pub use crate::adapters::{FileSource, PollingWatcher, ReaderSource, WatchOptions};
    pub use crate::domain::{diff_fields, flatten_fields, ConfigError, FieldMap, Result};
    pub use crate::ports::{diff_records, ByteSource, ConfigCodec, ConfigWatcher, KeyLookup, MergePolicy, Record};
    pub use crate::service::{FileConfig, FileConfigBuilder};
    pub use crate::transform::{ChunkTransformer, CompiledPattern, TransformReader, TransformStatus};

    // Re-export adapters based on feature flags
    #[cfg(feature = "env")]
    pub use crate::adapters::EnvVarLookup;
    #[cfg(feature = "json")]
    pub use crate::adapters::JsonCodec;
    #[cfg(feature = "yaml")]
    pub use crate::adapters::YamlCodec;
}
