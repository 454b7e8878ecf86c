// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapters layer containing implementations of the ports.
//!
//! This module contains concrete implementations of the traits defined in the
//! ports layer: byte sources, codecs, key lookups and the polling watcher.

#[cfg(feature = "env")]
pub mod env_var;
pub mod file_source;
#[cfg(feature = "json")]
pub mod json_codec;
pub mod reader_source;
#[cfg(feature = "yaml")]
pub mod yaml_codec;

pub mod watchers;

// Re-export adapters based on feature flags
#[cfg(feature = "env")]
pub use env_var::EnvVarLookup;
pub use file_source::{FileSource, MAX_SOURCE_SIZE};
#[cfg(feature = "json")]
pub use json_codec::JsonCodec;
pub use reader_source::ReaderSource;
pub use watchers::{JitterTicker, PollingWatcher, WatchOptions};
#[cfg(feature = "yaml")]
pub use yaml_codec::YamlCodec;
