// SPDX-License-Identifier: MIT OR Apache-2.0

//! Streaming pattern substitution.
//!
//! This module rewrites placeholder patterns such as `${KEY}` in a byte stream
//! before it reaches a codec:
//!
//! - [`CompiledPattern`]: the immutable regex, trim offsets and substitution function
//! - [`ChunkTransformer`]: the stateful chunk-by-chunk substitution protocol
//! - [`TransformReader`]: an `io::Read` adapter driving a transformer over a reader

pub mod chunk;
pub mod pattern;
pub mod reader;

pub use chunk::{
    ChunkTransformer, TransformStatus, Transformed, DEFAULT_MAX_MATCH_SIZE, MAX_MATCH_SIZE_LIMIT,
};
pub use pattern::{
    CompiledPattern, SubstituteFn, Substitution, DEFAULT_PLACEHOLDER, DEFAULT_TRIM_LEFT,
    DEFAULT_TRIM_RIGHT,
};
pub use reader::TransformReader;
