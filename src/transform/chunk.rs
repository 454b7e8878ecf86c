// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chunked streaming substitution.
//!
//! [`ChunkTransformer`] rewrites pattern matches in a byte stream that arrives in
//! bounded chunks. The caller owns both buffers and drives the protocol:
//!
//! - bytes reported as consumed are gone; unconsumed bytes must be presented
//!   again at the front of the next input chunk,
//! - [`TransformStatus::NeedMoreInput`] asks for more input behind the unconsumed
//!   bytes, because a match might still be forming,
//! - [`TransformStatus::OutputExhausted`] asks for more output room; a replacement
//!   that did not fit is kept internally and written first on the next call.
//!
//! The transformer never blocks and never buffers more than one replacement.

use crate::domain::{ConfigError, Result};
use crate::transform::pattern::CompiledPattern;
use std::sync::Arc;

/// Default upper bound on the bytes held back waiting for a match to complete.
pub const DEFAULT_MAX_MATCH_SIZE: usize = 2048;

/// Largest accepted hold-back bound; larger values are clamped to it.
pub const MAX_MATCH_SIZE_LIMIT: usize = 1024 * 1024;

/// Outcome of a single [`ChunkTransformer::transform`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformStatus {
    /// All input was consumed and nothing is pending.
    Complete,
    /// Some input was left unconsumed because it may be the start of a match.
    NeedMoreInput,
    /// The output buffer filled up before all input could be processed.
    OutputExhausted,
}

/// Counters returned by [`ChunkTransformer::transform`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transformed {
    /// Bytes written to the output buffer
    pub written: usize,
    /// Bytes consumed from the input chunk
    pub consumed: usize,
    /// What the caller should do next
    pub status: TransformStatus,
}

impl Transformed {
    fn new(written: usize, consumed: usize, status: TransformStatus) -> Self {
        Self {
            written,
            consumed,
            status,
        }
    }
}

/// Stateful streaming substitution over a shared [`CompiledPattern`].
///
/// An instance must only be used for one stream at a time. Call
/// [`reset`](ChunkTransformer::reset) before reusing it on an unrelated stream.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use std::sync::Arc;
/// use streamcfg::transform::{ChunkTransformer, CompiledPattern, TransformStatus};
///
/// let env: HashMap<String, String> = [("USER".to_string(), "app".to_string())].into();
/// let mut tr = ChunkTransformer::new(Arc::new(CompiledPattern::placeholders(env)));
///
/// let mut out = [0u8; 64];
/// // The placeholder is cut in half by the chunk boundary.
/// let first = tr.transform(&mut out, b"user=${US", false);
/// assert_eq!(first.status, TransformStatus::NeedMoreInput);
/// assert_eq!(&out[..first.written], b"");
///
/// let rest = [&b"user=${US"[first.consumed..], &b"ER}\n"[..]].concat();
/// let second = tr.transform(&mut out[first.written..], &rest, true);
/// assert_eq!(second.status, TransformStatus::Complete);
/// assert_eq!(&out[..first.written + second.written], b"user=app\n");
/// ```
#[derive(Debug, Clone)]
pub struct ChunkTransformer {
    pattern: Arc<CompiledPattern>,
    overflow: Vec<u8>,
    max_match_size: usize,
}

impl ChunkTransformer {
    /// Creates a transformer for `pattern` with the default hold-back bound.
    pub fn new(pattern: Arc<CompiledPattern>) -> Self {
        Self {
            pattern,
            overflow: Vec::new(),
            max_match_size: DEFAULT_MAX_MATCH_SIZE,
        }
    }

    /// Sets the maximum number of trailing bytes held back waiting for a match
    /// to complete.
    ///
    /// A match that reaches the end of a chunk and already spans at least this
    /// many bytes is substituted as is instead of waiting for more input.
    /// Values above [`MAX_MATCH_SIZE_LIMIT`] are clamped to it.
    pub fn with_max_match_size(mut self, max_match_size: usize) -> Self {
        self.max_match_size = max_match_size.min(MAX_MATCH_SIZE_LIMIT);
        self
    }

    /// Returns the hold-back bound.
    pub fn max_match_size(&self) -> usize {
        self.max_match_size
    }

    /// Returns the shared pattern.
    pub fn pattern(&self) -> &Arc<CompiledPattern> {
        &self.pattern
    }

    /// Returns the number of replacement bytes waiting to be written.
    pub fn pending(&self) -> usize {
        self.overflow.len()
    }

    /// Clears all per-stream state.
    pub fn reset(&mut self) {
        self.overflow.clear();
    }

    /// Transforms `src` into `dst`.
    ///
    /// `at_end` marks `src` as the final chunk of the stream, which releases any
    /// held-back bytes and finalises a match touching the end of the chunk.
    pub fn transform(&mut self, dst: &mut [u8], src: &[u8], at_end: bool) -> Transformed {
        let mut written = 0;

        if !self.overflow.is_empty() {
            written = copy_into(dst, &self.overflow);
            self.overflow.drain(..written);
            if !self.overflow.is_empty() {
                return Transformed::new(written, 0, TransformStatus::OutputExhausted);
            }
        }

        let pattern = Arc::clone(&self.pattern);
        let mut consumed = 0;

        for span in pattern.find_iter(src) {
            let n = copy_into(&mut dst[written..], &src[consumed..span.start]);
            written += n;
            consumed += n;
            if consumed < span.start {
                return Transformed::new(written, consumed, TransformStatus::OutputExhausted);
            }

            if span.end == src.len() && !at_end && span.len() < self.max_match_size {
                return Transformed::new(written, consumed, TransformStatus::NeedMoreInput);
            }

            let replacement = pattern.replacement(src, span.clone());
            let n = copy_into(&mut dst[written..], &replacement);
            written += n;
            consumed = span.end;
            if n < replacement.len() {
                self.overflow.extend_from_slice(&replacement[n..]);
                return Transformed::new(written, consumed, TransformStatus::OutputExhausted);
            }
        }

        let tail = &src[consumed..];
        let flush = if at_end {
            tail.len()
        } else {
            tail.len().saturating_sub(self.max_match_size)
        };
        let n = copy_into(&mut dst[written..], &tail[..flush]);
        written += n;
        consumed += n;

        let status = if n < flush {
            TransformStatus::OutputExhausted
        } else if consumed < src.len() {
            TransformStatus::NeedMoreInput
        } else {
            TransformStatus::Complete
        };
        Transformed::new(written, consumed, status)
    }

    /// Transforms the whole of `src` into the fixed buffer `dst` in one call.
    ///
    /// Returns the number of bytes written, or `OutputTooSmall` if `dst` cannot
    /// hold the result. The transformer is reset either way.
    pub fn transform_slice(&mut self, src: &[u8], dst: &mut [u8]) -> Result<usize> {
        self.reset();
        let out = self.transform(dst, src, true);
        let pending = self.overflow.len() + (src.len() - out.consumed);
        self.reset();

        match out.status {
            TransformStatus::OutputExhausted => Err(ConfigError::OutputTooSmall {
                needed: out.written + pending,
                available: dst.len(),
            }),
            _ => Ok(out.written),
        }
    }
}

pub(crate) fn copy_into(dst: &mut [u8], src: &[u8]) -> usize {
    let n = dst.len().min(src.len());
    dst[..n].copy_from_slice(&src[..n]);
    n
}
