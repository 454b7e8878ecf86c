// SPDX-License-Identifier: MIT OR Apache-2.0

//! `io::Read` adapter that applies a [`ChunkTransformer`] while reading.

use crate::transform::chunk::{copy_into, ChunkTransformer, TransformStatus};
use std::io::{self, Read};

const DEFAULT_BUF_SIZE: usize = 8 * 1024;

/// Reads from `inner` and yields the substituted byte stream.
///
/// Input and output buffers are bounded; the whole stream is never held in
/// memory.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use std::io::Read;
/// use std::sync::Arc;
/// use streamcfg::transform::{ChunkTransformer, CompiledPattern, TransformReader};
///
/// let env: HashMap<String, String> = [("PORT".to_string(), "8080".to_string())].into();
/// let tr = ChunkTransformer::new(Arc::new(CompiledPattern::placeholders(env)));
///
/// let mut reader = TransformReader::new(&b"port: ${PORT}\n"[..], tr);
/// let mut out = String::new();
/// reader.read_to_string(&mut out).unwrap();
/// assert_eq!(out, "port: 8080\n");
/// ```
#[derive(Debug)]
pub struct TransformReader<R> {
    inner: R,
    transformer: ChunkTransformer,
    src: Vec<u8>,
    src_start: usize,
    src_end: usize,
    dst: Vec<u8>,
    dst_start: usize,
    dst_end: usize,
    eof: bool,
    done: bool,
}

impl<R: Read> TransformReader<R> {
    /// Wraps `inner`, resetting `transformer` for the new stream.
    pub fn new(inner: R, mut transformer: ChunkTransformer) -> Self {
        transformer.reset();
        let src_len = DEFAULT_BUF_SIZE.max(transformer.max_match_size().saturating_mul(2));
        Self {
            inner,
            transformer,
            src: vec![0; src_len],
            src_start: 0,
            src_end: 0,
            dst: vec![0; DEFAULT_BUF_SIZE],
            dst_start: 0,
            dst_end: 0,
            eof: false,
            done: false,
        }
    }

    /// Returns the wrapped reader.
    pub fn into_inner(self) -> R {
        self.inner
    }

    fn fill_src(&mut self) -> io::Result<()> {
        if self.src_start > 0 {
            self.src.copy_within(self.src_start..self.src_end, 0);
            self.src_end -= self.src_start;
            self.src_start = 0;
        }
        if self.src_end == self.src.len() {
            let grown = self.src.len() * 2;
            self.src.resize(grown, 0);
        }
        loop {
            match self.inner.read(&mut self.src[self.src_end..]) {
                Ok(0) => {
                    self.eof = true;
                    return Ok(());
                }
                Ok(n) => {
                    self.src_end += n;
                    return Ok(());
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}

impl<R: Read> Read for TransformReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        loop {
            if self.dst_start < self.dst_end {
                let n = copy_into(buf, &self.dst[self.dst_start..self.dst_end]);
                self.dst_start += n;
                return Ok(n);
            }
            if self.done {
                return Ok(0);
            }

            if self.src_start < self.src_end || self.eof || self.transformer.pending() > 0 {
                let out = self.transformer.transform(
                    &mut self.dst,
                    &self.src[self.src_start..self.src_end],
                    self.eof,
                );
                self.src_start += out.consumed;
                self.dst_start = 0;
                self.dst_end = out.written;

                match out.status {
                    TransformStatus::OutputExhausted => continue,
                    TransformStatus::Complete if self.eof => {
                        self.done = true;
                        continue;
                    }
                    _ if out.written > 0 => continue,
                    _ => {}
                }
            }

            self.fill_src()?;
        }
    }
}
