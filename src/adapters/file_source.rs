// SPDX-License-Identifier: MIT OR Apache-2.0

//! File byte source adapter.
//!
//! This module provides a [`ByteSource`] that opens, reads and closes a file on
//! every call, optionally streaming its contents through a substitution pattern.

use crate::domain::{ConfigError, Result};
use crate::ports::ByteSource;
use crate::transform::{ChunkTransformer, CompiledPattern, TransformReader};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Maximum number of bytes read from a configuration source (4MiB)
/// This prevents denial of service attacks via extremely large files
pub const MAX_SOURCE_SIZE: u64 = 4 * 1024 * 1024;

/// Byte source reading a file path.
///
/// # Examples
///
/// ```rust,no_run
/// use streamcfg::adapters::FileSource;
/// use streamcfg::ports::ByteSource;
///
/// let mut source = FileSource::new("/etc/myapp/config.json");
/// let bytes = source.acquire().unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct FileSource {
    /// Path to the file
    path: PathBuf,
    /// Human readable name used in errors
    name: String,
    /// Optional substitution applied while reading
    pattern: Option<Arc<CompiledPattern>>,
}

impl FileSource {
    /// Creates a source for `path`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        Self {
            name: format!("file:{}", path.display()),
            path,
            pattern: None,
        }
    }

    /// Streams the file through `pattern` on every read.
    pub fn with_pattern(mut self, pattern: Arc<CompiledPattern>) -> Self {
        self.pattern = Some(pattern);
        self
    }

    /// Returns the path being read.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ByteSource for FileSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn acquire(&mut self) -> Result<Vec<u8>> {
        let file = File::open(&self.path).map_err(|e| {
            ConfigError::source_io(
                &self.name,
                format!("failed to open: {}", self.path.display()),
                e,
            )
        })?;

        let bytes = match &self.pattern {
            Some(pattern) => {
                let reader = TransformReader::new(file, ChunkTransformer::new(Arc::clone(pattern)));
                read_limited(reader, &self.name)?
            }
            None => read_limited(file, &self.name)?,
        };

        tracing::trace!("Read {} bytes from {}", bytes.len(), self.name);
        Ok(bytes)
    }
}

/// Reads `reader` to the end, failing if it yields more than [`MAX_SOURCE_SIZE`] bytes.
pub(crate) fn read_limited<R: Read>(reader: R, source_name: &str) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    reader
        .take(MAX_SOURCE_SIZE + 1)
        .read_to_end(&mut bytes)
        .map_err(|e| ConfigError::source_io(source_name, "failed to read", e))?;

    if bytes.len() as u64 > MAX_SOURCE_SIZE {
        return Err(ConfigError::SourceUnavailable {
            source_name: source_name.to_string(),
            message: format!("configuration too large (max {} bytes)", MAX_SOURCE_SIZE),
            source: None,
        });
    }
    Ok(bytes)
}
