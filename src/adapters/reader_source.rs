// SPDX-License-Identifier: MIT OR Apache-2.0

//! Caller-supplied reader byte source adapter.

use crate::adapters::file_source::read_limited;
use crate::domain::Result;
use crate::ports::ByteSource;
use std::io::Read;

/// Byte source that reads a caller-supplied stream.
///
/// The same reader is read again on every call. Making that repeatable (for
/// example by rewinding, or by handing out fresh data each time) is up to the
/// reader.
///
/// # Examples
///
/// ```rust
/// use std::io::Cursor;
/// use streamcfg::adapters::ReaderSource;
/// use streamcfg::ports::ByteSource;
///
/// let mut source = ReaderSource::new(Cursor::new(b"{}".to_vec()));
/// assert_eq!(source.acquire().unwrap(), b"{}");
/// // The cursor is exhausted now; nothing rewinds it.
/// assert!(source.acquire().unwrap().is_empty());
/// ```
#[derive(Debug)]
pub struct ReaderSource<R> {
    reader: R,
}

impl<R: Read + Send> ReaderSource<R> {
    /// Wraps `reader`.
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Returns the wrapped reader.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read + Send> ByteSource for ReaderSource<R> {
    fn name(&self) -> &str {
        "reader"
    }

    fn acquire(&mut self) -> Result<Vec<u8>> {
        read_limited(&mut self.reader, "reader")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ConfigError;
    use std::io;

    struct Broken;

    impl Read for Broken {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "broken pipe"))
        }
    }

    #[test]
    fn test_reader_source_error() {
        let mut source = ReaderSource::new(Broken);
        let err = source.acquire().unwrap_err();
        assert!(matches!(err, ConfigError::SourceUnavailable { .. }));
    }

    #[test]
    fn test_reader_source_into_inner() {
        let source = ReaderSource::new(io::Cursor::new(vec![1u8, 2]));
        assert_eq!(source.into_inner().into_inner(), vec![1, 2]);
    }
}
