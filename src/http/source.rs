//! Buffered byte source the parser pulls lines and body bytes from.

use bytes::{Bytes, BytesMut};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SourceError {
    #[error("no complete line is buffered")]
    NoFullLine,
}

/// What the parser needs from the transport side of a connection.
///
/// Reads never block: they only hand out bytes that are already buffered.
pub trait ByteSource {
    /// Whether a line terminated by `\n` is buffered.
    fn has_full_line(&self) -> bool;

    /// Removes and returns the next line, delimiter included.
    fn read_line(&mut self) -> Result<Bytes, SourceError>;

    /// Removes and returns at most `n` buffered bytes.
    fn read_up_to(&mut self, n: usize) -> Bytes;

    /// Number of bytes buffered but not yet consumed.
    fn buffered(&self) -> usize;
}

/// In-memory `ByteSource` filled by the connection as reads complete.
#[derive(Debug, Default)]
pub struct LineBuffer {
    buf: BytesMut,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self { buf: BytesMut::with_capacity(4096) }
    }

    pub fn extend(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    fn line_end(&self) -> Option<usize> {
        self.buf.iter().position(|&b| b == b'\n')
    }
}

impl ByteSource for LineBuffer {
    fn has_full_line(&self) -> bool {
        self.line_end().is_some()
    }

    fn read_line(&mut self) -> Result<Bytes, SourceError> {
        let end = self.line_end().ok_or(SourceError::NoFullLine)?;
        Ok(self.buf.split_to(end + 1).freeze())
    }

    fn read_up_to(&mut self, n: usize) -> Bytes {
        let n = n.min(self.buf.len());
        self.buf.split_to(n).freeze()
    }

    fn buffered(&self) -> usize {
        self.buf.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_line_keeps_delimiter() {
        let mut src = LineBuffer::new();
        src.extend(b"GET / HTTP/1.1\r\nHost");

        assert!(src.has_full_line());
        assert_eq!(&src.read_line().unwrap()[..], b"GET / HTTP/1.1\r\n");
        assert!(!src.has_full_line());
        assert_eq!(src.read_line(), Err(SourceError::NoFullLine));
        assert_eq!(src.buffered(), 4);
    }

    #[test]
    fn read_up_to_never_exceeds_request() {
        let mut src = LineBuffer::new();
        src.extend(b"abcdef");

        assert_eq!(&src.read_up_to(4)[..], b"abcd");
        assert_eq!(&src.read_up_to(10)[..], b"ef");
        assert!(src.read_up_to(3).is_empty());
    }
}
