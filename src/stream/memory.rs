#![warn(clippy::all)]

//! An in-memory stream.

use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};

use crate::stream::{Metadata, Stream};

/// A growable in-memory buffer supporting reads, writes and seeks.
#[derive(Debug, Default, Clone)]
pub struct MemoryStream {
  buffer: Cursor<Vec<u8>>,
}

impl MemoryStream {
  /// Construct an empty stream.
  pub fn new() -> Self {
    Self::default()
  }

  /// Construct an empty stream with room for `capacity` bytes.
  pub fn with_capacity(capacity: usize) -> Self {
    Self { buffer: Cursor::new(Vec::with_capacity(capacity)) }
  }

  /// The whole buffer regardless of the current position.
  pub fn as_bytes(&self) -> &[u8] {
    self.buffer.get_ref()
  }

  /// Consume the stream and return its buffer.
  pub fn into_inner(self) -> Vec<u8> {
    self.buffer.into_inner()
  }
}

impl From<Vec<u8>> for MemoryStream {
  fn from(bytes: Vec<u8>) -> Self {
    Self { buffer: Cursor::new(bytes) }
  }
}

impl Read for MemoryStream {
  fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
    self.buffer.read(buf)
  }
}

impl Write for MemoryStream {
  fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
    self.buffer.write(buf)
  }

  fn flush(&mut self) -> io::Result<()> {
    Ok(())
  }
}

impl Seek for MemoryStream {
  fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
    self.buffer.seek(pos)
  }

  fn stream_position(&mut self) -> io::Result<u64> {
    Ok(self.buffer.position())
  }
}

impl Stream for MemoryStream {
  fn size(&self) -> Option<u64> {
    Some(self.buffer.get_ref().len() as u64)
  }

  fn eof(&self) -> bool {
    self.buffer.position() >= self.buffer.get_ref().len() as u64
  }

  fn metadata(&self) -> Metadata {
    Metadata::default().with("wrapper_type", "memory").with("mode", "w+b").with("seekable", "true")
  }
}
