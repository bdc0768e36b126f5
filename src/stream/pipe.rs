#![warn(clippy::all)]

//! A forward-only stream over any reader.

use std::io::{self, Read, Seek, SeekFrom, Write};

use crate::stream::{unsupported, Metadata, Stream};

/// A read-only stream that cannot seek, such as the body of a network response.
///
/// `Pipe` counts the bytes it hands out so that its position can be reported, and
/// remembers when the source has been exhausted.
pub struct Pipe<R> {
  source: R,
  size: Option<u64>,
  position: u64,
  exhausted: bool,
  metadata: Metadata,
}

impl<R: Read> Pipe<R> {
  /// Construct a new `Pipe`.
  ///
  /// # Arguments
  ///
  /// * `source` - The source (read stream) object.
  /// * `size` - The total number of bytes the source will produce, if known.
  pub fn new(source: R, size: Option<u64>) -> Self {
    Self { source, size, position: 0, exhausted: false, metadata: Metadata::default() }
  }

  /// Attach metadata reported through `Stream::metadata`.
  pub fn with_metadata(mut self, metadata: Metadata) -> Self {
    self.metadata = metadata;
    self
  }

  /// Consume the pipe and return the source.
  pub fn into_inner(self) -> R {
    self.source
  }
}

impl<R: Read> Read for Pipe<R> {
  fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
    let bytes = self.source.read(buf)?;
    if bytes == 0 && !buf.is_empty() {
      self.exhausted = true;
    }
    self.position += bytes as u64;
    Ok(bytes)
  }
}

impl<R> Write for Pipe<R> {
  fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
    Err(unsupported("writable"))
  }

  fn flush(&mut self) -> io::Result<()> {
    Ok(())
  }
}

impl<R> Seek for Pipe<R> {
  fn seek(&mut self, _pos: SeekFrom) -> io::Result<u64> {
    Err(unsupported("seekable"))
  }

  fn stream_position(&mut self) -> io::Result<u64> {
    Ok(self.position)
  }
}

impl<R: Read> Stream for Pipe<R> {
  fn size(&self) -> Option<u64> {
    self.size
  }

  fn eof(&self) -> bool {
    self.exhausted || self.size.is_some_and(|size| self.position >= size)
  }

  fn is_writable(&self) -> bool {
    false
  }

  fn is_seekable(&self) -> bool {
    false
  }

  fn metadata(&self) -> Metadata {
    self.metadata.clone()
  }
}
