#![warn(clippy::all)]

//! The stream capability interface and the concrete streams shipped with the crate.

mod file;
mod memory;
mod pipe;

pub use self::file::{FileStream, Mode as FileMode};
pub use self::memory::MemoryStream;
pub use self::pipe::Pipe;

use std::collections::BTreeMap;
use std::io::{self, Read, Seek, SeekFrom, Write};

use log::warn;
use serde::Serialize;

/// Key/value metadata describing a stream, such as its `uri` or access `mode`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Metadata {
  entries: BTreeMap<String, String>,
}

impl Metadata {
  /// Adds or replaces an entry, returning the updated metadata.
  ///
  /// # Arguments
  ///
  /// * `key` - Name of the entry.
  /// * `value` - Value of the entry.
  pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
    self.entries.insert(key.into(), value.into());
    self
  }

  /// Returns the value of a single entry.
  pub fn get(&self, key: &str) -> Option<&str> {
    self.entries.get(key).map(String::as_str)
  }

  /// Whether there are no entries.
  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Iterates over all entries ordered by key.
  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
  }
}

/// A readable, writable and seekable resource.
///
/// Reading, writing and seeking go through the `std::io` traits. A zero-byte read into a
/// non-empty buffer signals the end of the stream, and `Seek::stream_position` is the
/// current position. The methods of this trait cover the remaining capabilities. Streams
/// that lack a capability report it through `is_readable`, `is_writable` or
/// `is_seekable` and fail the corresponding `std::io` call with
/// `io::ErrorKind::Unsupported`.
pub trait Stream: Read + Write + Seek {
  /// Total size of the stream in bytes, if known.
  fn size(&self) -> Option<u64>;

  /// Whether the stream is positioned at its end.
  fn eof(&self) -> bool;

  /// Whether reading is supported.
  fn is_readable(&self) -> bool {
    true
  }

  /// Whether writing is supported.
  fn is_writable(&self) -> bool {
    true
  }

  /// Whether seeking is supported.
  fn is_seekable(&self) -> bool {
    true
  }

  /// All metadata entries. Streams without metadata return an empty set.
  fn metadata(&self) -> Metadata {
    Metadata::default()
  }

  /// A single metadata entry.
  fn metadata_value(&self, key: &str) -> Option<String> {
    self.metadata().get(key).map(str::to_owned)
  }

  /// Flushes pending writes and releases the stream for further use.
  fn close(&mut self) -> io::Result<()> {
    self.flush()
  }

  /// Reads the remaining contents of the stream starting at the current position.
  ///
  /// # Arguments
  ///
  /// * `max_len` - Maximum number of bytes to read, or `None` to read until the end.
  fn contents(&mut self, max_len: Option<u64>) -> io::Result<Vec<u8>>
  where
    Self: Sized,
  {
    let mut buf = Vec::new();
    match max_len {
      Some(max_len) => Read::take(&mut *self, max_len).read_to_end(&mut buf)?,
      None => self.read_to_end(&mut buf)?,
    };
    Ok(buf)
  }

  /// Rewinds the stream and reads all of it into a string.
  ///
  /// Failures are logged and produce an empty string. Invalid UTF-8 is replaced.
  fn to_string_lossy(&mut self) -> String
  where
    Self: Sized,
  {
    let contents = self.seek(SeekFrom::Start(0)).and_then(|_| self.contents(None));
    match contents {
      Ok(contents) => String::from_utf8_lossy(&contents).into_owned(),
      Err(e) => {
        warn!("Could not convert stream to string: {e}");
        String::new()
      }
    }
  }
}

/// Error returned by streams for operations they do not support.
pub(crate) fn unsupported(what: &str) -> io::Error {
  io::Error::new(io::ErrorKind::Unsupported, format!("Stream is not {what}"))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn metadata_entries() {
    let metadata = Metadata::default().with("mode", "r").with("uri", "/tmp/a").with("mode", "w");
    assert_eq!(metadata.get("mode"), Some("w"));
    assert_eq!(metadata.get("uri"), Some("/tmp/a"));
    assert_eq!(metadata.get("missing"), None);
    assert_eq!(metadata.iter().collect::<Vec<_>>(), vec![("mode", "w"), ("uri", "/tmp/a")]);
  }

  #[test]
  fn contents_from_position() {
    let mut stream = MemoryStream::from(b"hello world".to_vec());
    stream.seek(SeekFrom::Start(6)).unwrap();
    assert_eq!(stream.contents(None).unwrap(), b"world");
    assert!(stream.eof());
  }

  #[test]
  fn contents_limited() {
    let mut stream = MemoryStream::from(b"hello world".to_vec());
    assert_eq!(stream.contents(Some(5)).unwrap(), b"hello");
    assert_eq!(stream.stream_position().unwrap(), 5);
  }

  #[test]
  fn to_string_lossy_rewinds() {
    let mut stream = MemoryStream::from(b"hello".to_vec());
    stream.seek(SeekFrom::End(0)).unwrap();
    assert_eq!(stream.to_string_lossy(), "hello");
  }

  #[test]
  fn to_string_lossy_unseekable() {
    let mut stream = Pipe::new(&b"hello"[..], Some(5));
    assert_eq!(stream.to_string_lossy(), "");
  }
}
