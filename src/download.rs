#![warn(clippy::all)]

//! Progress reporting for the stream a download is written into.

use std::io::{self, Read, Seek, SeekFrom, Write};

use log::{debug, trace};

use crate::stream::{Metadata, Stream};

/// A stream decorator that reports progress as data is written to it.
///
/// Every call is forwarded to the inner stream of type `S`. Each successful write that
/// moves data also calls the closure of type `F` with the expected number of bytes, the
/// position of the inner stream after the write and the context of type `X`.
///
/// Once the position reaches the expected size no further notifications are made. The
/// write that reaches it is still reported. When the expected size is unknown (`None`)
/// every write that moves data is reported.
pub struct DownloadProgress<S, F, X = ()> {
  inner: S,
  notify: F,
  expected_size: Option<u64>,
  reached_end: bool,
  context: X,
}

impl<S: Stream, F: FnMut(Option<u64>, u64, &())> DownloadProgress<S, F, ()> {
  /// Construct a new `DownloadProgress` without any context.
  ///
  /// # Arguments
  ///
  /// * `inner` - The stream being written into.
  /// * `notify` - Invoked as data is written.
  /// * `expected_size` - Expected number of bytes to be written, if known.
  pub fn new(inner: S, notify: F, expected_size: Option<u64>) -> Self {
    Self::with_context(inner, notify, expected_size, ())
  }
}

impl<S: Stream, F: FnMut(Option<u64>, u64, &X), X> DownloadProgress<S, F, X> {
  /// Construct a new `DownloadProgress`.
  ///
  /// # Arguments
  ///
  /// * `inner` - The stream being written into.
  /// * `notify` - Invoked as data is written.
  /// * `expected_size` - Expected number of bytes to be written, if known.
  /// * `context` - Handed to every `notify` call, typically a
  ///   [`DownloadContext`](crate::context::DownloadContext).
  pub fn with_context(inner: S, notify: F, expected_size: Option<u64>, context: X) -> Self {
    Self { inner, notify, expected_size, reached_end: false, context }
  }

  /// Expected number of bytes to be written.
  pub fn expected_size(&self) -> Option<u64> {
    self.expected_size
  }

  /// Whether the expected size has been reached and notifications have stopped.
  pub fn reached_end(&self) -> bool {
    self.reached_end
  }

  /// The context handed to notifications.
  pub fn context(&self) -> &X {
    &self.context
  }

  /// A reference to the inner stream.
  pub fn get_ref(&self) -> &S {
    &self.inner
  }

  /// A mutable reference to the inner stream.
  ///
  /// Writing through this reference bypasses progress reporting.
  pub fn get_mut(&mut self) -> &mut S {
    &mut self.inner
  }

  /// Consume the decorator and return the inner stream.
  pub fn detach(self) -> S {
    self.inner
  }
}

impl<S: Stream, F: FnMut(Option<u64>, u64, &X), X> Write for DownloadProgress<S, F, X> {
  fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
    let written = self.inner.write(buf)?;

    if self.reached_end {
      return Ok(written);
    }

    let position = match self.inner.stream_position() {
      Ok(position) => position,
      Err(e) => {
        debug!("Not reporting download progress, stream position is unavailable: {e}");
        return Ok(written);
      }
    };

    self.reached_end = self.expected_size.is_some_and(|expected| position >= expected);
    if self.reached_end {
      debug!("Download reached position {position} of {:?} expected bytes", self.expected_size);
    }

    if written > 0 {
      trace!("Download progress: {position}/{:?}", self.expected_size);
      (self.notify)(self.expected_size, position, &self.context);
    }

    Ok(written)
  }

  fn flush(&mut self) -> io::Result<()> {
    self.inner.flush()
  }
}

impl<S: Stream, F, X> Read for DownloadProgress<S, F, X> {
  fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
    self.inner.read(buf)
  }
}

impl<S: Stream, F, X> Seek for DownloadProgress<S, F, X> {
  fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
    self.inner.seek(pos)
  }

  fn stream_position(&mut self) -> io::Result<u64> {
    self.inner.stream_position()
  }
}

impl<S: Stream, F: FnMut(Option<u64>, u64, &X), X> Stream for DownloadProgress<S, F, X> {
  fn size(&self) -> Option<u64> {
    self.inner.size()
  }

  fn eof(&self) -> bool {
    self.inner.eof()
  }

  fn is_readable(&self) -> bool {
    self.inner.is_readable()
  }

  fn is_writable(&self) -> bool {
    self.inner.is_writable()
  }

  fn is_seekable(&self) -> bool {
    self.inner.is_seekable()
  }

  fn metadata(&self) -> Metadata {
    self.inner.metadata()
  }

  fn metadata_value(&self, key: &str) -> Option<String> {
    self.inner.metadata_value(key)
  }

  fn close(&mut self) -> io::Result<()> {
    self.inner.close()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::context::DownloadContext;
  use crate::stream::{FileStream, MemoryStream};
  use std::cell::RefCell;

  /// A sink that accepts writes but cannot report its position.
  struct Blind;

  impl Read for Blind {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
      Ok(0)
    }
  }

  impl Write for Blind {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
      Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
      Ok(())
    }
  }

  impl Seek for Blind {
    fn seek(&mut self, _pos: SeekFrom) -> io::Result<u64> {
      Err(io::Error::new(io::ErrorKind::Unsupported, "blind"))
    }
  }

  impl Stream for Blind {
    fn size(&self) -> Option<u64> {
      None
    }

    fn eof(&self) -> bool {
      false
    }
  }

  #[test]
  fn reports_until_expected_size() {
    let calls = RefCell::new(Vec::new());
    let mut stream = DownloadProgress::new(
      MemoryStream::with_capacity(100),
      |expected, position, _| calls.borrow_mut().push((expected, position)),
      Some(100),
    );

    assert_eq!(stream.write(&[1; 60]).unwrap(), 60);
    assert_eq!(*calls.borrow(), vec![(Some(100), 60)]);
    assert!(!stream.reached_end());

    assert_eq!(stream.write(&[2; 40]).unwrap(), 40);
    assert_eq!(*calls.borrow(), vec![(Some(100), 60), (Some(100), 100)]);
    assert!(stream.reached_end());

    assert_eq!(stream.write(&[]).unwrap(), 0);
    assert_eq!(calls.borrow().len(), 2);
  }

  #[test]
  fn overshooting_write_is_reported_once() {
    let calls = RefCell::new(Vec::new());
    let mut stream =
      DownloadProgress::new(MemoryStream::new(), |_, position, _| calls.borrow_mut().push(position), Some(50));

    stream.write_all(&[0; 30]).unwrap();
    stream.write_all(&[0; 30]).unwrap();
    stream.write_all(&[0; 30]).unwrap();
    assert_eq!(*calls.borrow(), vec![30, 60]);
    assert_eq!(stream.get_ref().as_bytes().len(), 90);
  }

  #[test]
  fn unknown_size_reports_every_write() {
    let calls = RefCell::new(Vec::new());
    let mut stream =
      DownloadProgress::new(MemoryStream::new(), |expected, position, _| calls.borrow_mut().push((expected, position)), None);

    for _ in 0..5 {
      stream.write_all(&[0; 1000]).unwrap();
    }
    assert_eq!(stream.write(&[]).unwrap(), 0);

    assert_eq!(*calls.borrow(), (1..=5).map(|i| (None, i * 1000)).collect::<Vec<_>>());
    assert!(!stream.reached_end());
  }

  #[test]
  fn forwards_context() {
    let seen = RefCell::new(Vec::new());
    let context = DownloadContext::new("client", 7, "200 OK");
    let mut stream = DownloadProgress::with_context(
      MemoryStream::new(),
      |_, position, context| {
        seen.borrow_mut().push((context.client, context.request, context.response, position))
      },
      Some(3),
      context.clone(),
    );

    stream.write_all(b"abc").unwrap();
    assert_eq!(*seen.borrow(), vec![("client", 7, "200 OK", 3)]);
    assert_eq!(stream.context(), &context);
  }

  #[test]
  fn write_error_propagates_without_notification() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("read-only.bin");
    std::fs::write(&path, b"data").unwrap();

    let calls = RefCell::new(0);
    let mut stream =
      DownloadProgress::new(FileStream::open(&path).unwrap(), |_, _, _| *calls.borrow_mut() += 1, Some(10));

    assert_eq!(stream.write(b"abc").unwrap_err().kind(), io::ErrorKind::Unsupported);
    assert_eq!(*calls.borrow(), 0);
  }

  #[test]
  fn unavailable_position_keeps_write() {
    let calls = RefCell::new(0);
    let mut stream = DownloadProgress::new(Blind, |_, _, _| *calls.borrow_mut() += 1, Some(10));

    assert_eq!(stream.write(b"abcdef").unwrap(), 6);
    assert_eq!(*calls.borrow(), 0);
    assert!(!stream.reached_end());
  }

  #[test]
  fn delegates_stream_operations() {
    let mut plain = MemoryStream::new();
    plain.write_all(b"0123456789").unwrap();
    let mut wrapped = DownloadProgress::new(plain.clone(), |_, _, _| {}, Some(10));

    assert_eq!(wrapped.size(), plain.size());
    assert_eq!(wrapped.eof(), plain.eof());
    assert_eq!(wrapped.is_readable(), plain.is_readable());
    assert_eq!(wrapped.is_writable(), plain.is_writable());
    assert_eq!(wrapped.is_seekable(), plain.is_seekable());
    assert_eq!(wrapped.metadata(), plain.metadata());
    assert_eq!(wrapped.metadata_value("mode"), plain.metadata_value("mode"));
    assert_eq!(wrapped.stream_position().unwrap(), plain.stream_position().unwrap());
    assert_eq!(wrapped.seek(SeekFrom::Start(4)).unwrap(), plain.seek(SeekFrom::Start(4)).unwrap());

    let mut from_wrapped = [0; 3];
    let mut from_plain = [0; 3];
    assert_eq!(wrapped.read(&mut from_wrapped).unwrap(), plain.read(&mut from_plain).unwrap());
    assert_eq!(from_wrapped, from_plain);
    wrapped.close().unwrap();
    plain.close().unwrap();
  }

  #[test]
  fn to_string_lossy_and_detach() {
    let calls = RefCell::new(0);
    let mut stream = DownloadProgress::new(MemoryStream::new(), |_, _, _| *calls.borrow_mut() += 1, Some(5));

    stream.write_all(b"hello").unwrap();
    assert_eq!(stream.to_string_lossy(), "hello");
    assert_eq!(*calls.borrow(), 1);

    let inner = stream.detach();
    assert_eq!(inner.into_inner(), b"hello");
  }
}
