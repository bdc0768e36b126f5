#![warn(clippy::all)]

//! Progress reporting for the stream an upload is read from.

use std::io::{self, Read, Seek, SeekFrom, Write};

use log::{debug, trace};

use crate::stream::{Metadata, Stream};

/// A stream decorator that reports progress as data is read from it.
///
/// Every call is forwarded to the inner stream of type `S`. Each read that returns data
/// also calls the closure of type `F` with the size of the inner stream, its position
/// after the read and the context of type `X`.
///
/// The first read that hits the end of the inner stream is not reported, and neither is
/// any read after it, even if the inner stream is rewound.
pub struct UploadProgress<S, F, X = ()> {
  inner: S,
  notify: F,
  reached_end: bool,
  context: X,
}

impl<S: Stream, F: FnMut(Option<u64>, u64, &())> UploadProgress<S, F, ()> {
  /// Construct a new `UploadProgress` without any context.
  ///
  /// # Arguments
  ///
  /// * `inner` - The stream being read from.
  /// * `notify` - Invoked as data is read.
  pub fn new(inner: S, notify: F) -> Self {
    Self::with_context(inner, notify, ())
  }
}

impl<S: Stream, F: FnMut(Option<u64>, u64, &X), X> UploadProgress<S, F, X> {
  /// Construct a new `UploadProgress`.
  ///
  /// # Arguments
  ///
  /// * `inner` - The stream being read from.
  /// * `notify` - Invoked as data is read.
  /// * `context` - Handed to every `notify` call, typically an
  ///   [`UploadContext`](crate::context::UploadContext).
  pub fn with_context(inner: S, notify: F, context: X) -> Self {
    Self { inner, notify, reached_end: false, context }
  }

  /// Whether the inner stream has been exhausted and notifications have stopped.
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
  /// Reading through this reference bypasses progress reporting.
  pub fn get_mut(&mut self) -> &mut S {
    &mut self.inner
  }

  /// Consume the decorator and return the inner stream.
  pub fn detach(self) -> S {
    self.inner
  }
}

impl<S: Stream, F: FnMut(Option<u64>, u64, &X), X> Read for UploadProgress<S, F, X> {
  fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
    let bytes = self.inner.read(buf)?;

    if bytes == 0 {
      // An empty destination says nothing about the end of the stream.
      if !buf.is_empty() && !self.reached_end {
        debug!("Upload stream exhausted");
        self.reached_end = true;
      }
    } else if !self.reached_end {
      match self.inner.stream_position() {
        Ok(position) => {
          let size = self.inner.size();
          trace!("Upload progress: {position}/{size:?}");
          (self.notify)(size, position, &self.context);
        }
        Err(e) => debug!("Not reporting upload progress, stream position is unavailable: {e}"),
      }
    }

    Ok(bytes)
  }
}

impl<S: Stream, F, X> Write for UploadProgress<S, F, X> {
  fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
    self.inner.write(buf)
  }

  fn flush(&mut self) -> io::Result<()> {
    self.inner.flush()
  }
}

impl<S: Stream, F, X> Seek for UploadProgress<S, F, X> {
  fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
    self.inner.seek(pos)
  }

  fn stream_position(&mut self) -> io::Result<u64> {
    self.inner.stream_position()
  }
}

impl<S: Stream, F: FnMut(Option<u64>, u64, &X), X> Stream for UploadProgress<S, F, X> {
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
