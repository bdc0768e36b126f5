#![warn(clippy::all)]

//! Streams backed by files on disk.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use derive_more::Display;
use log::debug;

use crate::stream::{unsupported, Metadata, Stream};

/// Access mode a file stream was opened with.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
  /// Read-only.
  #[display("rb")]
  Read,
  /// Write-only, truncating any existing file.
  #[display("wb")]
  Write,
  /// Read and write, creating the file if needed.
  #[display("r+b")]
  ReadWrite,
}

impl Mode {
  fn readable(self) -> bool {
    matches!(self, Mode::Read | Mode::ReadWrite)
  }

  fn writable(self) -> bool {
    matches!(self, Mode::Write | Mode::ReadWrite)
  }
}

/// A seekable stream over a file, aware of the mode it was opened with.
#[derive(Debug)]
pub struct FileStream {
  file: File,
  path: PathBuf,
  mode: Mode,
}

impl FileStream {
  /// Opens an existing file for reading.
  ///
  /// # Arguments
  ///
  /// * `path` - Path of the file to be opened.
  pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
    Self::with_mode(path.as_ref(), Mode::Read)
  }

  /// Creates or truncates a file for writing.
  ///
  /// # Arguments
  ///
  /// * `path` - Path of the file to be created.
  pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
    Self::with_mode(path.as_ref(), Mode::Write)
  }

  /// Opens a file for reading and writing, creating it if it does not exist.
  ///
  /// # Arguments
  ///
  /// * `path` - Path of the file to be opened.
  pub fn open_read_write(path: impl AsRef<Path>) -> io::Result<Self> {
    Self::with_mode(path.as_ref(), Mode::ReadWrite)
  }

  fn with_mode(path: &Path, mode: Mode) -> io::Result<Self> {
    let file = match mode {
      Mode::Read => File::open(path)?,
      Mode::Write => File::create(path)?,
      Mode::ReadWrite => OpenOptions::new().read(true).write(true).create(true).truncate(false).open(path)?,
    };
    debug!("Opened `{}` with mode `{mode}`", path.display());
    Ok(Self { file, path: path.to_owned(), mode })
  }

  /// Path the stream was opened from.
  pub fn path(&self) -> &Path {
    &self.path
  }

  /// Mode the stream was opened with.
  pub fn mode(&self) -> Mode {
    self.mode
  }
}

impl Read for FileStream {
  fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
    if !self.mode.readable() {
      return Err(unsupported("readable"));
    }
    self.file.read(buf)
  }
}

impl Write for FileStream {
  fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
    if !self.mode.writable() {
      return Err(unsupported("writable"));
    }
    self.file.write(buf)
  }

  fn flush(&mut self) -> io::Result<()> {
    self.file.flush()
  }
}

impl Seek for FileStream {
  fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
    self.file.seek(pos)
  }

  fn stream_position(&mut self) -> io::Result<u64> {
    self.file.stream_position()
  }
}

impl Stream for FileStream {
  fn size(&self) -> Option<u64> {
    self.file.metadata().ok().map(|md| md.len())
  }

  fn eof(&self) -> bool {
    let mut handle = &self.file;
    match (handle.stream_position(), self.size()) {
      (Ok(position), Some(size)) => position >= size,
      _ => true,
    }
  }

  fn is_readable(&self) -> bool {
    self.mode.readable()
  }

  fn is_writable(&self) -> bool {
    self.mode.writable()
  }

  fn metadata(&self) -> Metadata {
    Metadata::default()
      .with("wrapper_type", "file")
      .with("uri", self.path.display().to_string())
      .with("mode", self.mode.to_string())
      .with("seekable", "true")
  }

  fn close(&mut self) -> io::Result<()> {
    self.file.flush()?;
    if self.mode.writable() {
      self.file.sync_all()?;
    }
    Ok(())
  }
}
