#![warn(clippy::all)]

use std::cell::Cell;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::ui::create_progress;
use crate::Error;

use progress_stream::{DownloadContext, DownloadProgress, FileStream, Stream, UploadContext, UploadProgress};

use derive_more::Display;
use humantime::format_duration;
use indicatif::ProgressBar;
use log::{debug, info, trace};
use reqwest::blocking::{Body, Client};
use serde::Serialize;
use url::Url;

/// Settings shared by all transfers.
#[derive(Debug)]
pub struct Settings {
  pub progress: bool,
  pub color: bool,
}

#[derive(Debug, Display, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
  #[display("Download")]
  Download,
  #[display("Upload")]
  Upload,
}

/// HTTP method used to send an upload.
#[derive(Debug, Display, Clone, Copy, clap::ValueEnum)]
pub enum UploadMethod {
  #[display("PUT")]
  Put,
  #[display("POST")]
  Post,
}

/// What happened during a transfer.
#[derive(Debug, Serialize)]
pub struct Summary {
  direction: Direction,
  url: String,
  path: PathBuf,
  bytes: u64,
  notifications: u64,
  elapsed: String,
}

impl fmt::Display for Summary {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(
      f,
      "{} of {} bytes ({} progress notifications) between `{}` and `{}` took {}",
      self.direction,
      self.bytes,
      self.notifications,
      self.path.display(),
      self.url,
      self.elapsed
    )
  }
}

impl Summary {
  fn new(direction: Direction, url: &Url, path: &Path, bytes: u64, notifications: u64, start: Instant) -> Self {
    let elapsed = Duration::from_millis(start.elapsed().as_millis() as u64);
    Self {
      direction,
      url: url.to_string(),
      path: path.to_owned(),
      bytes,
      notifications,
      elapsed: format_duration(elapsed).to_string(),
    }
  }
}

/// Builds the HTTP client used for all transfers.
///
/// # Arguments
///
/// * `timeout` - Timeout applied to each request.
pub fn create_client(timeout: Duration) -> Result<Client, Error> {
  let client = Client::builder()
    .timeout(timeout)
    .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
    .build()?;
  Ok(client)
}

/// Derives a local file name from the last segment of the URL path.
///
/// # Arguments
///
/// * `url` - The URL being downloaded.
pub fn default_output_path(url: &Url) -> PathBuf {
  let segment = url.path_segments().and_then(|segments| segments.rev().find(|s| !s.is_empty()));
  PathBuf::from(segment.unwrap_or("index.html"))
}

fn finish(bar: Option<ProgressBar>) {
  if let Some(bar) = bar {
    bar.finish_and_clear();
  }
}

/// Downloads `url` into the file at `path`.
///
/// # Arguments
///
/// * `client` - Client sending the request.
/// * `url` - The URL to send the GET request to.
/// * `path` - File to write the response body into.
/// * `settings` - Transfer settings.
pub fn download(client: &Client, url: &Url, path: &Path, settings: &Settings) -> Result<Summary, Error> {
  let start = Instant::now();
  let mut resp = client.get(url.clone()).send()?;
  let status = resp.status();
  if !status.is_success() {
    return Err(Error::Status { url: url.clone(), status });
  }

  let expected_size = resp.content_length();
  info!("Downloading `{url}` into `{}` ({expected_size:?} bytes expected)", path.display());

  let bar = settings.progress.then(|| create_progress(format!("Downloading {url}"), expected_size, settings.color));
  let notifications = Cell::new(0);

  let file = FileStream::create(path)?;
  let context = DownloadContext::new(client, url, status);
  let mut writer = DownloadProgress::with_context(
    file,
    |expected, position, context| {
      notifications.set(notifications.get() + 1);
      if let Some(bar) = &bar {
        bar.set_position(position);
      }
      trace!("{} `{}`: {position}/{expected:?}", context.response, context.request);
    },
    expected_size,
    context,
  );

  let bytes = resp.copy_to(&mut writer)?;
  writer.close()?;
  debug!("Download complete, expected size reached: {}", writer.reached_end());
  drop(writer);

  finish(bar);
  Ok(Summary::new(Direction::Download, url, path, bytes, notifications.get(), start))
}

/// Uploads the file at `path` to `url`.
///
/// # Arguments
///
/// * `client` - Client sending the request.
/// * `method` - HTTP method to send the file with.
/// * `path` - File to be uploaded.
/// * `url` - The URL to send the file to.
/// * `settings` - Transfer settings.
pub fn upload(
  client: &Client,
  method: UploadMethod,
  path: &Path,
  url: &Url,
  settings: &Settings,
) -> Result<Summary, Error> {
  let start = Instant::now();
  let file = FileStream::open(path)?;
  let size = file.size().ok_or_else(|| Error::UnknownSize(path.to_owned()))?;
  info!("Uploading `{}` ({size} bytes) to `{url}` with {method}", path.display());

  let bar = settings.progress.then(|| create_progress(format!("Uploading {}", path.display()), Some(size), settings.color));
  let notifications = Arc::new(AtomicU64::new(0));

  let counter = Arc::clone(&notifications);
  let bar_handle = bar.clone();
  let reader = UploadProgress::with_context(
    file,
    move |total, position, context| {
      counter.fetch_add(1, Ordering::Relaxed);
      if let Some(bar) = &bar_handle {
        bar.set_position(position);
      }
      trace!("`{}`: {position}/{total:?}", context.request);
    },
    UploadContext::new(client.clone(), url.clone()),
  );

  let request = match method {
    UploadMethod::Put => client.put(url.clone()),
    UploadMethod::Post => client.post(url.clone()),
  };
  let resp = request.body(Body::sized(reader, size)).send()?;
  let status = resp.status();
  if !status.is_success() {
    finish(bar);
    return Err(Error::Status { url: url.clone(), status });
  }

  finish(bar);
  Ok(Summary::new(Direction::Upload, url, path, size, notifications.load(Ordering::Relaxed), start))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn output_path_from_last_segment() {
    let url = Url::parse("https://example.com/files/archive.tar.gz?x=1").unwrap();
    assert_eq!(default_output_path(&url), PathBuf::from("archive.tar.gz"));
  }

  #[test]
  fn output_path_trailing_slash() {
    let url = Url::parse("https://example.com/files/").unwrap();
    assert_eq!(default_output_path(&url), PathBuf::from("files"));
  }

  #[test]
  fn output_path_root() {
    let url = Url::parse("https://example.com").unwrap();
    assert_eq!(default_output_path(&url), PathBuf::from("index.html"));
  }

  #[test]
  fn summary_json() {
    let url = Url::parse("https://example.com/a").unwrap();
    let summary = Summary::new(Direction::Upload, &url, Path::new("a"), 10, 2, Instant::now());
    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["direction"], "upload");
    assert_eq!(json["url"], "https://example.com/a");
    assert_eq!(json["bytes"], 10);
    assert_eq!(json["notifications"], 2);
  }
}
