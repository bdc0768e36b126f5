#![warn(clippy::all)]

//! Handles identifying the transfer a progress notification belongs to.
//!
//! The progress streams never look inside these; they are handed back verbatim to the
//! notify callback so that a single callback can tell concurrent transfers apart. Any
//! other type, including `()`, can be used as context instead.

/// Context of a download: the client sending the request, the request and its response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadContext<C, Q, R> {
  /// Client sending the request.
  pub client: C,
  /// Request being sent.
  pub request: Q,
  /// Response being received.
  pub response: R,
}

impl<C, Q, R> DownloadContext<C, Q, R> {
  /// Construct a new `DownloadContext`.
  pub fn new(client: C, request: Q, response: R) -> Self {
    Self { client, request, response }
  }
}

/// Context of an upload: the client sending the request and the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadContext<C, Q> {
  /// Client sending the request.
  pub client: C,
  /// Request being sent.
  pub request: Q,
}

impl<C, Q> UploadContext<C, Q> {
  /// Construct a new `UploadContext`.
  pub fn new(client: C, request: Q) -> Self {
    Self { client, request }
  }
}
