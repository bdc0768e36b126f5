#![warn(clippy::all)]
#![warn(missing_docs)]

//! Stream decorators that report progress while data is transferred.
//!
//! [`DownloadProgress`] wraps the stream a download is written into and [`UploadProgress`]
//! wraps the stream an upload is read from. Both behave exactly like the stream they
//! wrap and additionally invoke a callback with the expected total size and the current
//! position whenever data moves.

pub mod context;
pub mod download;
pub mod stream;
pub mod upload;

pub use crate::context::{DownloadContext, UploadContext};
pub use crate::download::DownloadProgress;
pub use crate::stream::{FileStream, MemoryStream, Metadata, Pipe, Stream};
pub use crate::upload::UploadProgress;
