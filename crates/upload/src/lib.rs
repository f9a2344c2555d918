//! Upload flow for the `put` command.
//!
//! This crate implements the **business logic** of uploading local files
//! to remote paths. It has no HTTP or terminal dependencies: the binary
//! provides a `StorageClient` implementation that bridges to the actual
//! API client.
//!
//! # Pipeline (per file, all files concurrently)
//!
//! 1. **Resolve**: compute and validate the remote path, open and stat
//!    the source
//! 2. **Choose**: single-shot upload up to the chunk size, upload
//!    session above it
//! 3. **Stream**: read the file once, in chunks, reporting progress
//! 4. **Commit**: single-shot call or session finish creates the object
//! 5. **Verify**: compare the local content hash with the remote one

pub mod error;
pub mod orchestrator;
pub mod remote;
pub mod session;
pub mod target;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

// Re-export primary types for convenience.
pub use cloudput_transfer::CHUNK_SIZE;
pub use error::{RemoteError, UploadError, UploadFailures};
pub use orchestrator::Uploader;
pub use remote::{RemoteFuture, StorageClient};
pub use session::ChunkedSession;
pub use target::open_target;
pub use types::{FileOutcome, UploadEvent, UploadMethod, UploadReport, UploadTarget};
