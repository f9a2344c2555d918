//! Remote storage trait.
//!
//! `StorageClient` is implemented by the binary to bridge upload logic to
//! the HTTP API client. Keeping it a trait makes the upload flow testable
//! with in-memory mocks.

use std::future::Future;
use std::pin::Pin;

use cloudput_protocol::{CommitInfo, FileMetadata, UploadSessionCursor};

use crate::error::RemoteError;

/// Boxed future returned by [`StorageClient`] calls.
pub type RemoteFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, RemoteError>> + Send + 'a>>;

/// Abstract connection to the storage service.
///
/// Shared by every concurrent upload task, so all methods take `&self`.
pub trait StorageClient: Send + Sync {
    /// Opens an upload session with its first chunk; returns the session id.
    fn session_start(&self, data: Vec<u8>) -> RemoteFuture<'_, String>;

    /// Appends `data` at `cursor.offset`.
    fn session_append(&self, cursor: UploadSessionCursor, data: Vec<u8>) -> RemoteFuture<'_, ()>;

    /// Sends the tail of the stream and commits the session.
    fn session_finish(
        &self,
        cursor: UploadSessionCursor,
        commit: CommitInfo,
        data: Vec<u8>,
    ) -> RemoteFuture<'_, FileMetadata>;

    /// Uploads a whole file in one call.
    fn upload(&self, commit: CommitInfo, data: Vec<u8>) -> RemoteFuture<'_, FileMetadata>;
}
