//! Adapter bridging the HTTP API client to the `StorageClient` trait
//! required by the upload crate.

use cloudput_api::{Client, Error};
use cloudput_protocol::{CommitInfo, FileMetadata, UploadSessionCursor};
use cloudput_upload::{RemoteError, RemoteFuture, StorageClient};

/// Implements `cloudput_upload::StorageClient` by delegating to [`Client`].
pub struct ApiAdapter {
    client: Client,
}

impl ApiAdapter {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl StorageClient for ApiAdapter {
    fn session_start(&self, data: Vec<u8>) -> RemoteFuture<'_, String> {
        Box::pin(async move {
            self.client
                .upload_session_start(data)
                .await
                .map(|started| started.session_id)
                .map_err(remote_error)
        })
    }

    fn session_append(&self, cursor: UploadSessionCursor, data: Vec<u8>) -> RemoteFuture<'_, ()> {
        Box::pin(async move {
            self.client
                .upload_session_append(cursor, data)
                .await
                .map_err(remote_error)
        })
    }

    fn session_finish(
        &self,
        cursor: UploadSessionCursor,
        commit: CommitInfo,
        data: Vec<u8>,
    ) -> RemoteFuture<'_, FileMetadata> {
        Box::pin(async move {
            self.client
                .upload_session_finish(cursor, commit, data)
                .await
                .map_err(remote_error)
        })
    }

    fn upload(&self, commit: CommitInfo, data: Vec<u8>) -> RemoteFuture<'_, FileMetadata> {
        Box::pin(async move {
            self.client
                .upload(&commit, data)
                .await
                .map_err(remote_error)
        })
    }
}

fn remote_error(err: Error) -> RemoteError {
    match err {
        Error::Unauthorized(msg) => RemoteError::Unauthorized(msg),
        Error::RateLimited { retry_after } => RemoteError::RateLimited { retry_after },
        Error::Endpoint { summary, .. } => RemoteError::Api {
            status: 409,
            summary,
        },
        Error::Api { status, body } => RemoteError::Api {
            status,
            summary: body,
        },
        other => RemoteError::Transport(other.to_string()),
    }
}
