//! Upload error types.

use std::path::PathBuf;

use cloudput_transfer::TransferError;

/// Failure reported by a [`StorageClient`](crate::remote::StorageClient) call.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("rate limited")]
    RateLimited { retry_after: Option<u64> },

    #[error("API error {status}: {summary}")]
    Api { status: u16, summary: String },

    #[error("transport error: {0}")]
    Transport(String),
}

/// Errors produced while uploading a single file.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("missing operands to `put`")]
    NoOperands,

    #[error("invalid destination: {0}")]
    PathValidation(String),

    #[error("cannot open {}: {source}", path.display())]
    SourceOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot stat {}: {source}", path.display())]
    SourceStat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("not a regular file: {}", .0.display())]
    NotAFile(PathBuf),

    #[error("upload session needs more than {chunk_size} bytes, got {size}")]
    SessionTooSmall { size: i64, chunk_size: i64 },

    #[error("upload session start failed: {0}")]
    SessionStart(#[source] RemoteError),

    #[error("upload session append at offset {offset} failed: {source}")]
    SessionAppend {
        offset: i64,
        #[source]
        source: RemoteError,
    },

    #[error("upload session finish failed: {0}")]
    SessionFinish(#[source] RemoteError),

    #[error("upload failed: {0}")]
    SingleShotUpload(#[source] RemoteError),

    #[error("content hash mismatch: local {local}, remote {remote}")]
    ContentHashMismatch { local: String, remote: String },

    #[error("transfer error: {0}")]
    Transfer(#[from] TransferError),

    #[error("upload task failed: {0}")]
    TaskFailed(String),
}

impl UploadError {
    /// Maps a destination resolution failure.
    pub(crate) fn path_validation(err: TransferError) -> Self {
        match err {
            TransferError::InvalidPath(reason) => UploadError::PathValidation(reason),
            other => UploadError::PathValidation(other.to_string()),
        }
    }
}

/// Every per-file failure of one `put` run, keyed by source path.
#[derive(Debug, thiserror::Error)]
#[error("{} of {total} uploads failed", .failures.len())]
pub struct UploadFailures {
    pub total: usize,
    pub failures: Vec<(PathBuf, UploadError)>,
}
