//! Byte-stream plumbing for uploads: bounded chunk reads with content
//! hashing, progress observation, and remote path rules.

mod chunked;
mod progress;
mod validation;

pub use chunked::{ChunkReader, ContentHasher, content_hash_bytes};
pub use progress::{ProgressCallback, ProgressReader, TransferProgress};
pub use validation::{base_name, full_name, resolve_destination, validate_remote_path};

/// Upload chunk size: 16 MiB.
///
/// Files strictly larger than this go through an upload session; every
/// session chunk except the last is exactly this long.
pub const CHUNK_SIZE: i64 = 1 << 24;

/// Block size of the content hash: 4 MiB.
pub const HASH_BLOCK_SIZE: usize = 4 * 1024 * 1024;

/// Errors produced by the transfer crate.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("source ended early: expected {expected} bytes, read {read}")]
    UnexpectedEof { expected: i64, read: i64 },

    #[error("source size changed during upload: expected {expected} bytes, found at least {actual}")]
    SizeMismatch { expected: i64, actual: i64 },

    #[error("invalid path: {0}")]
    InvalidPath(String),
}
