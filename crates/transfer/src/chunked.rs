use sha2::{Digest, Sha256};
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::{HASH_BLOCK_SIZE, TransferError};

// ---------------------------------------------------------------------------
// Content hash
// ---------------------------------------------------------------------------

/// Incremental content hash.
///
/// The stream is split into [`HASH_BLOCK_SIZE`] blocks, each block is hashed
/// with SHA-256, and the hex result is the SHA-256 of the concatenated block
/// digests. An empty stream hashes to SHA-256 of the empty string.
pub struct ContentHasher {
    overall: Sha256,
    block: Sha256,
    block_len: usize,
}

impl Default for ContentHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentHasher {
    pub fn new() -> Self {
        Self {
            overall: Sha256::new(),
            block: Sha256::new(),
            block_len: 0,
        }
    }

    /// Feeds `data`, closing blocks as they fill.
    pub fn update(&mut self, mut data: &[u8]) {
        while !data.is_empty() {
            let take = (HASH_BLOCK_SIZE - self.block_len).min(data.len());
            self.block.update(&data[..take]);
            self.block_len += take;
            data = &data[take..];

            if self.block_len == HASH_BLOCK_SIZE {
                let digest = self.block.finalize_reset();
                self.overall.update(digest);
                self.block_len = 0;
            }
        }
    }

    /// Returns the hex digest.
    pub fn finalize(mut self) -> String {
        if self.block_len > 0 {
            let digest = self.block.finalize();
            self.overall.update(digest);
        }
        hex::encode(self.overall.finalize())
    }
}

/// Computes the content hash of an in-memory buffer.
pub fn content_hash_bytes(data: &[u8]) -> String {
    let mut hasher = ContentHasher::new();
    hasher.update(data);
    hasher.finalize()
}

// ---------------------------------------------------------------------------
// ChunkReader
// ---------------------------------------------------------------------------

/// Reads a byte stream of known length in bounded pieces.
///
/// Every byte handed out is fed to a [`ContentHasher`], so the stream is
/// consumed exactly once and the digest is ready when the last piece has
/// been read.
pub struct ChunkReader<R> {
    inner: R,
    offset: i64,
    total_size: i64,
    hasher: ContentHasher,
}

impl<R: AsyncRead + Unpin> ChunkReader<R> {
    /// Wraps `inner`, which is expected to yield exactly `total_size` bytes.
    pub fn new(inner: R, total_size: i64) -> Self {
        Self {
            inner,
            offset: 0,
            total_size,
            hasher: ContentHasher::new(),
        }
    }

    /// Reads exactly `len` bytes.
    ///
    /// Fails with [`TransferError::UnexpectedEof`] if the stream ends first.
    pub async fn read_chunk(&mut self, len: i64) -> Result<Vec<u8>, TransferError> {
        let mut buf = Vec::with_capacity(len as usize);
        let n = (&mut self.inner).take(len as u64).read_to_end(&mut buf).await?;
        if (n as i64) < len {
            return Err(TransferError::UnexpectedEof {
                expected: len,
                read: n as i64,
            });
        }
        self.consume(&buf);
        Ok(buf)
    }

    /// Reads everything left, which must be exactly [`remaining`](Self::remaining) bytes.
    ///
    /// At most one byte past the expected end is read, so a growing source
    /// is detected without draining it.
    pub async fn read_remaining(&mut self) -> Result<Vec<u8>, TransferError> {
        let expected = self.remaining();
        let mut buf = Vec::with_capacity(expected as usize);
        let n = (&mut self.inner)
            .take(expected as u64 + 1)
            .read_to_end(&mut buf)
            .await? as i64;

        if n != expected {
            return Err(TransferError::SizeMismatch {
                expected: self.total_size,
                actual: self.offset + n,
            });
        }
        self.consume(&buf);
        Ok(buf)
    }

    fn consume(&mut self, data: &[u8]) {
        self.hasher.update(data);
        self.offset += data.len() as i64;
    }

    /// Declared stream length.
    pub fn total_size(&self) -> i64 {
        self.total_size
    }

    /// Bytes still expected.
    pub fn remaining(&self) -> i64 {
        self.total_size - self.offset
    }

    /// Finishes the reader and returns the content hash of every byte read.
    pub fn into_content_hash(self) -> String {
        self.hasher.finalize()
    }
}
