//! Chunked upload-session driver.
//!
//! A session moves through start, zero or more appends, and finish. The
//! `SessionState` returned by start is borrowed by each append and
//! consumed by finish, so no call can follow a finished session.

use cloudput_protocol::{CommitInfo, FileMetadata, UploadSessionCursor};
use cloudput_transfer::ChunkReader;
use tokio::io::AsyncRead;
use tracing::debug;

use crate::error::UploadError;
use crate::remote::StorageClient;

/// An open upload session.
#[derive(Debug)]
struct SessionState {
    session_id: String,
    /// Bytes acknowledged by the server; the offset of the next call.
    bytes_committed: i64,
}

impl SessionState {
    fn cursor(&self) -> UploadSessionCursor {
        UploadSessionCursor {
            session_id: self.session_id.clone(),
            offset: self.bytes_committed as u64,
        }
    }
}

/// Uploads one file through an upload session.
pub struct ChunkedSession<'a> {
    client: &'a dyn StorageClient,
    chunk_size: i64,
}

impl<'a> ChunkedSession<'a> {
    /// Drives sessions through `client`, sending `chunk_size` bytes per
    /// start and append call.
    pub fn new(client: &'a dyn StorageClient, chunk_size: i64) -> Self {
        Self { client, chunk_size }
    }

    /// Streams `reader` through a session and commits it as `commit`.
    ///
    /// The stream must be strictly larger than one chunk. Every chunk but
    /// the last is exactly the chunk size; the finish call carries the
    /// remaining 1..=chunk-size bytes.
    pub async fn upload<R>(
        &self,
        reader: &mut ChunkReader<R>,
        commit: CommitInfo,
    ) -> Result<FileMetadata, UploadError>
    where
        R: AsyncRead + Unpin,
    {
        let size = reader.total_size();
        if size <= self.chunk_size {
            return Err(UploadError::SessionTooSmall {
                size,
                chunk_size: self.chunk_size,
            });
        }

        let mut state = self.start(reader).await?;
        while reader.remaining() > self.chunk_size {
            self.append(reader, &mut state).await?;
        }
        self.finish(reader, state, commit).await
    }

    async fn start<R>(&self, reader: &mut ChunkReader<R>) -> Result<SessionState, UploadError>
    where
        R: AsyncRead + Unpin,
    {
        let data = reader.read_chunk(self.chunk_size).await?;
        let len = data.len() as i64;

        let session_id = self
            .client
            .session_start(data)
            .await
            .map_err(UploadError::SessionStart)?;
        debug!(session_id = %session_id, bytes = len, "upload session started");

        Ok(SessionState {
            session_id,
            bytes_committed: len,
        })
    }

    async fn append<R>(
        &self,
        reader: &mut ChunkReader<R>,
        state: &mut SessionState,
    ) -> Result<(), UploadError>
    where
        R: AsyncRead + Unpin,
    {
        let data = reader.read_chunk(self.chunk_size).await?;
        let len = data.len() as i64;

        self.client
            .session_append(state.cursor(), data)
            .await
            .map_err(|e| UploadError::SessionAppend {
                offset: state.bytes_committed,
                source: e,
            })?;
        state.bytes_committed += len;
        debug!(
            session_id = %state.session_id,
            offset = state.bytes_committed,
            "upload session appended"
        );
        Ok(())
    }

    async fn finish<R>(
        &self,
        reader: &mut ChunkReader<R>,
        state: SessionState,
        commit: CommitInfo,
    ) -> Result<FileMetadata, UploadError>
    where
        R: AsyncRead + Unpin,
    {
        let data = reader.read_remaining().await?;
        let len = data.len() as i64;
        let path = commit.path.clone();

        let metadata = self
            .client
            .session_finish(state.cursor(), commit, data)
            .await
            .map_err(UploadError::SessionFinish)?;
        debug!(
            session_id = %state.session_id,
            path = %path,
            size = state.bytes_committed + len,
            "upload session finished"
        );
        Ok(metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Call, FailPoint, MockStorage};
    use chrono::{TimeZone, Utc};
    use cloudput_transfer::TransferError;

    const C: i64 = 16;

    fn commit(path: &str) -> CommitInfo {
        CommitInfo::overwrite(path, Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap())
    }

    fn data(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 251) as u8).collect()
    }

    async fn run(mock: &MockStorage, bytes: &[u8]) -> Result<FileMetadata, UploadError> {
        let mut reader = ChunkReader::new(bytes, bytes.len() as i64);
        ChunkedSession::new(mock, C)
            .upload(&mut reader, commit("/big.bin"))
            .await
    }

    #[tokio::test]
    async fn one_byte_over_chunk_is_start_and_finish() {
        let mock = MockStorage::new();
        let bytes = data(C as usize + 1);
        let meta = run(&mock, &bytes).await.unwrap();

        assert_eq!(
            mock.calls(),
            vec![
                Call::Start { len: 16 },
                Call::Finish {
                    session_id: "session-0".into(),
                    offset: 16,
                    path: "/big.bin".into(),
                    len: 1,
                },
            ]
        );
        assert_eq!(meta.size, 17);
        assert_eq!(mock.file("/big.bin").unwrap(), bytes);
    }

    #[tokio::test]
    async fn exact_multiple_keeps_full_final_chunk() {
        let mock = MockStorage::new();
        let bytes = data(3 * C as usize);
        run(&mock, &bytes).await.unwrap();

        let calls = mock.calls();
        assert_eq!(calls.len(), 3);
        assert!(matches!(calls[1], Call::Append { offset: 16, len: 16, .. }));
        assert!(matches!(calls[2], Call::Finish { offset: 32, len: 16, .. }));
        assert_eq!(mock.file("/big.bin").unwrap(), bytes);
    }

    #[tokio::test]
    async fn offsets_advance_by_chunk() {
        let mock = MockStorage::new();
        let bytes = data(3 * C as usize + 1);
        run(&mock, &bytes).await.unwrap();

        let offsets: Vec<u64> = mock
            .calls()
            .iter()
            .filter_map(|c| match c {
                Call::Append { offset, .. } | Call::Finish { offset, .. } => Some(*offset),
                _ => None,
            })
            .collect();
        assert_eq!(offsets, vec![16, 32, 48]);
        assert_eq!(mock.file("/big.bin").unwrap(), bytes);
    }

    #[tokio::test]
    async fn too_small_for_session() {
        let mock = MockStorage::new();
        let err = run(&mock, &data(C as usize)).await.unwrap_err();
        assert!(matches!(
            err,
            UploadError::SessionTooSmall { size: 16, chunk_size: 16 }
        ));
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn start_failure_stops_session() {
        let mock = MockStorage::new().failing(FailPoint::Start);
        let err = run(&mock, &data(40)).await.unwrap_err();
        assert!(matches!(err, UploadError::SessionStart(_)), "{err}");
        assert_eq!(mock.calls().len(), 1);
    }

    #[tokio::test]
    async fn append_failure_reports_offset_and_skips_finish() {
        let mock = MockStorage::new().failing(FailPoint::Append);
        let err = run(&mock, &data(40)).await.unwrap_err();
        assert!(matches!(err, UploadError::SessionAppend { offset: 16, .. }), "{err}");
        assert!(
            !mock
                .calls()
                .iter()
                .any(|c| matches!(c, Call::Finish { .. }))
        );
    }

    #[tokio::test]
    async fn finish_failure_is_reported() {
        let mock = MockStorage::new().failing(FailPoint::Finish);
        let err = run(&mock, &data(20)).await.unwrap_err();
        assert!(matches!(err, UploadError::SessionFinish(_)), "{err}");
        assert!(mock.file("/big.bin").is_none());
    }

    #[tokio::test]
    async fn short_source_is_transfer_error() {
        let mock = MockStorage::new();
        let bytes = data(20);
        let mut reader = ChunkReader::new(&bytes[..], 40);
        let err = ChunkedSession::new(&mock, C)
            .upload(&mut reader, commit("/big.bin"))
            .await
            .unwrap_err();
        assert!(
            matches!(
                err,
                UploadError::Transfer(TransferError::UnexpectedEof { expected: 16, read: 4 })
            ),
            "{err}"
        );
    }
}
