//! In-memory storage service for the upload tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use cloudput_protocol::{CommitInfo, FileMetadata, UploadSessionCursor};
use cloudput_transfer::content_hash_bytes;

use crate::error::RemoteError;
use crate::remote::{RemoteFuture, StorageClient};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    Start {
        len: usize,
    },
    Append {
        session_id: String,
        offset: u64,
        len: usize,
    },
    Finish {
        session_id: String,
        offset: u64,
        path: String,
        len: usize,
    },
    Upload {
        path: String,
        len: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FailPoint {
    Start,
    Append,
    Finish,
    Upload,
}

/// Records every call and reassembles uploaded bytes like the server would.
///
/// Cursor offsets are checked against the bytes received so far. Commit
/// metadata from upload and finish calls is kept in arrival order.
#[derive(Default)]
pub(crate) struct MockStorage {
    calls: Mutex<Vec<Call>>,
    commits: Mutex<Vec<CommitInfo>>,
    sessions: Mutex<HashMap<String, Vec<u8>>>,
    files: Mutex<HashMap<String, Vec<u8>>>,
    next_session: AtomicUsize,
    fail_at: Option<FailPoint>,
    fail_path: Option<String>,
    corrupt_hash: bool,
}

impl MockStorage {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn failing(mut self, point: FailPoint) -> Self {
        self.fail_at = Some(point);
        self
    }

    /// Fails commits (upload or finish) for one remote path only.
    pub(crate) fn failing_path(mut self, path: &str) -> Self {
        self.fail_path = Some(path.to_string());
        self
    }

    pub(crate) fn with_corrupt_hash(mut self) -> Self {
        self.corrupt_hash = true;
        self
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn commits(&self) -> Vec<CommitInfo> {
        self.commits.lock().unwrap().clone()
    }

    pub(crate) fn file(&self, path: &str) -> Option<Vec<u8>> {
        self.files.lock().unwrap().get(path).cloned()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn check_fail(&self, point: FailPoint) -> Result<(), RemoteError> {
        if self.fail_at == Some(point) {
            return Err(RemoteError::Api {
                status: 409,
                summary: format!("mock failure at {point:?}"),
            });
        }
        Ok(())
    }

    fn check_path(&self, path: &str) -> Result<(), RemoteError> {
        if self.fail_path.as_deref() == Some(path) {
            return Err(RemoteError::Api {
                status: 409,
                summary: "path/conflict/file/..".into(),
            });
        }
        Ok(())
    }

    fn append_at(&self, cursor: &UploadSessionCursor, data: &[u8]) -> Result<(), RemoteError> {
        let mut sessions = self.sessions.lock().unwrap();
        let buf = sessions
            .get_mut(&cursor.session_id)
            .ok_or_else(|| RemoteError::Api {
                status: 409,
                summary: "lookup_failed/not_found/".into(),
            })?;
        if buf.len() as u64 != cursor.offset {
            return Err(RemoteError::Api {
                status: 409,
                summary: format!(
                    "lookup_failed/incorrect_offset/ expected {} got {}",
                    buf.len(),
                    cursor.offset
                ),
            });
        }
        buf.extend_from_slice(data);
        Ok(())
    }

    fn commit(&self, path: &str, data: Vec<u8>) -> FileMetadata {
        let content_hash = if self.corrupt_hash {
            "0".repeat(64)
        } else {
            content_hash_bytes(&data)
        };
        let metadata = FileMetadata {
            name: path.rsplit('/').next().unwrap_or(path).to_string(),
            id: format!("id:{path}"),
            path_lower: Some(path.to_lowercase()),
            path_display: Some(path.to_string()),
            client_modified: None,
            server_modified: None,
            rev: "015f".into(),
            size: data.len() as i64,
            content_hash: Some(content_hash),
        };
        self.files.lock().unwrap().insert(path.to_string(), data);
        metadata
    }
}

impl StorageClient for MockStorage {
    fn session_start(&self, data: Vec<u8>) -> RemoteFuture<'_, String> {
        Box::pin(async move {
            self.record(Call::Start { len: data.len() });
            self.check_fail(FailPoint::Start)?;
            let id = format!(
                "session-{}",
                self.next_session.fetch_add(1, Ordering::SeqCst)
            );
            self.sessions.lock().unwrap().insert(id.clone(), data);
            Ok(id)
        })
    }

    fn session_append(&self, cursor: UploadSessionCursor, data: Vec<u8>) -> RemoteFuture<'_, ()> {
        Box::pin(async move {
            self.record(Call::Append {
                session_id: cursor.session_id.clone(),
                offset: cursor.offset,
                len: data.len(),
            });
            self.check_fail(FailPoint::Append)?;
            self.append_at(&cursor, &data)
        })
    }

    fn session_finish(
        &self,
        cursor: UploadSessionCursor,
        commit: CommitInfo,
        data: Vec<u8>,
    ) -> RemoteFuture<'_, FileMetadata> {
        Box::pin(async move {
            self.record(Call::Finish {
                session_id: cursor.session_id.clone(),
                offset: cursor.offset,
                path: commit.path.clone(),
                len: data.len(),
            });
            self.commits.lock().unwrap().push(commit.clone());
            self.check_fail(FailPoint::Finish)?;
            self.check_path(&commit.path)?;
            self.append_at(&cursor, &data)?;
            let assembled = self
                .sessions
                .lock()
                .unwrap()
                .remove(&cursor.session_id)
                .unwrap_or_default();
            Ok(self.commit(&commit.path, assembled))
        })
    }

    fn upload(&self, commit: CommitInfo, data: Vec<u8>) -> RemoteFuture<'_, FileMetadata> {
        Box::pin(async move {
            self.record(Call::Upload {
                path: commit.path.clone(),
                len: data.len(),
            });
            self.commits.lock().unwrap().push(commit.clone());
            self.check_fail(FailPoint::Upload)?;
            self.check_path(&commit.path)?;
            Ok(self.commit(&commit.path, data))
        })
    }
}
