use serde::{Deserialize, Serialize};

use crate::types::{CommitInfo, UploadSessionCursor};

// ---------------------------------------------------------------------------
// Request arguments
// ---------------------------------------------------------------------------

/// Opens an upload session; the body carries the first chunk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadSessionStartArg {
    /// When set, no further appends are accepted.
    pub close: bool,
}

/// Appends the body at `cursor.offset`.
///
/// The remote side rejects an offset that does not match the bytes it has
/// already received, which catches duplicated or reordered chunks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadSessionAppendArg {
    pub cursor: UploadSessionCursor,
    pub close: bool,
}

impl UploadSessionAppendArg {
    pub fn new(cursor: UploadSessionCursor) -> Self {
        Self {
            cursor,
            close: false,
        }
    }
}

/// Sends the last bytes and commits the assembled session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadSessionFinishArg {
    pub cursor: UploadSessionCursor,
    pub commit: CommitInfo,
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// Result of `upload_session/start`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadSessionStartResult {
    pub session_id: String,
}
