//! Data types for the upload flow.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use cloudput_protocol::FileMetadata;

use crate::error::{UploadError, UploadFailures};

/// One resolved source file and where it goes.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadTarget {
    pub source: PathBuf,
    /// Validated remote path.
    pub destination: String,
    pub size_bytes: i64,
    /// Source modification time, whole seconds.
    pub last_modified: DateTime<Utc>,
}

/// Transfer strategy chosen for a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadMethod {
    /// One upload call carrying the whole file.
    SingleShot,
    /// Upload session: start, `appends` append calls, finish.
    Session { appends: i64 },
}

impl UploadMethod {
    /// Picks the strategy for a file of `size` bytes.
    ///
    /// Only files strictly larger than `chunk_size` use a session, so the
    /// finish call always carries between 1 and `chunk_size` bytes.
    pub fn for_size(size: i64, chunk_size: i64) -> Self {
        if size <= chunk_size {
            return UploadMethod::SingleShot;
        }
        UploadMethod::Session {
            appends: (size - chunk_size - 1) / chunk_size,
        }
    }

    /// Total remote calls this strategy makes.
    pub fn call_count(&self) -> i64 {
        match self {
            UploadMethod::SingleShot => 1,
            UploadMethod::Session { appends } => appends + 2,
        }
    }
}

/// Progress event emitted during an upload run.
#[derive(Debug, Clone)]
pub enum UploadEvent {
    /// A file was resolved and its transfer is starting.
    Started {
        source: PathBuf,
        destination: String,
        size: i64,
        method: UploadMethod,
    },
    /// Cumulative bytes read from the source.
    Progress {
        source: PathBuf,
        transferred: i64,
        total: i64,
    },
    /// The remote object was committed.
    Completed {
        source: PathBuf,
        metadata: FileMetadata,
    },
    /// The file could not be uploaded.
    Failed { source: PathBuf, error: String },
}

/// Result for one source file.
#[derive(Debug)]
pub struct FileOutcome {
    pub source: PathBuf,
    pub result: Result<FileMetadata, UploadError>,
}

/// Results of one `put` run, in operand order.
#[derive(Debug, Default)]
pub struct UploadReport {
    pub outcomes: Vec<FileOutcome>,
}

impl UploadReport {
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(|o| o.result.is_ok())
    }

    pub fn failed(&self) -> impl Iterator<Item = (&PathBuf, &UploadError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (&o.source, e)))
    }

    /// Collapses the report into the committed files or every failure.
    pub fn into_result(self) -> Result<Vec<(PathBuf, FileMetadata)>, UploadFailures> {
        let total = self.outcomes.len();
        let mut committed = Vec::with_capacity(total);
        let mut failures = Vec::new();

        for outcome in self.outcomes {
            match outcome.result {
                Ok(metadata) => committed.push((outcome.source, metadata)),
                Err(e) => failures.push((outcome.source, e)),
            }
        }

        if failures.is_empty() {
            Ok(committed)
        } else {
            Err(UploadFailures { total, failures })
        }
    }
}
